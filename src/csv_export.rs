//! CSV export.
//!
//! Two entry points share one writer: [`CsvTableMixin`] exports a
//! declared table straight off the pipeline's filtered-and-annotated
//! result (paging and sorting intentionally skipped — an export covers
//! the whole filtered set, in storage order), and [`CsvExportView`] is
//! the POST-only endpoint fed a comma-joined id list from the hidden
//! export form.

use async_trait::async_trait;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderValue};

use crate::error::{Result, TableError};
use crate::forms::CsvExportForm;
use crate::http::{Request, Response};
use crate::mixins::TablesMixin;
use crate::resultset::ResultSet;
use crate::row::display_value;
use crate::table::Table;

/// CSV export of declared tables.
#[async_trait]
pub trait CsvTableMixin<Q: ResultSet + 'static>: TablesMixin<Q> {
	/// The download filename, without extension.
	fn csv_filename(&self) -> &str;

	/// The rows to export for one table: the filtered and annotated
	/// result set, never paged or sorted.
	async fn csv_rows(&self, request: &Request, key: &str, table: &Table<Q>) -> Result<Vec<Q::Row>> {
		let queryset = self.table_queryset(key).await?;
		let queryset = table.filter(queryset);
		let queryset = match self.filterset(key) {
			Some(filterset) => filterset.bind(request).apply(queryset),
			None => queryset,
		};
		let queryset = table.annotate(queryset);
		Ok(queryset.into_rows())
	}

	/// Builds the attachment response for one declared table.
	async fn csv_response(&self, request: &Request, key: &str) -> Result<Response> {
		let table = self
			.tables()
			.into_iter()
			.find_map(|(k, table)| (k == key).then_some(table))
			.ok_or_else(|| {
				TableError::ImproperlyConfigured(format!("no table registered under {key:?}"))
			})?;
		let rows = self.csv_rows(request, key, table).await?;
		write_csv(table, &rows, self.csv_filename())
	}
}

/// POST-only export endpoint over an explicit id list.
///
/// The redirect target is consulted before anything else: leaving it
/// unset is a configuration error, raised on first use. A missing or
/// empty id field redirects back instead of exporting.
#[async_trait]
pub trait CsvExportView<Q: ResultSet + 'static>: Send + Sync {
	/// The table definition driving headers and cell values.
	fn table(&self) -> &Table<Q>;

	/// The download filename, without extension.
	fn filename(&self) -> &str;

	/// Where to send the browser when there is nothing to export.
	fn redirect_to(&self) -> Option<&str>;

	/// Fetches the records named by the submitted ids.
	async fn rows_for_ids(&self, ids: &[String]) -> Result<Q>;

	/// Hook for extra per-request annotation before export.
	fn annotate(&self, queryset: Q, _request: &Request) -> Q {
		queryset
	}

	/// Handles the export POST.
	async fn post(&self, request: &Request) -> Result<Response> {
		let redirect = self.redirect_to().ok_or_else(|| {
			TableError::ImproperlyConfigured("CsvExportView redirect target not set".to_string())
		})?;
		let data = request.form_data();
		let ids = data
			.get(CsvExportForm::FIELD)
			.map(|raw| CsvExportForm::parse_ids(raw))
			.unwrap_or_default();
		if ids.is_empty() {
			return Response::redirect(redirect);
		}
		let queryset = self.rows_for_ids(&ids).await?;
		let queryset = self.table().filter(queryset);
		let queryset = self.annotate(queryset, request);
		write_csv(self.table(), &queryset.into_rows(), self.filename())
	}
}

/// Writes the header row and one record per row, then wraps the bytes
/// in an attachment response.
pub(crate) fn write_csv<Q: ResultSet>(
	table: &Table<Q>,
	rows: &[Q::Row],
	filename: &str,
) -> Result<Response> {
	let mut writer = csv::Writer::from_writer(Vec::new());
	writer.write_record(table.headers())?;
	for row in rows {
		let record: Vec<String> = table
			.columns()
			.map(|(_, col)| display_value(&col.csv_value(row)))
			.collect();
		writer.write_record(&record)?;
	}
	let data = writer
		.into_inner()
		.map_err(|e| TableError::Encoding(e.to_string()))?;
	Ok(Response::ok()
		.with_header(CONTENT_TYPE, HeaderValue::from_static("text/csv"))
		.with_header(
			CONTENT_DISPOSITION,
			HeaderValue::from_str(&format!("attachment; filename={filename}.csv"))?,
		)
		.with_body(data))
}
