mod fixtures;

use async_trait::async_trait;
use fixtures::{Participant, Roster, participants, roster_table};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use rstest::*;
use serde_json::json;
use sheepdog_tables::{
	Column, CsvExportView, CsvTableMixin, Filter, MemoryResultSet, Request, Result, ResultSet,
	SortFilterMixin, Table, TableError, TablesMixin,
};

struct ExportableView {
	table: Table<Roster>,
	rows: Vec<Participant>,
}

impl SortFilterMixin<Roster> for ExportableView {}

#[async_trait]
impl TablesMixin<Roster> for ExportableView {
	fn tables(&self) -> Vec<(&str, &Table<Roster>)> {
		vec![("main_table", &self.table)]
	}

	async fn table_queryset(&self, _key: &str) -> Result<Roster> {
		Ok(MemoryResultSet::new(self.rows.clone()))
	}
}

#[async_trait]
impl CsvTableMixin<Roster> for ExportableView {
	fn csv_filename(&self) -> &str {
		"roster"
	}
}

#[fixture]
fn view(roster_table: Table<Roster>, participants: Vec<Participant>) -> ExportableView {
	ExportableView {
		table: roster_table,
		rows: participants,
	}
}

fn lines(body: &str) -> Vec<String> {
	body.lines().map(str::to_string).collect()
}

#[rstest]
#[tokio::test]
async fn export_covers_the_whole_filtered_set(view: ExportableView) {
	// Paging and sorting parameters are ignored on the export path.
	let request =
		Request::get("/roster.csv?main_table-page=2&main_table-sort=-name").unwrap();
	let response = view.csv_response(&request, "main_table").await.unwrap();

	assert_eq!(
		response.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
		Some("text/csv")
	);
	assert_eq!(
		response
			.headers
			.get(CONTENT_DISPOSITION)
			.and_then(|v| v.to_str().ok()),
		Some("attachment; filename=roster.csv")
	);

	let body = response.text();
	let rows = lines(&body);
	assert_eq!(rows.len(), 6);
	assert_eq!(rows[0], "Name,Email,Score,Created,Team");
	assert!(rows[1].starts_with("Ada,ada@example.com,3,"));
	// The zero score exports as the placeholder, like any falsy value.
	assert!(rows[3].contains(",---,"));
}

#[rstest]
#[tokio::test]
async fn export_respects_the_table_filter_hook(participants: Vec<Participant>) {
	let view = ExportableView {
		table: Table::builder()
			.column("name", Column::new())
			.filter_with(|qs: Roster| qs.filter(&Filter::exact("active", json!(true))))
			.build()
			.unwrap(),
		rows: participants,
	};
	let request = Request::get("/roster.csv").unwrap();
	let response = view.csv_response(&request, "main_table").await.unwrap();
	// Header plus the three active participants.
	assert_eq!(lines(&response.text()).len(), 4);
}

#[rstest]
#[tokio::test]
async fn unknown_table_key_is_a_configuration_error(view: ExportableView) {
	let request = Request::get("/roster.csv").unwrap();
	let result = view.csv_response(&request, "ghost_table").await;
	assert!(matches!(result, Err(TableError::ImproperlyConfigured(_))));
}

struct IdExportView {
	table: Table<Roster>,
	redirect: Option<&'static str>,
	rows: Vec<Participant>,
}

#[async_trait]
impl CsvExportView<Roster> for IdExportView {
	fn table(&self) -> &Table<Roster> {
		&self.table
	}

	fn filename(&self) -> &str {
		"selection"
	}

	fn redirect_to(&self) -> Option<&str> {
		self.redirect
	}

	async fn rows_for_ids(&self, ids: &[String]) -> Result<Roster> {
		let wanted: Vec<serde_json::Value> =
			ids.iter().filter_map(|id| id.parse::<i64>().ok().map(|n| json!(n))).collect();
		Ok(MemoryResultSet::new(self.rows.clone())
			.filter(&Filter::new("id", sheepdog_tables::FilterOperator::In, json!(wanted))))
	}
}

#[fixture]
fn id_view(roster_table: Table<Roster>, participants: Vec<Participant>) -> IdExportView {
	IdExportView {
		table: roster_table,
		redirect: Some("/roster"),
		rows: participants,
	}
}

#[rstest]
#[tokio::test]
async fn missing_redirect_is_a_configuration_error(mut id_view: IdExportView) {
	id_view.redirect = None;
	let request = Request::post_form("/export", &[("id", "1,2")]).unwrap();
	let result = id_view.post(&request).await;
	assert!(matches!(result, Err(TableError::ImproperlyConfigured(_))));
}

#[rstest]
#[tokio::test]
async fn missing_ids_redirect_back(id_view: IdExportView) {
	let request = Request::post_form("/export", &[]).unwrap();
	let response = id_view.post(&request).await.unwrap();
	assert_eq!(response.status, http::StatusCode::FOUND);
	assert_eq!(
		response
			.headers
			.get(http::header::LOCATION)
			.and_then(|v| v.to_str().ok()),
		Some("/roster")
	);
}

#[rstest]
#[tokio::test]
async fn selected_ids_export(id_view: IdExportView) {
	let request = Request::post_form("/export", &[("id", "1,4")]).unwrap();
	let response = id_view.post(&request).await.unwrap();
	let body = response.text();
	let rows = lines(&body);
	assert_eq!(rows.len(), 3);
	assert!(rows[1].starts_with("Ada,"));
	assert!(rows[2].starts_with("Barbara,"));
}
