//! Declarative tables.
//!
//! A [`Table`] is an ordered registry of named columns plus the
//! paging/filtering knobs a view needs. Columns are registered
//! explicitly on a [`TableBuilder`] — registration order is the display
//! sequence unless an explicit sequence narrows or reorders it — and
//! the registry is immutable from then on; all per-request state lives
//! in the view context, never here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::forms::{EditForm, EditFormSet, FormFieldDef};
use crate::resultset::ResultSet;
use crate::row::FieldAccess;

/// Items shown per page when a table does not say otherwise.
pub const DEFAULT_PAGE_LIMIT: usize = 25;

/// Declarative table definition.
///
/// # Examples
///
/// ```
/// use serde_json::Value;
/// use sheepdog_tables::{Column, MemoryResultSet, Table};
///
/// let table: Table<MemoryResultSet<Value>> = Table::builder()
/// 	.column("name", Column::new().sortable(true))
/// 	.column("score", Column::new().header("Points"))
/// 	.build()
/// 	.unwrap();
///
/// assert_eq!(table.headers(), vec!["Name", "Points"]);
/// ```
pub struct Table<Q: ResultSet> {
	columns: Vec<(String, Column<Q>)>,
	page_limit: usize,
	is_paged: bool,
	attrs: BTreeMap<String, String>,
	empty_text: String,
	filter_hook: Option<Arc<dyn Fn(Q) -> Q + Send + Sync>>,
}

impl<Q: ResultSet> Table<Q> {
	/// Starts a table definition.
	pub fn builder() -> TableBuilder<Q> {
		TableBuilder::new()
	}

	/// The column keys in display order.
	pub fn sequence(&self) -> Vec<&str> {
		self.columns.iter().map(|(key, _)| key.as_str()).collect()
	}

	/// The columns in display order, with their keys.
	pub fn columns(&self) -> impl Iterator<Item = (&str, &Column<Q>)> {
		self.columns.iter().map(|(key, col)| (key.as_str(), col))
	}

	/// Looks a column up by key.
	pub fn column(&self, key: &str) -> Option<&Column<Q>> {
		self.columns
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, col)| col)
	}

	/// Items shown per page.
	pub fn page_limit(&self) -> usize {
		self.page_limit
	}

	/// Whether the view should paginate this table.
	pub fn is_paged(&self) -> bool {
		self.is_paged
	}

	/// HTML attributes for the `<table>` tag.
	pub fn attrs(&self) -> &BTreeMap<String, String> {
		&self.attrs
	}

	/// Message shown when no data is available.
	pub fn empty_text(&self) -> &str {
		&self.empty_text
	}

	/// Header texts in display order; unset headers use a titleized
	/// form of the column key.
	pub fn headers(&self) -> Vec<String> {
		self.columns
			.iter()
			.map(|(key, col)| match col.header_text() {
				Some(header) => header.to_string(),
				None => title_case(key),
			})
			.collect()
	}

	/// Narrows the base result set. Identity unless the definition
	/// installed a filter hook.
	pub fn filter(&self, queryset: Q) -> Q {
		match &self.filter_hook {
			Some(hook) => hook(queryset),
			None => queryset,
		}
	}

	/// Applies every column annotation, in column order. The order in
	/// which distinct columns annotate is not part of the contract.
	pub fn annotate(&self, queryset: Q) -> Q {
		self.columns
			.iter()
			.filter_map(|(_, col)| col.annotation.as_ref())
			.fold(queryset, |qs, annotation| annotation(qs))
	}

	/// `(token, label)` pairs for every sortable column, ascending and
	/// descending.
	pub fn sort_choices(&self) -> Vec<(String, String)> {
		let mut choices = Vec::new();
		for (key, col) in &self.columns {
			if !col.is_sortable() {
				continue;
			}
			let label = match col.header_text() {
				Some(header) => header.to_string(),
				None => title_case(key),
			};
			choices.push((col.sort_token(false), label.clone()));
			choices.push((col.sort_token(true), format!("{label} (descending)")));
		}
		choices
	}
}

/// Builder producing a validated [`Table`].
pub struct TableBuilder<Q: ResultSet> {
	columns: Vec<(String, Column<Q>)>,
	sequence: Option<Vec<String>>,
	page_limit: usize,
	is_paged: bool,
	attrs: BTreeMap<String, String>,
	empty_text: String,
	filter_hook: Option<Arc<dyn Fn(Q) -> Q + Send + Sync>>,
}

impl<Q: ResultSet> Default for TableBuilder<Q> {
	fn default() -> Self {
		Self::new()
	}
}

impl<Q: ResultSet> TableBuilder<Q> {
	/// Starts an empty definition with the stock defaults.
	pub fn new() -> Self {
		let mut attrs = BTreeMap::new();
		attrs.insert(
			"class".to_string(),
			"table table-bordered table-striped".to_string(),
		);
		Self {
			columns: Vec::new(),
			sequence: None,
			page_limit: DEFAULT_PAGE_LIMIT,
			is_paged: true,
			attrs,
			empty_text: "No data is available".to_string(),
			filter_hook: None,
		}
	}

	/// Registers a column under `key`. The key becomes the column's
	/// field when none was set explicitly.
	pub fn column(mut self, key: impl Into<String>, mut column: Column<Q>) -> Self {
		let key = key.into();
		column.fill_field(&key);
		self.columns.push((key, column));
		self
	}

	/// Narrows or reorders the displayed columns. Every key must have
	/// been registered.
	pub fn sequence<I>(mut self, keys: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.sequence = Some(keys.into_iter().map(Into::into).collect());
		self
	}

	/// Items shown per page.
	pub fn page_limit(mut self, limit: usize) -> Self {
		self.page_limit = limit;
		self
	}

	/// Disables pagination; the page object passes every row through.
	pub fn unpaged(mut self) -> Self {
		self.is_paged = false;
		self
	}

	/// Sets one `<table>` tag attribute.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Sets the message shown when no data is available.
	pub fn empty_text(mut self, text: impl Into<String>) -> Self {
		self.empty_text = text.into();
		self
	}

	/// Installs the filter hook applied to the base result set.
	pub fn filter_with(mut self, hook: impl Fn(Q) -> Q + Send + Sync + 'static) -> Self {
		self.filter_hook = Some(Arc::new(hook));
		self
	}

	/// Validates the definition. A table with no columns — or a
	/// sequence naming an unregistered key — is a configuration error.
	pub fn build(self) -> Result<Table<Q>> {
		if self.columns.is_empty() {
			return Err(TableError::ImproperlyConfigured(
				"table does not provide a column sequence".to_string(),
			));
		}
		let columns = match self.sequence {
			None => self.columns,
			Some(sequence) => {
				if sequence.is_empty() {
					return Err(TableError::ImproperlyConfigured(
						"table does not provide a column sequence".to_string(),
					));
				}
				let mut registry = self.columns;
				let mut ordered = Vec::with_capacity(sequence.len());
				for key in sequence {
					let position = registry
						.iter()
						.position(|(k, _)| *k == key)
						.ok_or_else(|| TableError::UnknownColumn(key.clone()))?;
					ordered.push(registry.remove(position));
				}
				ordered
			}
		};
		Ok(Table {
			columns,
			page_limit: self.page_limit,
			is_paged: self.is_paged,
			attrs: self.attrs,
			empty_text: self.empty_text,
			filter_hook: self.filter_hook,
		})
	}
}

/// Table variant whose pages can be edited in bulk.
///
/// Editable columns (those carrying a [`FieldKind`]) become the fields
/// of one form per row; the primary-key field identifies the record a
/// form writes back to.
///
/// [`FieldKind`]: crate::forms::FieldKind
pub struct EditTable<Q: ResultSet> {
	table: Table<Q>,
	pk_field: String,
}

impl<Q: ResultSet> EditTable<Q> {
	/// Wraps a table definition; records are keyed by `"id"` unless
	/// overridden.
	pub fn new(table: Table<Q>) -> Self {
		Self {
			table,
			pk_field: "id".to_string(),
		}
	}

	/// Overrides the primary-key field.
	pub fn pk_field(mut self, field: impl Into<String>) -> Self {
		self.pk_field = field.into();
		self
	}

	/// The underlying table definition.
	pub fn table(&self) -> &Table<Q> {
		&self.table
	}

	/// Name of the primary-key field.
	pub fn pk_field_name(&self) -> &str {
		&self.pk_field
	}

	/// The editable columns, in display order.
	pub fn editable_columns(&self) -> Vec<(&str, &Column<Q>)> {
		self.table
			.columns()
			.filter(|(_, col)| col.is_editable())
			.collect()
	}

	/// Builds one form per row under the table's namespace, with
	/// initial values read straight off the rows (no placeholder
	/// substitution — an edit field starts from the stored value).
	pub fn formset(&self, namespace: &str, rows: &[Q::Row]) -> EditFormSet {
		let fields: Vec<FormFieldDef> = self
			.editable_columns()
			.into_iter()
			.filter_map(|(_, col)| {
				col.editor().map(|kind| FormFieldDef {
					name: col.field_name().to_string(),
					kind: kind.clone(),
					required: *kind != crate::forms::FieldKind::Boolean,
				})
			})
			.collect();
		let forms = rows
			.iter()
			.enumerate()
			.map(|(index, row)| {
				let initial = fields
					.iter()
					.filter_map(|field| {
						row.field(&field.name).map(|value| (field.name.clone(), value))
					})
					.collect();
				let pk = row.field(&self.pk_field).unwrap_or(Value::Null);
				EditForm::new(
					format!("{namespace}-{index}"),
					pk,
					fields.clone(),
					initial,
				)
			})
			.collect();
		EditFormSet::new(namespace, forms)
	}
}

/// Titleized form of a column key, used for implicit headers: each
/// alphabetic run is capitalized, everything else (underscores
/// included) is preserved.
fn title_case(key: &str) -> String {
	let mut out = String::with_capacity(key.len());
	let mut at_word_start = true;
	for ch in key.chars() {
		if ch.is_alphabetic() {
			if at_word_start {
				out.extend(ch.to_uppercase());
			} else {
				out.extend(ch.to_lowercase());
			}
			at_word_start = false;
		} else {
			out.push(ch);
			at_word_start = true;
		}
	}
	out
}
