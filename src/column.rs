//! Column definitions.
//!
//! A [`Column`] describes how one field of a row is extracted, headed,
//! sorted, exported, and optionally linked or edited. Columns are plain
//! values configured with chained setters and registered on a table
//! builder; the registration key back-fills the field name when one was
//! not given explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::forms::FieldKind;
use crate::resultset::ResultSet;
use crate::row::{FieldAccess, display_value, is_falsy, resolve_chain};

/// Boxed row-to-value closure used for callable accessors.
pub type ValueFn<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Boxed result-set transformation used for column annotations.
pub type AnnotateFn<Q> = Arc<dyn Fn(Q) -> Q + Send + Sync>;

/// How a column reaches its value on a row.
pub enum Accessor<R> {
	/// A delimited attribute/key chain, resolved left-to-right.
	Path(String),
	/// A closure invoked with the row.
	Func(ValueFn<R>),
}

impl<R> Clone for Accessor<R> {
	fn clone(&self) -> Self {
		match self {
			Accessor::Path(path) => Accessor::Path(path.clone()),
			Accessor::Func(func) => Accessor::Func(Arc::clone(func)),
		}
	}
}

impl<R> fmt::Debug for Accessor<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Accessor::Path(path) => f.debug_tuple("Path").field(path).finish(),
			Accessor::Func(_) => f.debug_tuple("Func").finish(),
		}
	}
}

/// The link target of a column's cells.
///
/// `args` name row lookups (accessor chains); each resolves against the
/// row at render time and feeds the URL reversal positionally. An arg
/// that does not resolve passes through verbatim. `attrs` become anchor
/// attributes — never the href itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnUrl {
	/// Registered name of the target URL pattern.
	pub name: String,
	/// Row lookups feeding the pattern's placeholders, in order.
	pub args: Vec<String>,
	/// Static anchor-tag attributes.
	pub attrs: BTreeMap<String, String>,
}

impl ColumnUrl {
	/// Points at a registered URL pattern.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Appends one row lookup to the argument list.
	pub fn arg(mut self, accessor: impl Into<String>) -> Self {
		self.args.push(accessor.into());
		self
	}

	/// Sets one static anchor attribute.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Resolves every arg against `row`. Unresolved args pass through
	/// unchanged.
	pub fn resolve_args<R: FieldAccess>(&self, row: &R) -> Vec<String> {
		self.args
			.iter()
			.map(|arg| match resolve_chain(row, arg) {
				Some(value) if !value.is_null() => display_value(&value),
				_ => arg.clone(),
			})
			.collect()
	}
}

/// One table column.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sheepdog_tables::{Column, MemoryResultSet};
///
/// let column: Column<MemoryResultSet<serde_json::Value>> = Column::new()
/// 	.field("owner")
/// 	.header("Owner")
/// 	.accessor("owner__name")
/// 	.sortable(true);
///
/// let row = json!({"owner": {"name": "Ada"}});
/// assert_eq!(column.value(&row), json!("Ada"));
/// assert_eq!(column.value(&json!({})), json!("---"));
/// ```
pub struct Column<Q: ResultSet> {
	field: Option<String>,
	header: Option<String>,
	accessor: Option<Accessor<Q::Row>>,
	pub(crate) annotation: Option<AnnotateFn<Q>>,
	default: Value,
	css_class: Option<String>,
	url: Option<ColumnUrl>,
	editable: Option<FieldKind>,
	sortable: bool,
	sort_field: Option<String>,
	csv: Option<ValueFn<Q::Row>>,
}

impl<Q: ResultSet> Clone for Column<Q> {
	fn clone(&self) -> Self {
		Self {
			field: self.field.clone(),
			header: self.header.clone(),
			accessor: self.accessor.clone(),
			annotation: self.annotation.clone(),
			default: self.default.clone(),
			css_class: self.css_class.clone(),
			url: self.url.clone(),
			editable: self.editable.clone(),
			sortable: self.sortable,
			sort_field: self.sort_field.clone(),
			csv: self.csv.clone(),
		}
	}
}

impl<Q: ResultSet> fmt::Debug for Column<Q> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Column")
			.field("field", &self.field)
			.field("header", &self.header)
			.field("accessor", &self.accessor)
			.field("default", &self.default)
			.field("sortable", &self.sortable)
			.field("sort_field", &self.sort_field)
			.finish_non_exhaustive()
	}
}

impl<Q: ResultSet> Default for Column<Q> {
	fn default() -> Self {
		Self::new()
	}
}

impl<Q: ResultSet> Column<Q> {
	/// Creates a column with the stock defaults: no accessor, the
	/// `"---"` placeholder, not sortable, not editable.
	pub fn new() -> Self {
		Self {
			field: None,
			header: None,
			accessor: None,
			annotation: None,
			default: json!("---"),
			css_class: None,
			url: None,
			editable: None,
			sortable: false,
			sort_field: None,
			csv: None,
		}
	}

	/// Sets the field this column reads. Usually left unset and
	/// back-filled from the registration key.
	pub fn field(mut self, field: impl Into<String>) -> Self {
		self.field = Some(field.into());
		self
	}

	/// Sets the header text. Unset headers fall back to a titleized
	/// form of the column key.
	pub fn header(mut self, header: impl Into<String>) -> Self {
		self.header = Some(header.into());
		self
	}

	/// Sets a chain accessor, e.g. `"created.date"` or
	/// `"participant__full_name"`.
	pub fn accessor(mut self, path: impl Into<String>) -> Self {
		self.accessor = Some(Accessor::Path(path.into()));
		self
	}

	/// Sets a callable accessor invoked with the row.
	pub fn accessor_fn(mut self, func: impl Fn(&Q::Row) -> Value + Send + Sync + 'static) -> Self {
		self.accessor = Some(Accessor::Func(Arc::new(func)));
		self
	}

	/// Sets an annotation applied to the result set before values are
	/// read.
	pub fn annotation(mut self, func: impl Fn(Q) -> Q + Send + Sync + 'static) -> Self {
		self.annotation = Some(Arc::new(func));
		self
	}

	/// Replaces the `"---"` placeholder shown for absent values.
	pub fn default_value(mut self, default: Value) -> Self {
		self.default = default;
		self
	}

	/// Sets a class applied to each cell of this column.
	pub fn css_class(mut self, class: impl Into<String>) -> Self {
		self.css_class = Some(class.into());
		self
	}

	/// Links this column's cells to a URL pattern.
	pub fn url(mut self, url: ColumnUrl) -> Self {
		self.url = Some(url);
		self
	}

	/// Marks this column editable, rendering a form field of the given
	/// kind in bulk-edit mode.
	pub fn editable(mut self, kind: FieldKind) -> Self {
		self.editable = Some(kind);
		self
	}

	/// Marks this column sortable.
	pub fn sortable(mut self, sortable: bool) -> Self {
		self.sortable = sortable;
		self
	}

	/// Overrides the field used for ordering when the accessor is not
	/// something the backend can order by.
	pub fn sort_field(mut self, field: impl Into<String>) -> Self {
		self.sort_field = Some(field.into());
		self
	}

	/// Overrides the value written to CSV exports.
	pub fn csv_value_fn(mut self, func: impl Fn(&Q::Row) -> Value + Send + Sync + 'static) -> Self {
		self.csv = Some(Arc::new(func));
		self
	}

	pub(crate) fn fill_field(&mut self, key: &str) {
		if self.field.is_none() {
			self.field = Some(key.to_string());
		}
	}

	/// The field this column reads.
	pub fn field_name(&self) -> &str {
		self.field.as_deref().unwrap_or_default()
	}

	/// The explicit header text, if one was set.
	pub fn header_text(&self) -> Option<&str> {
		self.header.as_deref()
	}

	/// The cell class, if one was set.
	pub fn css(&self) -> Option<&str> {
		self.css_class.as_deref()
	}

	/// The placeholder used for absent values.
	pub fn placeholder(&self) -> &Value {
		&self.default
	}

	/// Whether this column participates in sorting.
	pub fn is_sortable(&self) -> bool {
		self.sortable
	}

	/// Whether this column renders a form field in bulk-edit mode.
	pub fn is_editable(&self) -> bool {
		self.editable.is_some()
	}

	/// The form-field kind for editable columns.
	pub fn editor(&self) -> Option<&FieldKind> {
		self.editable.as_ref()
	}

	/// Whether this column's cells are hyperlinked.
	pub fn is_linked(&self) -> bool {
		self.url.is_some()
	}

	/// The link definition, when [`is_linked`](Column::is_linked).
	pub fn column_url(&self) -> Option<&ColumnUrl> {
		self.url.as_ref()
	}

	/// Resolves this column's value on `row`.
	///
	/// Resolution order: a plain field with no accessor is read
	/// directly; a callable accessor is invoked; anything else is
	/// treated as a chain (the accessor path, else the field itself).
	/// Absent intermediates and falsy results fall back to the
	/// placeholder.
	pub fn value(&self, row: &Q::Row) -> Value {
		let field = self.field_name();
		let resolved = match &self.accessor {
			None if !field.contains("__") => row.field(field),
			Some(Accessor::Func(func)) => Some(func(row)),
			Some(Accessor::Path(path)) => resolve_chain(row, path),
			None => resolve_chain(row, field),
		};
		match resolved {
			Some(value) if !is_falsy(&value) => value,
			_ => self.default.clone(),
		}
	}

	/// The value written to CSV exports; defaults to [`value`]
	/// (Column::value) unless a CSV override was configured.
	///
	/// [`value`]: Column::value
	pub fn csv_value(&self, row: &Q::Row) -> Value {
		match &self.csv {
			Some(func) => func(row),
			None => self.value(row),
		}
	}

	/// The field ordering requests should use: the explicit sort field,
	/// else the accessor path, else the field itself.
	pub fn sort_key(&self) -> &str {
		if let Some(sort_field) = &self.sort_field {
			return sort_field;
		}
		if let Some(Accessor::Path(path)) = &self.accessor {
			return path;
		}
		self.field_name()
	}

	/// The query-parameter token selecting this column's ordering.
	pub fn sort_token(&self, descending: bool) -> String {
		if descending {
			format!("-{}", self.sort_key())
		} else {
			self.sort_key().to_string()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resultset::MemoryResultSet;
	use serde_json::json;

	type Col = Column<MemoryResultSet<Value>>;

	#[test]
	fn direct_lookup_falls_back_on_falsy() {
		let column = Col::new().field("score");
		assert_eq!(column.value(&json!({"score": 7})), json!(7));
		// A real zero is indistinguishable from a missing value.
		assert_eq!(column.value(&json!({"score": 0})), json!("---"));
		assert_eq!(column.value(&json!({})), json!("---"));
	}

	#[test]
	fn callable_accessor_wins() {
		let column = Col::new()
			.field("score")
			.accessor_fn(|row| json!(row.field("score").and_then(|v| v.as_i64()).unwrap_or(0) * 2));
		assert_eq!(column.value(&json!({"score": 4})), json!(8));
	}

	#[test]
	fn relation_field_resolves_as_chain() {
		let column = Col::new().field("owner__name");
		assert_eq!(column.value(&json!({"owner": {"name": "Ada"}})), json!("Ada"));
	}

	#[test]
	fn sort_key_precedence() {
		let explicit = Col::new().field("a").accessor("b").sort_field("c");
		assert_eq!(explicit.sort_key(), "c");
		let via_accessor = Col::new().field("a").accessor("b");
		assert_eq!(via_accessor.sort_key(), "b");
		let plain = Col::new().field("a");
		assert_eq!(plain.sort_key(), "a");
		assert_eq!(plain.sort_token(true), "-a");
	}

	#[test]
	fn url_args_pass_through_when_unresolved() {
		let url = ColumnUrl::new("participants:detail")
			.arg("id")
			.arg("section");
		let resolved = url.resolve_args(&json!({"id": 12}));
		assert_eq!(resolved, vec!["12".to_string(), "section".to_string()]);
	}
}
