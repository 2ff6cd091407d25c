//! Declarative filter sets bound to query parameters.
//!
//! A [`FilterSet`] names the query parameters a view accepts and the
//! predicate each one becomes. Binding against a request captures the
//! parameters that were actually present; applying the bound set folds
//! the predicates into a result set. The sortable variant adds a
//! validated sort choice on top, rejecting tokens that do not match the
//! table's declared sortable columns.

use serde_json::{Value, json};

use crate::http::Request;
use crate::resultset::{Filter, FilterOperator, ResultSet};
use crate::sort::SortChoice;
use crate::table::Table;

/// One declared filter: a query parameter mapped onto a predicate.
#[derive(Debug, Clone)]
pub struct FilterField {
	/// Query-parameter name.
	pub name: String,
	/// Field (or accessor chain) the predicate reads.
	pub field: String,
	/// Comparison applied to the submitted value.
	pub operator: FilterOperator,
}

/// An ordered set of declared filters.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
	fields: Vec<FilterField>,
}

impl FilterSet {
	/// Starts a filter-set definition.
	pub fn builder() -> FilterSetBuilder {
		FilterSetBuilder::default()
	}

	/// The declared filters, in sequence order.
	pub fn fields(&self) -> &[FilterField] {
		&self.fields
	}

	/// Captures the parameters present on `request`. Absent and empty
	/// parameters are skipped.
	pub fn bind(&self, request: &Request) -> BoundFilterSet {
		let mut filters = Vec::new();
		let mut values = Vec::new();
		for field in &self.fields {
			let Some(raw) = request.query_param(&field.name) else {
				continue;
			};
			if raw.is_empty() {
				continue;
			}
			filters.push(Filter::new(
				field.field.clone(),
				field.operator,
				parse_param(raw),
			));
			values.push((field.name.clone(), raw.to_string()));
		}
		BoundFilterSet { filters, values }
	}
}

/// Builder for [`FilterSet`]; declaration order is the display order.
#[derive(Debug, Clone, Default)]
pub struct FilterSetBuilder {
	fields: Vec<FilterField>,
	sequence: Option<Vec<String>>,
}

impl FilterSetBuilder {
	/// Declares a filter whose parameter name doubles as the target
	/// field.
	pub fn field(self, name: impl Into<String>, operator: FilterOperator) -> Self {
		let name = name.into();
		let field = name.clone();
		self.field_for(name, field, operator)
	}

	/// Declares a filter with an explicit target field.
	pub fn field_for(
		mut self,
		name: impl Into<String>,
		field: impl Into<String>,
		operator: FilterOperator,
	) -> Self {
		self.fields.push(FilterField {
			name: name.into(),
			field: field.into(),
			operator,
		});
		self
	}

	/// Reorders (or narrows) the declared filters. Unknown names are
	/// dropped.
	pub fn sequence<I>(mut self, names: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.sequence = Some(names.into_iter().map(Into::into).collect());
		self
	}

	/// Finalizes the set.
	pub fn build(self) -> FilterSet {
		let fields = match self.sequence {
			None => self.fields,
			Some(sequence) => {
				let mut registry = self.fields;
				let mut ordered = Vec::with_capacity(sequence.len());
				for name in sequence {
					if let Some(position) = registry.iter().position(|f| f.name == name) {
						ordered.push(registry.remove(position));
					}
				}
				ordered
			}
		};
		FilterSet { fields }
	}
}

/// A filter set bound to one request's parameters.
#[derive(Debug, Clone, Default)]
pub struct BoundFilterSet {
	filters: Vec<Filter>,
	values: Vec<(String, String)>,
}

impl BoundFilterSet {
	/// The predicates captured from the request.
	pub fn filters(&self) -> &[Filter] {
		&self.filters
	}

	/// The raw submitted values, for re-displaying the filter form.
	pub fn values(&self) -> &[(String, String)] {
		&self.values
	}

	/// Consumes the binding, keeping only the submitted values.
	pub fn into_values(self) -> Vec<(String, String)> {
		self.values
	}

	/// Whether any parameter was submitted.
	pub fn is_empty(&self) -> bool {
		self.filters.is_empty()
	}

	/// Folds the captured predicates into a result set.
	pub fn apply<Q: ResultSet>(&self, queryset: Q) -> Q {
		self.filters
			.iter()
			.fold(queryset, |qs, filter| qs.filter(filter))
	}
}

/// A choice field validating sort tokens against a known set.
#[derive(Debug, Clone, Default)]
pub struct SortChoiceField {
	choices: Vec<(String, String)>,
}

impl SortChoiceField {
	/// Builds from explicit `(token, label)` choices.
	pub fn new(choices: Vec<(String, String)>) -> Self {
		Self { choices }
	}

	/// Builds the choices from a table's sortable columns.
	pub fn for_table<Q: ResultSet>(table: &Table<Q>) -> Self {
		Self::new(table.sort_choices())
	}

	/// The `(token, label)` pairs, for rendering a select widget.
	pub fn choices(&self) -> &[(String, String)] {
		&self.choices
	}

	/// Validates a raw token. Unknown tokens clean to `None` — a bad
	/// sort parameter is ignored, never an error.
	pub fn clean(&self, raw: &str) -> Option<SortChoice> {
		let choice = SortChoice::parse(raw)?;
		let token = choice.token();
		self.choices
			.iter()
			.any(|(candidate, _)| *candidate == token)
			.then_some(choice)
	}
}

/// A filter set paired with a validated sort choice.
#[derive(Debug, Clone)]
pub struct SortableFilterSet {
	base: FilterSet,
	sort: SortChoiceField,
}

impl SortableFilterSet {
	/// Pairs a filter set with explicit sort choices.
	pub fn new(base: FilterSet, sort: SortChoiceField) -> Self {
		Self { base, sort }
	}

	/// Pairs a filter set with a table's sortable columns.
	pub fn for_table<Q: ResultSet>(base: FilterSet, table: &Table<Q>) -> Self {
		Self::new(base, SortChoiceField::for_table(table))
	}

	/// The underlying filter set.
	pub fn filterset(&self) -> &FilterSet {
		&self.base
	}

	/// The sort choice field.
	pub fn sort_field(&self) -> &SortChoiceField {
		&self.sort
	}

	/// Binds filters and validates the sort parameter in one pass.
	pub fn bind(&self, request: &Request, sort_param: &str) -> (BoundFilterSet, Option<SortChoice>) {
		let bound = self.base.bind(request);
		let sort = request
			.query_param(sort_param)
			.and_then(|raw| self.sort.clean(raw));
		(bound, sort)
	}
}

/// Types a raw query-parameter value: integers and floats become
/// numbers, `true`/`false` become booleans, everything else stays a
/// string.
fn parse_param(raw: &str) -> Value {
	if let Ok(int) = raw.parse::<i64>() {
		return json!(int);
	}
	if let Ok(float) = raw.parse::<f64>() {
		return json!(float);
	}
	match raw {
		"true" => json!(true),
		"false" => json!(false),
		_ => json!(raw),
	}
}
