//! The result-set seam.
//!
//! The pipeline never talks to a data source directly; it goes through
//! [`ResultSet`], a reduced rendition of an ORM query set: predicate
//! filtering, ordering with an "already ordered" flag, slicing, and a
//! final materialization step. Combinators consume and return `self` so
//! a lazy implementation can keep accumulating state until `slice` or
//! `into_rows` forces evaluation.
//!
//! [`MemoryResultSet`] is the built-in implementation over a `Vec` of
//! rows, standing in for a real backend in views fed from REST payloads
//! or test data.

use std::cmp::Ordering;

use serde_json::Value;

use crate::row::{FieldAccess, resolve_chain};

/// Comparison operators understood by [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
	/// Exact equality.
	Exact,
	/// Case-insensitive equality (strings only; falls back to `Exact`).
	IExact,
	/// Substring or element containment.
	Contains,
	/// Case-insensitive substring containment.
	IContains,
	/// Strictly greater than.
	Gt,
	/// Greater than or equal.
	Gte,
	/// Strictly less than.
	Lt,
	/// Less than or equal.
	Lte,
	/// Membership in an array of candidates.
	In,
}

/// One predicate applied to a result set.
#[derive(Debug, Clone)]
pub struct Filter {
	/// Field (or accessor chain) the predicate reads.
	pub field: String,
	/// How the row value is compared.
	pub operator: FilterOperator,
	/// The comparison operand.
	pub value: Value,
}

impl Filter {
	/// Creates a predicate.
	pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
		Self {
			field: field.into(),
			operator,
			value,
		}
	}

	/// Shorthand for an equality predicate.
	pub fn exact(field: impl Into<String>, value: Value) -> Self {
		Self::new(field, FilterOperator::Exact, value)
	}
}

/// A lazily evaluated, filterable, orderable, sliceable collection of
/// rows.
pub trait ResultSet: Sized + Send {
	/// The row representation this set yields.
	type Row: FieldAccess + Clone + Send;

	/// Whether an explicit ordering has already been applied.
	fn is_ordered(&self) -> bool;

	/// Whether `field` can be used for ordering. An empty set accepts
	/// any field; ordering it is harmless.
	fn can_order_by(&self, field: &str) -> bool;

	/// Orders ascending by `field`. Callers check [`can_order_by`]
	/// first; ordering by an unknown field is a no-op.
	///
	/// [`can_order_by`]: ResultSet::can_order_by
	fn order_by(self, field: &str) -> Self;

	/// Reverses the current ordering.
	fn reverse(self) -> Self;

	/// Applies one predicate.
	fn filter(self, filter: &Filter) -> Self;

	/// Number of rows after the predicates applied so far.
	fn len(&self) -> usize;

	/// Whether the set holds no rows.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Materializes the half-open row range `start..end`.
	fn slice(&self, start: usize, end: usize) -> Vec<Self::Row>;

	/// Materializes every row.
	fn into_rows(self) -> Vec<Self::Row>;
}

/// In-memory [`ResultSet`] over a list of rows.
///
/// The moral successor of wrapping a list of dictionaries so it quacks
/// like a query set: REST payloads, fixtures, and anything else already
/// in memory can feed the same pipeline as a real backend.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Map, Value};
/// use sheepdog_tables::{Filter, MemoryResultSet, ResultSet};
///
/// let rows: Vec<Map<String, Value>> = vec![
/// 	json!({"name": "Ada", "score": 3}),
/// 	json!({"name": "Grace", "score": 1}),
/// ]
/// .into_iter()
/// .map(|v| v.as_object().cloned().unwrap())
/// .collect();
///
/// let set = MemoryResultSet::new(rows)
/// 	.filter(&Filter::exact("name", json!("Ada")))
/// 	.order_by("score");
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryResultSet<R> {
	rows: Vec<R>,
	ordered: bool,
}

impl<R> MemoryResultSet<R>
where
	R: FieldAccess + Clone + Send,
{
	/// Wraps a list of rows. The set starts unordered regardless of the
	/// incoming order.
	pub fn new(rows: Vec<R>) -> Self {
		Self {
			rows,
			ordered: false,
		}
	}

	/// Borrowed view of the current rows.
	pub fn rows(&self) -> &[R] {
		&self.rows
	}
}

impl<R> ResultSet for MemoryResultSet<R>
where
	R: FieldAccess + Clone + Send,
{
	type Row = R;

	fn is_ordered(&self) -> bool {
		self.ordered
	}

	fn can_order_by(&self, field: &str) -> bool {
		self.rows.is_empty() || self.rows.iter().any(|row| resolve_chain(row, field).is_some())
	}

	fn order_by(mut self, field: &str) -> Self {
		// Stable sort keeps insertion order between equal keys.
		self.rows.sort_by(|a, b| {
			let left = resolve_chain(a, field).unwrap_or(Value::Null);
			let right = resolve_chain(b, field).unwrap_or(Value::Null);
			compare_values(&left, &right)
		});
		self.ordered = true;
		self
	}

	fn reverse(mut self) -> Self {
		self.rows.reverse();
		self
	}

	fn filter(mut self, filter: &Filter) -> Self {
		self.rows
			.retain(|row| matches(resolve_chain(row, &filter.field), filter));
		self
	}

	fn len(&self) -> usize {
		self.rows.len()
	}

	fn slice(&self, start: usize, end: usize) -> Vec<R> {
		let end = end.min(self.rows.len());
		let start = start.min(end);
		self.rows[start..end].to_vec()
	}

	fn into_rows(self) -> Vec<R> {
		self.rows
	}
}

/// Total order over JSON values: null < bool < number < string < array
/// < object, then by value within each kind.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
	fn rank(value: &Value) -> u8 {
		match value {
			Value::Null => 0,
			Value::Bool(_) => 1,
			Value::Number(_) => 2,
			Value::String(_) => 3,
			Value::Array(_) => 4,
			Value::Object(_) => 5,
		}
	}

	match (a, b) {
		(Value::Bool(x), Value::Bool(y)) => x.cmp(y),
		(Value::Number(x), Value::Number(y)) => {
			let x = x.as_f64().unwrap_or_default();
			let y = y.as_f64().unwrap_or_default();
			x.partial_cmp(&y).unwrap_or(Ordering::Equal)
		}
		(Value::String(x), Value::String(y)) => x.cmp(y),
		(Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
		(Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
		_ => rank(a).cmp(&rank(b)),
	}
}

fn matches(row_value: Option<Value>, filter: &Filter) -> bool {
	let Some(value) = row_value else {
		return false;
	};
	match filter.operator {
		FilterOperator::Exact => value == filter.value,
		FilterOperator::IExact => match (&value, &filter.value) {
			(Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
			_ => value == filter.value,
		},
		FilterOperator::Contains => match (&value, &filter.value) {
			(Value::String(haystack), Value::String(needle)) => haystack.contains(needle),
			(Value::Array(items), needle) => items.contains(needle),
			_ => false,
		},
		FilterOperator::IContains => match (&value, &filter.value) {
			(Value::String(haystack), Value::String(needle)) => {
				haystack.to_lowercase().contains(&needle.to_lowercase())
			}
			_ => false,
		},
		FilterOperator::Gt => compare_values(&value, &filter.value) == Ordering::Greater,
		FilterOperator::Gte => compare_values(&value, &filter.value) != Ordering::Less,
		FilterOperator::Lt => compare_values(&value, &filter.value) == Ordering::Less,
		FilterOperator::Lte => compare_values(&value, &filter.value) != Ordering::Greater,
		FilterOperator::In => match &filter.value {
			Value::Array(candidates) => candidates.contains(&value),
			_ => false,
		},
	}
}
