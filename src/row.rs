//! Row access primitives.
//!
//! A row is whatever the backing result set yields: a typed record or a
//! plain key/value mapping. Columns only ever see rows through the
//! [`FieldAccess`] capability, so the two representations behave
//! identically; they differ only in the lookup primitive behind
//! [`FieldAccess::field`].
//!
//! Accessor chains (`"owner__full_name"`, `"created.date"`) are resolved
//! segment by segment against the value returned for the first segment.
//! A missing or null intermediate value short-circuits the chain.

use serde_json::{Map, Value};

/// Field lookup capability for one row of table data.
///
/// Implement this for typed records by matching on the field name;
/// computed values (the equivalent of a zero-argument method on the
/// record) are exposed the same way as stored ones. Mappings get the
/// provided implementations below.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use sheepdog_tables::FieldAccess;
///
/// struct Participant {
/// 	name: String,
/// 	score: i64,
/// }
///
/// impl FieldAccess for Participant {
/// 	fn field(&self, name: &str) -> Option<Value> {
/// 		match name {
/// 			"name" => Some(json!(self.name)),
/// 			"score" => Some(json!(self.score)),
/// 			_ => None,
/// 		}
/// 	}
/// }
///
/// let row = Participant { name: "Ada".into(), score: 3 };
/// assert_eq!(row.field("name"), Some(json!("Ada")));
/// assert_eq!(row.field("missing"), None);
/// ```
pub trait FieldAccess {
	/// Returns the value stored under `name`, or `None` when the row
	/// does not carry that field.
	fn field(&self, name: &str) -> Option<Value>;
}

impl FieldAccess for Map<String, Value> {
	fn field(&self, name: &str) -> Option<Value> {
		self.get(name).cloned()
	}
}

impl FieldAccess for Value {
	fn field(&self, name: &str) -> Option<Value> {
		self.get(name).cloned()
	}
}

/// Resolves an accessor chain against a row.
///
/// The relation separator `__` is normalized to `.` before splitting, so
/// `"owner__full_name"` and `"owner.full_name"` name the same path. The
/// first segment goes through [`FieldAccess::field`]; later segments
/// walk nested objects. Returns `None` the moment an intermediate value
/// is absent or null.
pub fn resolve_chain<R: FieldAccess + ?Sized>(row: &R, chain: &str) -> Option<Value> {
	let normalized = chain.replace("__", ".");
	let mut segments = normalized.split('.');
	let first = segments.next()?;
	let mut current = row.field(first)?;
	for segment in segments {
		if current.is_null() {
			return None;
		}
		current = current.get(segment)?.clone();
	}
	Some(current)
}

/// Whether a resolved value counts as absent for default substitution.
///
/// Null, `false`, zero, the empty string, and empty collections are all
/// falsy. A real `0` is therefore indistinguishable from a missing value
/// — that substitution is part of the column contract, not an accident.
pub fn is_falsy(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(b) => !b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
	}
}

/// Renders a value the way cells and URL arguments need it: strings
/// verbatim, everything else through `Display`.
pub(crate) fn display_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
