//! Bulk-edit forms and form-sets.
//!
//! An [`EditFormSet`] is one form per row of a table page, named the way
//! formsets name their inputs: `{namespace}-{index}-{field}`. Binding
//! pulls submitted values out of a flat form-data map; validation is
//! per-field through [`FieldKind::clean`]. Saving is deliberately
//! partial: every individually-valid form is persisted through the
//! [`RowStore`] seam even when the set as a whole fails, and the caller
//! gets the bound set back so invalid rows can be re-displayed with
//! their errors.

use std::collections::HashMap;

use serde_json::{Number, Value, json};

/// Key under which form-level (non-field) errors are collected.
pub const ALL_FIELDS_KEY: &str = "_all";

/// Errors raised by form validation and persistence.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	/// A single field failed to clean.
	#[error("field {field}: {message}")]
	Field {
		/// The offending field name.
		field: String,
		/// Human-readable reason.
		message: String,
	},

	/// The form was asked for cleaned data before being bound.
	#[error("form is not bound")]
	NotBound,

	/// The row store rejected a record.
	#[error("save failed for record {pk}: {message}")]
	Save {
		/// Primary key of the record, rendered for display.
		pk: String,
		/// Store-provided reason.
		message: String,
	},
}

/// The value type of an editable column, with its cleaning rules.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	/// Free text, optionally bounded.
	Char {
		/// Maximum accepted length in characters.
		max_length: Option<usize>,
	},
	/// Whole number.
	Integer,
	/// Floating-point number.
	Float,
	/// Checkbox semantics: an absent value binds as `false`.
	Boolean,
}

impl FieldKind {
	/// Parses and validates one submitted value.
	pub fn clean(&self, raw: &str) -> Result<Value, String> {
		match self {
			FieldKind::Char { max_length } => {
				if let Some(max) = max_length
					&& raw.chars().count() > *max
				{
					return Err(format!("ensure this value has at most {max} characters"));
				}
				Ok(json!(raw))
			}
			FieldKind::Integer => raw
				.trim()
				.parse::<i64>()
				.map(|n| json!(n))
				.map_err(|_| "enter a whole number".to_string()),
			FieldKind::Float => raw
				.trim()
				.parse::<f64>()
				.ok()
				.and_then(Number::from_f64)
				.map(Value::Number)
				.ok_or_else(|| "enter a number".to_string()),
			FieldKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
				"true" | "on" | "1" => Ok(json!(true)),
				"false" | "off" | "0" | "" => Ok(json!(false)),
				_ => Err("enter a valid boolean".to_string()),
			},
		}
	}
}

/// Declaration of one editable field within a form.
#[derive(Debug, Clone)]
pub struct FormFieldDef {
	/// Field name, matching the column's field.
	pub name: String,
	/// Value type and cleaning rules.
	pub kind: FieldKind,
	/// Whether a submitted value must be present and non-empty.
	pub required: bool,
}

/// Per-record save seam used by [`EditFormSet::save`].
pub trait RowStore {
	/// Persists the cleaned changes for the record identified by `pk`.
	fn save(&mut self, pk: &Value, changes: &HashMap<String, Value>) -> Result<(), FormError>;
}

/// Outcome of a form-set save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
	/// Records persisted.
	pub saved: usize,
	/// Records skipped because their form was invalid or the store
	/// rejected them.
	pub failed: usize,
}

impl SaveReport {
	/// Whether every record was persisted.
	pub fn all_saved(&self) -> bool {
		self.failed == 0
	}

	pub(crate) fn absorb(&mut self, other: SaveReport) {
		self.saved += other.saved;
		self.failed += other.failed;
	}
}

/// One row's edit form.
#[derive(Debug, Clone)]
pub struct EditForm {
	prefix: String,
	pk: Value,
	fields: Vec<FormFieldDef>,
	initial: HashMap<String, Value>,
	data: HashMap<String, String>,
	cleaned: HashMap<String, Value>,
	errors: HashMap<String, Vec<String>>,
	is_bound: bool,
}

impl EditForm {
	/// Creates an unbound form with initial values taken from the row.
	pub fn new(
		prefix: impl Into<String>,
		pk: Value,
		fields: Vec<FormFieldDef>,
		initial: HashMap<String, Value>,
	) -> Self {
		Self {
			prefix: prefix.into(),
			pk,
			fields,
			initial,
			data: HashMap::new(),
			cleaned: HashMap::new(),
			errors: HashMap::new(),
			is_bound: false,
		}
	}

	/// The `{namespace}-{index}` prefix for this form's inputs.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Primary key of the row being edited.
	pub fn pk(&self) -> &Value {
		&self.pk
	}

	/// Declared fields, in column order.
	pub fn fields(&self) -> &[FormFieldDef] {
		&self.fields
	}

	/// Initial values keyed by field name.
	pub fn initial(&self) -> &HashMap<String, Value> {
		&self.initial
	}

	/// The full input name for `field`, as rendered in the template.
	pub fn input_name(&self, field: &str) -> String {
		format!("{}-{}", self.prefix, field)
	}

	/// Whether submitted data has been attached.
	pub fn is_bound(&self) -> bool {
		self.is_bound
	}

	/// Attaches submitted form data. Only keys carrying this form's
	/// prefix are considered.
	pub fn bind(&mut self, data: &HashMap<String, String>) {
		self.data.clear();
		self.cleaned.clear();
		self.errors.clear();
		for field in &self.fields {
			if let Some(raw) = data.get(&self.input_name(&field.name)) {
				self.data.insert(field.name.clone(), raw.clone());
			}
		}
		self.is_bound = true;
	}

	/// Runs validation. An unbound form is never valid.
	pub fn is_valid(&mut self) -> bool {
		if !self.is_bound {
			return false;
		}
		self.cleaned.clear();
		self.errors.clear();
		for field in self.fields.clone() {
			match self.data.get(&field.name) {
				Some(raw) if !raw.is_empty() => match field.kind.clean(raw) {
					Ok(value) => {
						self.cleaned.insert(field.name.clone(), value);
					}
					Err(message) => {
						self.errors.entry(field.name.clone()).or_default().push(message);
					}
				},
				// Absent checkbox binds as false.
				_ if field.kind == FieldKind::Boolean => {
					self.cleaned.insert(field.name.clone(), json!(false));
				}
				_ if field.required => {
					self.errors
						.entry(field.name.clone())
						.or_default()
						.push("this field is required".to_string());
				}
				_ => {}
			}
		}
		self.errors.is_empty()
	}

	/// Validation errors keyed by field name (plus [`ALL_FIELDS_KEY`]).
	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		&self.errors
	}

	/// Cleaned values for the fields that validated.
	pub fn cleaned_data(&self) -> &HashMap<String, Value> {
		&self.cleaned
	}

	fn record_save_error(&mut self, error: &FormError) {
		self.errors
			.entry(ALL_FIELDS_KEY.to_string())
			.or_default()
			.push(error.to_string());
	}
}

/// One form per row of a table page.
#[derive(Debug, Clone, Default)]
pub struct EditFormSet {
	namespace: String,
	forms: Vec<EditForm>,
}

impl EditFormSet {
	/// Wraps the per-row forms under a table namespace.
	pub fn new(namespace: impl Into<String>, forms: Vec<EditForm>) -> Self {
		Self {
			namespace: namespace.into(),
			forms,
		}
	}

	/// The owning table's namespace.
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// The contained forms, in page order.
	pub fn forms(&self) -> &[EditForm] {
		&self.forms
	}

	/// Mutable access to the contained forms.
	pub fn forms_mut(&mut self) -> &mut [EditForm] {
		&mut self.forms
	}

	/// Binds every form against one flat submitted-data map.
	pub fn bind(&mut self, data: &HashMap<String, String>) {
		for form in &mut self.forms {
			form.bind(data);
		}
	}

	/// Validates every form; does not short-circuit, so each form ends
	/// up carrying its own errors.
	pub fn is_valid(&mut self) -> bool {
		let mut valid = true;
		for form in &mut self.forms {
			valid &= form.is_valid();
		}
		valid
	}

	/// Persists every individually-valid form, even when the set as a
	/// whole is invalid. Store rejections are recorded on the offending
	/// form and counted as failures.
	pub fn save(&mut self, store: &mut dyn RowStore) -> SaveReport {
		let mut report = SaveReport::default();
		for form in &mut self.forms {
			if !form.is_valid() {
				report.failed += 1;
				continue;
			}
			match store.save(&form.pk, &form.cleaned) {
				Ok(()) => report.saved += 1,
				Err(error) => {
					tracing::warn!(prefix = form.prefix(), %error, "row store rejected record");
					form.record_save_error(&error);
					report.failed += 1;
				}
			}
		}
		if report.failed > 0 {
			tracing::warn!(
				namespace = %self.namespace,
				saved = report.saved,
				failed = report.failed,
				"partial form-set save"
			);
		}
		report
	}
}

/// The CSV export form: a single hidden field carrying the ids to
/// export, comma-joined.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExportForm;

impl CsvExportForm {
	/// Name of the hidden input.
	pub const FIELD: &'static str = "id";

	/// Joins ids into the hidden field's initial value.
	pub fn initial_ids<I>(ids: I) -> String
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		ids.into_iter()
			.map(|id| id.as_ref().to_string())
			.collect::<Vec<_>>()
			.join(",")
	}

	/// Splits a submitted hidden-field value back into ids.
	pub fn parse_ids(raw: &str) -> Vec<String> {
		raw.split(',')
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.map(str::to_string)
			.collect()
	}
}
