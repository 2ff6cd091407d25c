//! Sort tokens and their application.
//!
//! A sort request arrives as a single query-parameter token: the field
//! to order by, prefixed with `-` for descending. Application is
//! deliberately forgiving — an already-ordered set, an unrecognized
//! token, or a field the backend cannot order by all leave the set
//! exactly as it was. A degraded sort is a display nuisance, not a
//! request failure.

use std::fmt;

use crate::resultset::ResultSet;
use crate::table::Table;

/// A parsed sort request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortChoice {
	/// Field (or accessor chain) to order by.
	pub field: String,
	/// Whether the ordering is reversed.
	pub descending: bool,
}

impl SortChoice {
	/// Decomposes a raw token. Empty tokens (or a bare `-`) parse to
	/// `None`.
	pub fn parse(token: &str) -> Option<Self> {
		let token = token.trim();
		let (field, descending) = match token.strip_prefix('-') {
			Some(rest) => (rest, true),
			None => (token, false),
		};
		if field.is_empty() {
			return None;
		}
		Some(Self {
			field: field.to_string(),
			descending,
		})
	}

	/// Renders the token form, `-`-prefixed when descending.
	pub fn token(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for SortChoice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.descending {
			write!(f, "-{}", self.field)
		} else {
			f.write_str(&self.field)
		}
	}
}

/// Applies a raw sort token to a result set, honoring the table's
/// declared sortable columns.
///
/// Returns the (possibly reordered) set together with the sort that was
/// actually applied, for echoing back into the rendered context.
pub fn apply_sort<Q: ResultSet>(
	table: &Table<Q>,
	queryset: Q,
	raw_token: Option<&str>,
) -> (Q, Option<SortChoice>) {
	let Some(raw) = raw_token else {
		return (queryset, None);
	};
	if queryset.is_ordered() {
		return (queryset, None);
	}
	let Some(choice) = SortChoice::parse(raw) else {
		return (queryset, None);
	};
	let recognized = table
		.columns()
		.any(|(_, col)| col.is_sortable() && col.sort_key() == choice.field);
	if !recognized {
		tracing::debug!(token = raw, "ignoring unrecognized sort token");
		return (queryset, None);
	}
	if !queryset.can_order_by(&choice.field) {
		tracing::debug!(
			field = %choice.field,
			"field is not orderable, leaving result set unordered"
		);
		return (queryset, None);
	}
	let mut queryset = queryset.order_by(&choice.field);
	if choice.descending {
		queryset = queryset.reverse();
	}
	(queryset, Some(choice))
}
