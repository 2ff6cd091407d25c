//! Error taxonomy for the table pipeline.
//!
//! Configuration mistakes (an empty column sequence, a missing redirect
//! target, a zero page size) are programming errors and fail fast with
//! [`TableError::ImproperlyConfigured`]. Data-access faults at request
//! time — an unsortable field, a page number past the end — are absorbed
//! by the pipeline and never reach this type; they degrade in place.

use crate::forms::FormError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors surfaced by table construction and the request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
	/// A declarative definition is unusable; raised at construction or
	/// first use, never in response to request data.
	#[error("{0}")]
	ImproperlyConfigured(String),

	/// A column key was requested that the table does not declare.
	#[error("table has no column {0:?}")]
	UnknownColumn(String),

	/// No URL pattern is registered under the given name.
	#[error("no url pattern registered under {0:?}")]
	NoReverseMatch(String),

	/// The request URI could not be parsed.
	#[error("invalid uri: {0}")]
	Uri(#[from] http::uri::InvalidUri),

	/// A header value could not be encoded.
	#[error("invalid header value: {0}")]
	Header(#[from] http::header::InvalidHeaderValue),

	/// A request body could not be encoded.
	#[error("could not encode form body: {0}")]
	Encoding(String),

	/// Writing CSV output failed.
	#[error("csv write failed: {0}")]
	Csv(#[from] csv::Error),

	/// A form or form-set level failure.
	#[error(transparent)]
	Form(#[from] FormError),

	/// The collaborator that produces the base result set failed.
	#[error("data access failed: {0}")]
	Source(String),
}
