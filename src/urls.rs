//! URL reversal seam.
//!
//! Link columns name a URL pattern, not a literal href; something has to
//! turn `("participants:detail", ["12"])` back into `/participants/12/`.
//! In a full framework that is the router's job — [`UrlMap`] is the
//! minimal registry standing in for it: named patterns with
//! `{placeholder}` segments, substituted positionally. A placeholder
//! with no argument left is kept verbatim rather than failing the
//! render.

use std::collections::HashMap;

use crate::error::{Result, TableError};

/// Registry of named URL patterns.
///
/// # Examples
///
/// ```
/// use sheepdog_tables::UrlMap;
///
/// let urls = UrlMap::new().route("participants:detail", "/participants/{id}/");
/// let url = urls.reverse("participants:detail", &["12".to_string()]).unwrap();
/// assert_eq!(url, "/participants/12/");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
	patterns: HashMap<String, String>,
}

impl UrlMap {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a pattern under a name.
	pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
		self.patterns.insert(name.into(), pattern.into());
		self
	}

	/// Substitutes `args` into the named pattern's placeholders, in
	/// order of appearance. Surplus args are ignored; surplus
	/// placeholders stay in place.
	pub fn reverse(&self, name: &str, args: &[String]) -> Result<String> {
		let pattern = self
			.patterns
			.get(name)
			.ok_or_else(|| TableError::NoReverseMatch(name.to_string()))?;
		let mut out = String::with_capacity(pattern.len());
		let mut remaining = args.iter();
		let mut chars = pattern.chars();
		while let Some(ch) = chars.next() {
			if ch != '{' {
				out.push(ch);
				continue;
			}
			let mut placeholder = String::new();
			let mut closed = false;
			for inner in chars.by_ref() {
				if inner == '}' {
					closed = true;
					break;
				}
				placeholder.push(inner);
			}
			match remaining.next() {
				Some(arg) if closed => out.push_str(arg),
				_ => {
					out.push('{');
					out.push_str(&placeholder);
					if closed {
						out.push('}');
					}
				}
			}
		}
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reverse_substitutes_positionally() {
		let urls = UrlMap::new().route("detail", "/p/{id}/{section}/");
		assert_eq!(
			urls.reverse("detail", &["1".to_string(), "files".to_string()])
				.unwrap(),
			"/p/1/files/"
		);
	}

	#[test]
	fn surplus_placeholder_is_kept() {
		let urls = UrlMap::new().route("detail", "/p/{id}/{section}/");
		assert_eq!(
			urls.reverse("detail", &["1".to_string()]).unwrap(),
			"/p/1/{section}/"
		);
	}

	#[test]
	fn unknown_name_is_an_error() {
		let urls = UrlMap::new();
		assert!(matches!(
			urls.reverse("nope", &[]),
			Err(TableError::NoReverseMatch(_))
		));
	}
}
