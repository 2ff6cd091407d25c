//! Template helpers.
//!
//! Three helpers cover what table templates need beyond plain variable
//! access: keyed lookup into dicts and lists (`get`), building a cell's
//! hyperlink from a link definition and the current row (`urlbuilder`),
//! and resolving an accessor chain on an object (`call` — the rendition
//! of calling a zero-argument method, which the row capability model
//! exposes as a field). All three fail soft: a missing key renders as
//! null or an empty string, never a template error.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tera::Tera;

use crate::row::{display_value, resolve_chain};
use crate::urls::UrlMap;

/// Registers the `get` filter and the `urlbuilder`/`call` functions on
/// a tera instance.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sheepdog_tables::{UrlMap, templatetags};
/// use tera::Tera;
///
/// let mut tera = Tera::default();
/// let urls = Arc::new(UrlMap::new().route("detail", "/p/{id}/"));
/// templatetags::register(&mut tera, urls);
/// ```
pub fn register(tera: &mut Tera, urls: Arc<UrlMap>) {
	tera.register_filter("get", get_filter);
	tera.register_function("urlbuilder", UrlBuilder { urls });
	tera.register_function("call", call_function);
}

/// `{{ value | get(key="name") }}` — dict lookup by key or list lookup
/// by index; anything missing renders as null.
fn get_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
	let Some(key) = args.get("key") else {
		return Err(tera::Error::msg("the get filter requires a key argument"));
	};
	let found = match (value, key) {
		(Value::Object(map), Value::String(name)) => map.get(name).cloned(),
		(Value::Array(items), index) => index
			.as_u64()
			.and_then(|i| items.get(i as usize))
			.cloned(),
		_ => None,
	};
	Ok(found.unwrap_or(Value::Null))
}

/// `{{ urlbuilder(url=column_url, obj=row) }}` — resolves the link
/// definition's args against the row and reverses the named pattern.
struct UrlBuilder {
	urls: Arc<UrlMap>,
}

impl tera::Function for UrlBuilder {
	fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
		let (Some(url), Some(obj)) = (args.get("url"), args.get("obj")) else {
			return Ok(Value::String(String::new()));
		};
		let Some(name) = url.get("name").and_then(Value::as_str) else {
			return Ok(Value::String(String::new()));
		};
		let arg_names: Vec<&str> = url
			.get("args")
			.and_then(Value::as_array)
			.map(|items| items.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default();
		let resolved: Vec<String> = arg_names
			.iter()
			.map(|arg| match resolve_chain(obj, arg) {
				Some(value) if !value.is_null() => display_value(&value),
				_ => (*arg).to_string(),
			})
			.collect();
		self.urls
			.reverse(name, &resolved)
			.map(Value::String)
			.map_err(|e| tera::Error::msg(e.to_string()))
	}
}

/// `{{ call(obj=row, name="owner.display_name") }}` — accessor-chain
/// lookup on an object; a missing target renders as an empty string.
fn call_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
	let (Some(obj), Some(name)) = (args.get("obj"), args.get("name").and_then(Value::as_str))
	else {
		return Ok(Value::String(String::new()));
	};
	Ok(resolve_chain(obj, name).unwrap_or_else(|| Value::String(String::new())))
}
