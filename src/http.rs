//! Minimal request/response pair.
//!
//! The pipeline needs exactly two things from the HTTP layer: query
//! parameters (namespaced page/sort/filter values) and urlencoded form
//! bodies (bulk-edit and export POSTs). These types carry just that,
//! over the standard `http` vocabulary, so embedding into a real server
//! is a field-by-field copy.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use http::{Method, StatusCode, Uri};

use crate::error::{Result, TableError};

/// An incoming request, reduced to what the table pipeline reads.
#[derive(Debug, Clone)]
pub struct Request {
	method: Method,
	uri: Uri,
	headers: HeaderMap,
	body: Bytes,
	query_params: HashMap<String, String>,
}

impl Request {
	/// Starts building a request.
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// Convenience GET constructor.
	///
	/// # Examples
	///
	/// ```
	/// use sheepdog_tables::Request;
	///
	/// let request = Request::get("/roster?main_table-page=2").unwrap();
	/// assert_eq!(request.query_param("main_table-page"), Some("2"));
	/// ```
	pub fn get(uri: &str) -> Result<Self> {
		Self::builder().uri(uri).build()
	}

	/// Convenience urlencoded-POST constructor.
	pub fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Result<Self> {
		Self::builder().method(Method::POST).uri(uri).form(pairs)?.build()
	}

	/// The request method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// The request path.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// The request headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// One decoded query parameter.
	pub fn query_param(&self, name: &str) -> Option<&str> {
		self.query_params.get(name).map(String::as_str)
	}

	/// Every decoded query parameter.
	pub fn query_params(&self) -> &HashMap<String, String> {
		&self.query_params
	}

	/// Parses the body as urlencoded form data. A body in any other
	/// shape yields an empty map.
	pub fn form_data(&self) -> HashMap<String, String> {
		serde_urlencoded::from_bytes::<Vec<(String, String)>>(&self.body)
			.unwrap_or_default()
			.into_iter()
			.collect()
	}
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: String,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	/// Starts with GET `/`.
	pub fn new() -> Self {
		Self {
			method: None,
			uri: "/".to_string(),
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Sets the method.
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	/// Sets the URI (path plus optional query string).
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	/// Sets one header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	/// Attaches an urlencoded form body and its content type.
	pub fn form(mut self, pairs: &[(&str, &str)]) -> Result<Self> {
		let encoded =
			serde_urlencoded::to_string(pairs).map_err(|e| TableError::Encoding(e.to_string()))?;
		self.body = Bytes::from(encoded);
		self.headers.insert(
			CONTENT_TYPE,
			HeaderValue::from_static("application/x-www-form-urlencoded"),
		);
		Ok(self)
	}

	/// Attaches a raw body.
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Parses the URI and finalizes the request.
	pub fn build(self) -> Result<Request> {
		let uri: Uri = self.uri.parse()?;
		let query_params = uri
			.query()
			.map(|query| {
				serde_urlencoded::from_str::<Vec<(String, String)>>(query)
					.unwrap_or_default()
					.into_iter()
					.collect()
			})
			.unwrap_or_default();
		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			headers: self.headers,
			body: self.body,
			query_params,
		})
	}
}

/// An outgoing response.
#[derive(Debug, Clone)]
pub struct Response {
	/// Status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Bytes,
}

impl Response {
	/// Creates an empty response with the given status.
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// 200 OK with no body.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// 302 redirect to `location`.
	pub fn redirect(location: &str) -> Result<Self> {
		let mut response = Self::new(StatusCode::FOUND);
		response
			.headers
			.insert(LOCATION, HeaderValue::from_str(location)?);
		Ok(response)
	}

	/// Sets one header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	/// Sets the body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// The body as UTF-8 text, lossily decoded.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}
