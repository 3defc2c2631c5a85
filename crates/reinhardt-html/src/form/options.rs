//! Options of an opened `<form>`

use crate::attributes::{AttrValue, Attributes};
use serde_json::Value;

/// Methods carried in the spoofed-method field.
const SPOOFED_METHODS: [&str; 3] = ["PUT", "PATCH", "DELETE"];

/// Where a form submits to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormTarget {
	/// The URL of the current request
	#[default]
	Current,
	/// An application path
	Url(String),
	/// A named route with its parameters
	Route { name: String, parameters: Value },
	/// A controller action with its parameters
	Action { action: String, parameters: Value },
}

/// Options passed to [`crate::FormBuilder::open`]
///
/// Only one target can be set; the last of `url`, `route` and `action`
/// wins. Attributes that are not options are copied onto the `<form>` tag.
///
/// # Examples
///
/// ```
/// use reinhardt_html::form::{FormOptions, FormTarget};
///
/// let options = FormOptions::new()
///     .method("put")
///     .route("users.update", serde_json::json!({"user": 3}))
///     .files(true)
///     .with("class", "form");
///
/// assert_eq!(options.form_method(), "POST");
/// assert_eq!(options.spoofed_method().as_deref(), Some("PUT"));
/// assert!(matches!(options.target(), FormTarget::Route { .. }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
	method: String,
	target: FormTarget,
	files: bool,
	attributes: Attributes,
}

impl Default for FormOptions {
	fn default() -> Self {
		Self {
			method: "POST".to_string(),
			target: FormTarget::Current,
			files: false,
			attributes: Attributes::new(),
		}
	}
}

impl FormOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into().to_ascii_uppercase();
		self
	}

	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.target = FormTarget::Url(url.into());
		self
	}

	pub fn route(mut self, name: impl Into<String>, parameters: Value) -> Self {
		self.target = FormTarget::Route {
			name: name.into(),
			parameters,
		};
		self
	}

	pub fn action(mut self, action: impl Into<String>, parameters: Value) -> Self {
		self.target = FormTarget::Action {
			action: action.into(),
			parameters,
		};
		self
	}

	/// Submit as `multipart/form-data`.
	pub fn files(mut self, files: bool) -> Self {
		self.files = files;
		self
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.attributes.set(key, value);
		self
	}

	pub fn flag(mut self, token: impl Into<String>) -> Self {
		self.attributes.push_token(token);
		self
	}

	pub fn attributes(mut self, attributes: Attributes) -> Self {
		self.attributes = self.attributes.merge(attributes);
		self
	}

	/// Requested method, upper-cased.
	pub fn requested_method(&self) -> &str {
		&self.method
	}

	/// Method of the `<form>` tag itself: `GET` stays, anything else is `POST`.
	pub fn form_method(&self) -> &'static str {
		if self.method == "GET" { "GET" } else { "POST" }
	}

	/// Method to carry in the spoofed-method field, if any.
	pub fn spoofed_method(&self) -> Option<String> {
		SPOOFED_METHODS
			.contains(&self.method.as_str())
			.then(|| self.method.clone())
	}

	/// Whether the form needs a CSRF field.
	pub fn needs_token(&self) -> bool {
		self.method != "GET"
	}

	pub fn target(&self) -> &FormTarget {
		&self.target
	}

	pub fn has_files(&self) -> bool {
		self.files
	}

	pub(crate) fn into_attributes(self) -> Attributes {
		self.attributes
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("get", "GET", None, false)]
	#[case("post", "POST", None, true)]
	#[case("put", "POST", Some("PUT"), true)]
	#[case("Patch", "POST", Some("PATCH"), true)]
	#[case("DELETE", "POST", Some("DELETE"), true)]
	#[case("options", "POST", None, true)]
	fn test_method_normalization(
		#[case] method: &str,
		#[case] form_method: &str,
		#[case] spoofed: Option<&str>,
		#[case] token: bool,
	) {
		let options = FormOptions::new().method(method);
		assert_eq!(options.form_method(), form_method);
		assert_eq!(options.spoofed_method().as_deref(), spoofed);
		assert_eq!(options.needs_token(), token);
	}

	#[rstest]
	fn test_last_target_wins() {
		let options = FormOptions::new()
			.url("/a")
			.action("Users@store", json!({}))
			.url("/b");
		assert_eq!(options.target(), &FormTarget::Url("/b".to_string()));
	}

	#[rstest]
	fn test_defaults() {
		let options = FormOptions::default();
		assert_eq!(options.requested_method(), "POST");
		assert_eq!(options.target(), &FormTarget::Current);
		assert!(!options.has_files());
	}
}
