//! Form builder settings
//!
//! Settings can be built in code or read from a TOML table:
//!
//! ```toml
//! consider_request = true
//! empty_strings_become_null_after_validation_error = true
//! csrf_field = "csrfmiddlewaretoken"
//! ```

use crate::error::HtmlResult;
use serde::{Deserialize, Serialize};

/// Configuration consumed by [`crate::FormBuilder`] and its value resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
	/// Prefer values submitted with the current request over old input.
	pub consider_request: bool,
	/// The application turns empty submitted strings into null. When set, a
	/// field with no old input and no explicit value renders empty while the
	/// shared error bag is non-empty, instead of falling back to the model.
	pub empty_strings_become_null_after_validation_error: bool,
	/// Name of the hidden CSRF field.
	pub csrf_field: String,
	/// Name of the hidden field carrying a spoofed HTTP method.
	pub method_field: String,
	/// Value of the `accept-charset` attribute of opened forms.
	pub charset: String,
	/// Default `cols` of a textarea.
	pub textarea_cols: u32,
	/// Default `rows` of a textarea.
	pub textarea_rows: u32,
}

impl Default for FormSettings {
	fn default() -> Self {
		Self {
			consider_request: false,
			empty_strings_become_null_after_validation_error: false,
			csrf_field: "_token".to_string(),
			method_field: "_method".to_string(),
			charset: "UTF-8".to_string(),
			textarea_cols: 50,
			textarea_rows: 10,
		}
	}
}

impl FormSettings {
	/// Parse settings from TOML; missing keys keep their defaults
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_html::FormSettings;
	///
	/// let settings = FormSettings::from_toml_str("consider_request = true").unwrap();
	/// assert!(settings.consider_request);
	/// assert_eq!(settings.method_field, "_method");
	/// ```
	pub fn from_toml_str(text: &str) -> HtmlResult<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn with_consider_request(mut self, consider: bool) -> Self {
		self.consider_request = consider;
		self
	}

	pub fn with_empty_strings_become_null(mut self, enabled: bool) -> Self {
		self.empty_strings_become_null_after_validation_error = enabled;
		self
	}
}
