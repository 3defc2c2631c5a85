//! Error types for the HTML and form builders

/// Errors raised by the builders.
///
/// Rendering a field never fails; only the operations that need a
/// collaborator which may be missing (CSRF token) or a registered
/// extension return a [`HtmlResult`].
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
	/// No component or macro is registered under the requested name.
	#[error("Method {builder}::{name} does not exist.")]
	UnknownExtension {
		builder: &'static str,
		name: String,
	},
	/// A CSRF field was requested without an explicit token or a session store.
	#[error("CSRF token unavailable: no explicit token was set and no session store is attached")]
	MissingCsrfToken,
	/// Settings text could not be parsed.
	#[error("Invalid form settings: {0}")]
	Settings(#[from] toml::de::Error),
}

pub type HtmlResult<T> = Result<T, HtmlError>;
