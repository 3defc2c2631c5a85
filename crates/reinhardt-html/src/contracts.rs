//! Collaborators the builders depend on
//!
//! URL generation, view rendering, the session and the current request are
//! owned by the surrounding application. The builders only see them through
//! these traits. In-memory implementations of the session and request live
//! in [`crate::memory`].

use serde_json::{Map, Value};

/// Generates URLs for links, assets and form targets.
pub trait UrlGenerator: Send + Sync {
	/// URL for a path, with extra path segments appended.
	fn to(&self, path: &str, extra: &[String], secure: Option<bool>) -> String;

	/// URL for a named route.
	fn route(&self, name: &str, parameters: &Value, secure: Option<bool>) -> String;

	/// URL for a controller action identifier.
	fn action(&self, action: &str, parameters: &Value, secure: Option<bool>) -> String;

	/// URL of the current request.
	fn current(&self) -> String;

	/// URL for a static asset.
	fn asset(&self, path: &str, secure: Option<bool>) -> String;
}

/// Renders named views, and exposes the validation errors shared with them.
pub trait ViewFactory: Send + Sync {
	fn render(&self, view: &str, data: &Map<String, Value>) -> String;

	/// Number of validation errors in the error bag shared with every view.
	fn shared_error_count(&self) -> usize {
		0
	}
}

/// Session-backed store of the input flashed before a redirect-back.
pub trait SessionStore: Send + Sync {
	/// Old input stored under a normalized (dotted) key.
	fn old_input(&self, key: &str) -> Option<Value>;

	/// Number of top-level old input entries.
	fn old_input_count(&self) -> usize;

	/// CSRF token of the session, when one has been issued.
	fn token(&self) -> Option<String>;
}

/// Read access to the input of the current request.
pub trait RequestAccessor: Send + Sync {
	/// Submitted value under a normalized (dotted) key.
	fn input(&self, key: &str) -> Option<Value>;
}
