//! In-memory session and request collaborators

use crate::contracts::{RequestAccessor, SessionStore};
use crate::value::data_get_in;
use serde_json::{Map, Value};

/// Session store holding flashed old input and a CSRF token in memory
///
/// # Examples
///
/// ```
/// use reinhardt_html::memory::MemorySessionStore;
/// use reinhardt_html::SessionStore;
/// use serde_json::json;
///
/// let session = MemorySessionStore::new()
///     .with_old_input(json!({"user": {"email": "a@example.com"}}))
///     .with_token("abc");
/// assert_eq!(session.old_input("user.email"), Some(json!("a@example.com")));
/// assert_eq!(session.old_input_count(), 1);
/// assert_eq!(session.token().as_deref(), Some("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
	old_input: Map<String, Value>,
	token: Option<String>,
}

impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the flashed input. Anything other than a JSON object clears it.
	pub fn with_old_input(mut self, input: Value) -> Self {
		self.old_input = match input {
			Value::Object(map) => map,
			_ => Map::new(),
		};
		self
	}

	pub fn with_token(mut self, token: impl Into<String>) -> Self {
		self.token = Some(token.into());
		self
	}
}

impl SessionStore for MemorySessionStore {
	fn old_input(&self, key: &str) -> Option<Value> {
		lookup(&self.old_input, key)
	}

	fn old_input_count(&self) -> usize {
		self.old_input.len()
	}

	fn token(&self) -> Option<String> {
		self.token.clone()
	}
}

/// Current request input held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRequest {
	input: Map<String, Value>,
}

impl MemoryRequest {
	pub fn new(input: Value) -> Self {
		let input = match input {
			Value::Object(map) => map,
			_ => Map::new(),
		};
		Self { input }
	}
}

impl RequestAccessor for MemoryRequest {
	fn input(&self, key: &str) -> Option<Value> {
		lookup(&self.input, key)
	}
}

fn lookup(map: &Map<String, Value>, key: &str) -> Option<Value> {
	data_get_in(map, key).filter(|v| !v.is_null()).cloned()
}
