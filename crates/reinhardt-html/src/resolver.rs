//! Field value resolution
//!
//! Decides which value a form control displays. Sources are consulted in a
//! fixed order and the first one with a value wins:
//!
//! 1. the current request, when `consider_request` is enabled;
//! 2. old input flashed to the session by a failed validation round-trip;
//! 3. the value passed explicitly by the caller;
//! 4. the bound model.
//!
//! The spoofed-method field never reads from the request or old input.
//!
//! Old input that is a sequence is returned whole to `select` and
//! `checkbox` controls, which test membership. For every other control a
//! sequence is consumed one element per rendered field, so repeated
//! `tags[]` text inputs receive `tags[0]`, `tags[1]`, ... in order. The
//! per-key cursors behind this live in the resolver and are reset with
//! [`FieldValueResolver::reset`] whenever a form opens or closes.

use crate::contracts::{RequestAccessor, SessionStore};
use crate::model::FormModel;
use crate::settings::FormSettings;
use crate::value::{normalize_field_name, present};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Control currently being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControlType {
	#[default]
	Text,
	Password,
	Hidden,
	Search,
	Email,
	Tel,
	Number,
	Date,
	Datetime,
	DatetimeLocal,
	Time,
	Url,
	Week,
	Month,
	Color,
	Range,
	File,
	Image,
	Checkbox,
	Radio,
	Submit,
	Reset,
	Select,
	Textarea,
	Datalist,
	/// Any other `<input type="...">`
	Custom(String),
}

impl ControlType {
	pub fn as_str(&self) -> &str {
		match self {
			ControlType::Text => "text",
			ControlType::Password => "password",
			ControlType::Hidden => "hidden",
			ControlType::Search => "search",
			ControlType::Email => "email",
			ControlType::Tel => "tel",
			ControlType::Number => "number",
			ControlType::Date => "date",
			ControlType::Datetime => "datetime",
			ControlType::DatetimeLocal => "datetime-local",
			ControlType::Time => "time",
			ControlType::Url => "url",
			ControlType::Week => "week",
			ControlType::Month => "month",
			ControlType::Color => "color",
			ControlType::Range => "range",
			ControlType::File => "file",
			ControlType::Image => "image",
			ControlType::Checkbox => "checkbox",
			ControlType::Radio => "radio",
			ControlType::Submit => "submit",
			ControlType::Reset => "reset",
			ControlType::Select => "select",
			ControlType::Textarea => "textarea",
			ControlType::Datalist => "datalist",
			ControlType::Custom(name) => name,
		}
	}

	/// Controls that receive an old-input sequence whole.
	pub fn keeps_whole_sequence(&self) -> bool {
		matches!(self, ControlType::Select | ControlType::Checkbox)
	}

	/// Input types whose `value` attribute is never resolved.
	pub fn skips_value_resolution(&self) -> bool {
		matches!(
			self,
			ControlType::File | ControlType::Password | ControlType::Checkbox | ControlType::Radio
		)
	}
}

impl fmt::Display for ControlType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<&str> for ControlType {
	fn from(name: &str) -> Self {
		match name.to_ascii_lowercase().as_str() {
			"text" => ControlType::Text,
			"password" => ControlType::Password,
			"hidden" => ControlType::Hidden,
			"search" => ControlType::Search,
			"email" => ControlType::Email,
			"tel" => ControlType::Tel,
			"number" => ControlType::Number,
			"date" => ControlType::Date,
			"datetime" => ControlType::Datetime,
			"datetime-local" => ControlType::DatetimeLocal,
			"time" => ControlType::Time,
			"url" => ControlType::Url,
			"week" => ControlType::Week,
			"month" => ControlType::Month,
			"color" => ControlType::Color,
			"range" => ControlType::Range,
			"file" => ControlType::File,
			"image" => ControlType::Image,
			"checkbox" => ControlType::Checkbox,
			"radio" => ControlType::Radio,
			"submit" => ControlType::Submit,
			"reset" => ControlType::Reset,
			"select" => ControlType::Select,
			"textarea" => ControlType::Textarea,
			"datalist" => ControlType::Datalist,
			other => ControlType::Custom(other.to_string()),
		}
	}
}

/// Per-call inputs of a resolution that the resolver does not own.
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
	/// Control being rendered
	pub control: &'a ControlType,
	/// Model bound to the open form, if any
	pub model: Option<&'a dyn FormModel>,
	/// Number of errors in the shared validation error bag
	pub error_count: usize,
}

impl<'a> FieldContext<'a> {
	pub fn new(control: &'a ControlType) -> Self {
		Self {
			control,
			model: None,
			error_count: 0,
		}
	}

	pub fn with_model(mut self, model: Option<&'a dyn FormModel>) -> Self {
		self.model = model;
		self
	}

	pub fn with_error_count(mut self, error_count: usize) -> Self {
		self.error_count = error_count;
		self
	}
}

/// Resolves the value a form field displays
///
/// # Examples
///
/// ```
/// use reinhardt_html::memory::MemorySessionStore;
/// use reinhardt_html::resolver::{ControlType, FieldContext, FieldValueResolver};
/// use reinhardt_html::FormSettings;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let session = MemorySessionStore::new().with_old_input(json!({"tags": ["a", "b"]}));
/// let mut resolver = FieldValueResolver::new(&FormSettings::default())
///     .with_session(Arc::new(session));
///
/// let text = ControlType::Text;
/// let ctx = FieldContext::new(&text);
/// assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("a")));
/// assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("b")));
/// assert_eq!(resolver.resolve("tags[]", Some(&json!("c")), ctx), Some(json!("c")));
/// ```
pub struct FieldValueResolver {
	session: Option<Arc<dyn SessionStore>>,
	request: Option<Arc<dyn RequestAccessor>>,
	consider_request: bool,
	empty_strings_become_null: bool,
	method_field: String,
	/// Next unread index of each consumed old-input sequence, by normalized key.
	cursors: HashMap<String, usize>,
}

impl FieldValueResolver {
	pub fn new(settings: &FormSettings) -> Self {
		Self {
			session: None,
			request: None,
			consider_request: settings.consider_request,
			empty_strings_become_null: settings.empty_strings_become_null_after_validation_error,
			method_field: settings.method_field.clone(),
			cursors: HashMap::new(),
		}
	}

	pub fn with_session(mut self, session: Arc<dyn SessionStore>) -> Self {
		self.session = Some(session);
		self
	}

	pub fn with_request(mut self, request: Arc<dyn RequestAccessor>) -> Self {
		self.request = Some(request);
		self
	}

	pub fn set_session(&mut self, session: Arc<dyn SessionStore>) {
		self.session = Some(session);
	}

	pub fn session(&self) -> Option<&Arc<dyn SessionStore>> {
		self.session.as_ref()
	}

	pub fn set_request(&mut self, request: Arc<dyn RequestAccessor>) {
		self.request = Some(request);
	}

	pub fn set_consider_request(&mut self, consider: bool) {
		self.consider_request = consider;
	}

	pub fn considers_request(&self) -> bool {
		self.consider_request
	}

	pub fn has_session(&self) -> bool {
		self.session.is_some()
	}

	/// Forget how far every old-input sequence has been consumed.
	pub fn reset(&mut self) {
		self.cursors.clear();
	}

	/// Value the field displays, or `None` when it renders empty.
	pub fn resolve(
		&mut self,
		name: &str,
		explicit: Option<&Value>,
		ctx: FieldContext<'_>,
	) -> Option<Value> {
		let explicit = explicit.filter(|v| !v.is_null());
		let exempt = name == self.method_field;

		if !exempt && let Some(live) = self.request_value(name) {
			tracing::trace!(field = name, "value resolved from current request");
			return Some(live);
		}

		let old = if exempt {
			None
		} else {
			self.old(name, ctx.control)
		};

		if old.is_none()
			&& explicit.is_none()
			&& self.empty_strings_become_null
			&& ctx.error_count > 0
		{
			tracing::trace!(field = name, "left empty after failed validation");
			return None;
		}

		if old.is_some() {
			tracing::trace!(field = name, "value resolved from old input");
			return old;
		}

		if let Some(value) = explicit {
			return Some(value.clone());
		}

		let model = ctx.model?;
		let value = self.model_value(name, model);
		if value.is_some() {
			tracing::trace!(field = name, "value resolved from bound model");
		}
		value
	}

	/// Submitted value of the current request, if requests are considered.
	pub fn request_value(&self, name: &str) -> Option<Value> {
		if !self.consider_request {
			return None;
		}
		let request = self.request.as_ref()?;
		present(request.input(&normalize_field_name(name)))
	}

	/// Old input for a field, consuming sequences for text-like controls.
	pub fn old(&mut self, name: &str, control: &ControlType) -> Option<Value> {
		let key = normalize_field_name(name);
		let payload = present(self.session.as_ref()?.old_input(&key))?;

		let items = match payload {
			Value::Array(items) => items,
			scalar => return Some(scalar),
		};
		if control.keeps_whole_sequence() {
			return Some(Value::Array(items));
		}

		let cursor = self.cursors.entry(key).or_insert(0);
		let next = items.get(*cursor).cloned();
		if next.is_some() {
			*cursor += 1;
		}
		present(next)
	}

	/// Old input for a field without consuming anything.
	pub fn peek_old(&self, name: &str) -> Option<Value> {
		let key = normalize_field_name(name);
		present(self.session.as_ref()?.old_input(&key))
	}

	/// `true` only when a session is attached and it holds no old input.
	pub fn old_input_is_empty(&self) -> bool {
		self.session
			.as_ref()
			.is_some_and(|session| session.old_input_count() == 0)
	}

	/// Value of the field on a bound model.
	pub fn model_value(&self, name: &str, model: &dyn FormModel) -> Option<Value> {
		let key = normalize_field_name(name);
		if !model.supports_field_resolution(&key) {
			return None;
		}
		present(model.get_field_value(&key))
	}

	/// Neither old input nor the bound model has a value for the field.
	pub(crate) fn missing_old_and_model(&self, name: &str, model: Option<&dyn FormModel>) -> bool {
		self.peek_old(name).is_none()
			&& model
				.and_then(|model| self.model_value(name, model))
				.is_none()
	}
}

impl fmt::Debug for FieldValueResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldValueResolver")
			.field("has_session", &self.session.is_some())
			.field("has_request", &self.request.is_some())
			.field("consider_request", &self.consider_request)
			.field("empty_strings_become_null", &self.empty_strings_become_null)
			.field("method_field", &self.method_field)
			.field("cursors", &self.cursors)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::{MemoryRequest, MemorySessionStore};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn session() -> Arc<MemorySessionStore> {
		Arc::new(MemorySessionStore::new().with_old_input(json!({
			"name": "old-name",
			"tags": ["a", "b"],
			"colors": ["red", "blue"],
			"_method": "DELETE",
		})))
	}

	fn resolver(session: Arc<MemorySessionStore>, settings: FormSettings) -> FieldValueResolver {
		FieldValueResolver::new(&settings).with_session(session)
	}

	#[rstest]
	fn test_old_input_beats_explicit_and_model(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default());
		let model = json!({"name": "model-name"});
		let text = ControlType::Text;
		let ctx = FieldContext::new(&text).with_model(Some(&model));

		assert_eq!(
			resolver.resolve("name", Some(&json!("explicit")), ctx),
			Some(json!("old-name"))
		);
	}

	#[rstest]
	fn test_explicit_beats_model(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default());
		let model = json!({"title": "model"});
		let text = ControlType::Text;
		let ctx = FieldContext::new(&text).with_model(Some(&model));

		assert_eq!(resolver.resolve("title", Some(&json!("explicit")), ctx), Some(json!("explicit")));
		assert_eq!(resolver.resolve("title", None, ctx), Some(json!("model")));
		assert_eq!(resolver.resolve("title", Some(&Value::Null), ctx), Some(json!("model")));
	}

	#[rstest]
	fn test_sequence_is_consumed_for_text_controls(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default());
		let text = ControlType::Text;
		let ctx = FieldContext::new(&text);

		assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("a")));
		assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("b")));
		assert_eq!(resolver.resolve("tags[]", None, ctx), None);
		assert_eq!(resolver.resolve("tags[]", Some(&json!("z")), ctx), Some(json!("z")));
	}

	#[rstest]
	fn test_cursors_are_isolated_per_key_and_reset(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default());
		let text = ControlType::Text;
		let ctx = FieldContext::new(&text);

		assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("a")));
		assert_eq!(resolver.resolve("colors[]", None, ctx), Some(json!("red")));
		assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("b")));

		resolver.reset();
		assert_eq!(resolver.resolve("tags[]", None, ctx), Some(json!("a")));
	}

	#[rstest]
	#[case(ControlType::Select)]
	#[case(ControlType::Checkbox)]
	fn test_sequence_passes_through_for_membership_controls(
		session: Arc<MemorySessionStore>,
		#[case] control: ControlType,
	) {
		let mut resolver = resolver(session, FormSettings::default());
		let ctx = FieldContext::new(&control);

		assert_eq!(resolver.resolve("colors[]", None, ctx), Some(json!(["red", "blue"])));
		assert_eq!(resolver.resolve("colors[]", None, ctx), Some(json!(["red", "blue"])));
	}

	#[rstest]
	fn test_live_request_wins_when_considered(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default().with_consider_request(true))
			.with_request(Arc::new(MemoryRequest::new(json!({"name": "live"}))));
		let model = json!({"name": "model"});
		let text = ControlType::Text;
		let ctx = FieldContext::new(&text).with_model(Some(&model));

		assert_eq!(resolver.resolve("name", Some(&json!("explicit")), ctx), Some(json!("live")));

		resolver.set_consider_request(false);
		assert_eq!(resolver.resolve("name", None, ctx), Some(json!("old-name")));
	}

	#[rstest]
	fn test_method_field_ignores_request_and_old_input(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default().with_consider_request(true))
			.with_request(Arc::new(MemoryRequest::new(json!({"_method": "PATCH"}))));
		let hidden = ControlType::Hidden;
		let ctx = FieldContext::new(&hidden);

		assert_eq!(resolver.resolve("_method", Some(&json!("PUT")), ctx), Some(json!("PUT")));
	}

	#[rstest]
	fn test_empty_after_validation_error_short_circuits(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default().with_empty_strings_become_null(true));
		let model = json!({"age": 0});
		let number = ControlType::Number;
		let failed = FieldContext::new(&number)
			.with_model(Some(&model))
			.with_error_count(2);
		let clean = failed.with_error_count(0);

		assert_eq!(resolver.resolve("age", None, failed), None);
		assert_eq!(resolver.resolve("age", None, clean), Some(json!(0)));
		assert_eq!(resolver.resolve("age", Some(&json!(5)), failed), Some(json!(5)));
		assert_eq!(resolver.resolve("name", None, failed), Some(json!("old-name")));
	}

	#[rstest]
	fn test_without_session_nothing_is_old() {
		let mut resolver = FieldValueResolver::new(&FormSettings::default());
		assert_eq!(resolver.old("name", &ControlType::Text), None);
		assert!(!resolver.old_input_is_empty());
		assert!(!resolver.has_session());
	}

	#[rstest]
	fn test_peek_does_not_consume(session: Arc<MemorySessionStore>) {
		let mut resolver = resolver(session, FormSettings::default());
		assert_eq!(resolver.peek_old("tags"), Some(json!(["a", "b"])));
		assert_eq!(resolver.old("tags", &ControlType::Text), Some(json!("a")));
		assert_eq!(resolver.peek_old("tags"), Some(json!(["a", "b"])));
	}

	#[rstest]
	#[case("datetime-local", ControlType::DatetimeLocal)]
	#[case("CHECKBOX", ControlType::Checkbox)]
	#[case("x-custom", ControlType::Custom("x-custom".to_string()))]
	fn test_control_type_from_str(#[case] name: &str, #[case] expected: ControlType) {
		assert_eq!(ControlType::from(name), expected);
	}
}
