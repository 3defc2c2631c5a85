//! Form builder
//!
//! [`FormBuilder`] opens and closes forms and renders their controls. Every
//! value-bearing control asks the [`FieldValueResolver`] what to display,
//! and checkboxes and radios go through the checked-state rules in
//! [`crate::checked`].
//!
//! A builder is request-scoped: it owns the bound model, the names that
//! received a label and the old-input cursors of the form being rendered.

pub mod options;
pub mod select;

pub use options::{FormOptions, FormTarget};
pub use select::{OptionAttributes, SelectEntry, is_selected};

use crate::attributes::{AttrValue, Attributes};
use crate::contracts::{RequestAccessor, SessionStore};
use crate::error::{HtmlError, HtmlResult};
use crate::escape::{HtmlString, entities};
use crate::extensions::{ComponentParam, Extensions};
use crate::html::HtmlBuilder;
use crate::model::FormModel;
use crate::resolver::{ControlType, FieldContext, FieldValueResolver};
use crate::settings::FormSettings;
use crate::value::to_plain_string;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Lifecycle of the form being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
	#[default]
	Closed,
	Open,
}

/// Renders forms and repopulates their fields
///
/// # Examples
///
/// ```
/// use reinhardt_html::memory::MemorySessionStore;
/// use reinhardt_html::{Attributes, FormBuilder, FormOptions, FormSettings, HtmlBuilder};
/// # use reinhardt_html::{UrlGenerator, ViewFactory};
/// # use serde_json::{Map, Value};
/// # struct Urls;
/// # impl UrlGenerator for Urls {
/// #     fn to(&self, path: &str, _: &[String], _: Option<bool>) -> String { format!("/{}", path.trim_start_matches('/')) }
/// #     fn route(&self, name: &str, _: &Value, _: Option<bool>) -> String { format!("/{}", name) }
/// #     fn action(&self, action: &str, _: &Value, _: Option<bool>) -> String { format!("/{}", action) }
/// #     fn current(&self) -> String { "/current".to_string() }
/// #     fn asset(&self, path: &str, _: Option<bool>) -> String { format!("/assets/{}", path) }
/// # }
/// # struct Views;
/// # impl ViewFactory for Views {
/// #     fn render(&self, view: &str, _: &Map<String, Value>) -> String { view.to_string() }
/// # }
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let html = Arc::new(HtmlBuilder::new(Arc::new(Urls), Arc::new(Views)));
/// let session = MemorySessionStore::new()
///     .with_old_input(json!({"email": "old@example.com"}))
///     .with_token("t0k3n");
/// let mut form = FormBuilder::new(html, FormSettings::default()).with_session(Arc::new(session));
///
/// let open = form.open(FormOptions::new().method("PUT").url("users/1")).unwrap();
/// assert_eq!(
///     open.as_str(),
///     "<form method=\"POST\" action=\"/users/1\" accept-charset=\"UTF-8\">\
///      <input name=\"_method\" type=\"hidden\" value=\"PUT\">\
///      <input name=\"_token\" type=\"hidden\" value=\"t0k3n\">"
/// );
///
/// let email = form.email("email", Some(json!("new@example.com")), Attributes::new());
/// assert_eq!(email.as_str(), "<input name=\"email\" type=\"email\" value=\"old@example.com\">");
/// assert_eq!(form.close().as_str(), "</form>");
/// ```
pub struct FormBuilder {
	html: Arc<HtmlBuilder>,
	settings: FormSettings,
	resolver: FieldValueResolver,
	csrf_token: Option<String>,
	model: Option<Box<dyn FormModel>>,
	/// Names that received a label in the open form
	labels: HashSet<String>,
	/// Control currently being rendered
	control: ControlType,
	state: FormState,
	extensions: Extensions,
}

impl FormBuilder {
	pub fn new(html: Arc<HtmlBuilder>, settings: FormSettings) -> Self {
		let resolver = FieldValueResolver::new(&settings);
		Self {
			html,
			settings,
			resolver,
			csrf_token: None,
			model: None,
			labels: HashSet::new(),
			control: ControlType::default(),
			state: FormState::Closed,
			extensions: Extensions::new("FormBuilder"),
		}
	}

	/// Token used instead of the session's CSRF token.
	pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
		self.csrf_token = Some(token.into());
		self
	}

	pub fn with_session(mut self, session: Arc<dyn SessionStore>) -> Self {
		self.resolver.set_session(session);
		self
	}

	pub fn with_request(mut self, request: Arc<dyn RequestAccessor>) -> Self {
		self.resolver.set_request(request);
		self
	}

	pub fn set_session_store(&mut self, session: Arc<dyn SessionStore>) {
		self.resolver.set_session(session);
	}

	pub fn get_session_store(&self) -> Option<&Arc<dyn SessionStore>> {
		self.resolver.session()
	}

	pub fn set_request(&mut self, request: Arc<dyn RequestAccessor>) {
		self.resolver.set_request(request);
	}

	/// Prefer values of the current request over old input.
	pub fn consider_request(&mut self, consider: bool) {
		self.resolver.set_consider_request(consider);
	}

	pub fn html(&self) -> &HtmlBuilder {
		&self.html
	}

	pub fn settings(&self) -> &FormSettings {
		&self.settings
	}

	pub fn state(&self) -> FormState {
		self.state
	}

	pub fn is_open(&self) -> bool {
		self.state == FormState::Open
	}

	/// Open a form
	///
	/// Methods other than `GET` submit as `POST`; `PUT`, `PATCH` and
	/// `DELETE` add a spoofed-method field. Every non-`GET` form carries
	/// a CSRF field, so those fail with [`HtmlError::MissingCsrfToken`]
	/// when no token is available.
	pub fn open(&mut self, options: FormOptions) -> HtmlResult<HtmlString> {
		if self.is_open() {
			tracing::warn!("opening a form while the previous form is still open");
		}
		self.resolver.reset();

		let mut attributes = Attributes::new()
			.with("method", options.form_method())
			.with("action", self.action_url(options.target()))
			.with("accept-charset", self.settings.charset.as_str());
		if options.has_files() {
			attributes.set("enctype", "multipart/form-data");
		}

		let mut append = String::new();
		if let Some(method) = options.spoofed_method() {
			let field = self.settings.method_field.clone();
			append.push_str(self.hidden(&field, Some(Value::String(method)), Attributes::new()).as_str());
		}
		if options.needs_token() {
			append.push_str(self.token()?.as_str());
		}

		let attributes = attributes.merge(options.into_attributes());
		self.state = FormState::Open;
		Ok(HtmlString::new(format!("<form{}>{}", attributes.render(), append)))
	}

	/// Bind `model` and open a form for it. The model is unbound again when
	/// the form fails to open.
	pub fn model<M>(&mut self, model: M, options: FormOptions) -> HtmlResult<HtmlString>
	where
		M: FormModel + 'static,
	{
		let previous = self.model.replace(Box::new(model));
		let opened = self.open(options);
		if opened.is_err() {
			self.model = previous;
		}
		opened
	}

	pub fn set_model<M>(&mut self, model: M)
	where
		M: FormModel + 'static,
	{
		self.model = Some(Box::new(model));
	}

	/// Model bound to the open form; `None` once the form is closed.
	pub fn get_model(&self) -> Option<&dyn FormModel> {
		self.model.as_deref()
	}

	/// Close the form, dropping the bound model and recorded labels.
	pub fn close(&mut self) -> HtmlString {
		self.labels.clear();
		self.model = None;
		self.resolver.reset();
		self.state = FormState::Closed;
		HtmlString::new("</form>")
	}

	/// Hidden CSRF field.
	pub fn token(&self) -> HtmlResult<HtmlString> {
		let token = self
			.csrf_token
			.clone()
			.filter(|token| !token.is_empty())
			.or_else(|| self.resolver.session().and_then(|session| session.token()))
			.ok_or(HtmlError::MissingCsrfToken)?;

		let attributes = Attributes::new()
			.with("name", self.settings.csrf_field.as_str())
			.with("type", "hidden")
			.with("value", token);
		Ok(HtmlString::new(format!("<input{}>", attributes.render())))
	}

	/// `<label>` for a field. Without text the name is humanized.
	pub fn label(&mut self, name: &str, value: Option<&str>, attributes: Attributes, escape: bool) -> HtmlString {
		self.labels.insert(name.to_string());

		let text = value
			.filter(|value| !value.is_empty())
			.map_or_else(|| format_label(name), str::to_string);
		let text = if escape { entities(&text) } else { text };

		let attributes = Attributes::new().with("for", name).merge(attributes);
		HtmlString::new(format!("<label{}>{}</label>", attributes.render(), text))
	}

	/// Render an `<input>` of any type.
	pub fn input(
		&mut self,
		control: impl Into<ControlType>,
		name: Option<&str>,
		value: Option<Value>,
		attributes: Attributes,
	) -> HtmlString {
		let control = control.into();
		self.control = control.clone();

		let mut attributes = attributes;
		if let Some(name) = name {
			attributes.set_default("name", name);
		}
		let id = self.get_id_attribute(name, &attributes);
		let value = if control.skips_value_resolution() {
			value
		} else {
			self.get_value_attribute(name, value)
		};

		attributes.set("type", control.as_str());
		attributes.set("value", value);
		attributes.set("id", id);
		HtmlString::new(format!("<input{}>", attributes.render()))
	}

	pub fn text(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Text, Some(name), value, attributes)
	}

	/// Password inputs never display a value.
	pub fn password(&mut self, name: &str, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Password, Some(name), Some(Value::from("")), attributes)
	}

	pub fn hidden(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Hidden, Some(name), value, attributes)
	}

	pub fn search(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Search, Some(name), value, attributes)
	}

	pub fn email(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Email, Some(name), value, attributes)
	}

	pub fn tel(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Tel, Some(name), value, attributes)
	}

	pub fn number(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Number, Some(name), value, attributes)
	}

	pub fn date(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Date, Some(name), value, attributes)
	}

	pub fn datetime(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Datetime, Some(name), value, attributes)
	}

	pub fn datetime_local(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::DatetimeLocal, Some(name), value, attributes)
	}

	pub fn time(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Time, Some(name), value, attributes)
	}

	pub fn url(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Url, Some(name), value, attributes)
	}

	pub fn week(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Week, Some(name), value, attributes)
	}

	pub fn month(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Month, Some(name), value, attributes)
	}

	pub fn color(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Color, Some(name), value, attributes)
	}

	pub fn range(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Range, Some(name), value, attributes)
	}

	pub fn file(&mut self, name: &str, attributes: Attributes) -> HtmlString {
		self.input(ControlType::File, Some(name), None, attributes)
	}

	/// Image submit button whose `src` points at an asset.
	pub fn image(&mut self, url: &str, name: Option<&str>, attributes: Attributes) -> HtmlString {
		let mut attributes = attributes;
		attributes.set("src", self.html.url().asset(url, None));
		self.input(ControlType::Image, name, None, attributes)
	}

	pub fn reset(&mut self, value: Option<&str>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Reset, None, value.map(Value::from), attributes)
	}

	pub fn submit(&mut self, value: Option<&str>, attributes: Attributes) -> HtmlString {
		self.input(ControlType::Submit, None, value.map(Value::from), attributes)
	}

	/// `<button>`, of type `button` unless the attributes say otherwise.
	pub fn button(&self, value: &str, attributes: Attributes) -> HtmlString {
		let mut attributes = attributes;
		attributes.set_default("type", "button");
		HtmlString::new(format!("<button{}>{}</button>", attributes.render(), value))
	}

	/// `<textarea>`; a `size="COLSxROWS"` attribute sets both dimensions.
	pub fn textarea(&mut self, name: &str, value: Option<Value>, attributes: Attributes) -> HtmlString {
		self.control = ControlType::Textarea;

		let mut attributes = attributes;
		attributes.set_default("name", name);
		self.set_textarea_size(&mut attributes);
		let id = self.get_id_attribute(Some(name), &attributes);
		attributes.set("id", id);
		attributes.remove("size");

		let value = self
			.get_value_attribute(Some(name), value)
			.map(|value| to_plain_string(&value))
			.unwrap_or_default();
		HtmlString::new(format!(
			"<textarea{}>{}</textarea>",
			attributes.render(),
			entities(&value)
		))
	}

	fn set_textarea_size(&self, attributes: &mut Attributes) {
		let quick = attributes
			.get("size")
			.and_then(AttrValue::as_text)
			.and_then(|size| {
				size.split_once('x')
					.map(|(cols, rows)| (cols.trim().to_string(), rows.trim().to_string()))
			});

		match quick {
			Some((cols, rows)) => {
				attributes.set("cols", cols);
				attributes.set("rows", rows);
			}
			None => {
				attributes.set_default("cols", self.settings.textarea_cols);
				attributes.set_default("rows", self.settings.textarea_rows);
			}
		}
	}

	/// `<select>`; a `placeholder` attribute becomes a leading empty option.
	pub fn select(
		&mut self,
		name: &str,
		entries: &[SelectEntry],
		selected: Option<Value>,
		attributes: Attributes,
	) -> HtmlString {
		self.select_with(name, entries, selected, attributes, &OptionAttributes::default())
	}

	/// [`FormBuilder::select`] with per-option and per-group attributes.
	pub fn select_with(
		&mut self,
		name: &str,
		entries: &[SelectEntry],
		selected: Option<Value>,
		attributes: Attributes,
		extra: &OptionAttributes,
	) -> HtmlString {
		self.control = ControlType::Select;
		let selected = self.get_value_attribute(Some(name), selected);

		let mut attributes = attributes;
		let id = self.get_id_attribute(Some(name), &attributes);
		attributes.set("id", id);
		attributes.set_default("name", name);

		let mut body = String::new();
		if let Some(placeholder) = attributes.remove("placeholder").and_then(|p| p.as_text()) {
			body.push_str(&select::placeholder_option(&placeholder, selected.as_ref()));
		}
		body.push_str(&select::render_entries(entries, selected.as_ref(), extra));

		HtmlString::new(format!("<select{}>{}</select>", attributes.render(), body))
	}

	/// Select over an inclusive numeric range, descending when `begin > end`.
	pub fn select_range(
		&mut self,
		name: &str,
		begin: i64,
		end: i64,
		selected: Option<Value>,
		attributes: Attributes,
	) -> HtmlString {
		let values: Vec<i64> = if begin <= end {
			(begin..=end).collect()
		} else {
			(end..=begin).rev().collect()
		};
		let entries: Vec<SelectEntry> = values
			.into_iter()
			.map(|n| SelectEntry::option(n, n.to_string()))
			.collect();
		self.select(name, &entries, selected, attributes)
	}

	pub fn select_year(
		&mut self,
		name: &str,
		begin: i64,
		end: i64,
		selected: Option<Value>,
		attributes: Attributes,
	) -> HtmlString {
		self.select_range(name, begin, end, selected, attributes)
	}

	/// Select over the twelve months, labeled with a `strftime` format
	/// (`%B` when none is given).
	pub fn select_month(
		&mut self,
		name: &str,
		selected: Option<Value>,
		attributes: Attributes,
		format: Option<&str>,
	) -> HtmlString {
		let format = format.unwrap_or("%B");
		let entries: Vec<SelectEntry> = (1..=12u32)
			.map(|month| SelectEntry::option(month, month_label(month, format)))
			.collect();
		self.select(name, &entries, selected, attributes)
	}

	pub fn datalist(&mut self, id: &str, entries: &[SelectEntry]) -> HtmlString {
		self.control = ControlType::Datalist;
		let attributes = Attributes::new().with("id", id);
		let body = select::render_entries(entries, None, &OptionAttributes::default());
		HtmlString::new(format!("<datalist{}>{}</datalist>", attributes.render(), body))
	}

	/// Checkbox, carrying `1` unless another value is given.
	pub fn checkbox(
		&mut self,
		name: &str,
		value: Option<Value>,
		checked: Option<bool>,
		attributes: Attributes,
	) -> HtmlString {
		let value = value.unwrap_or_else(|| Value::from(1));
		self.checkable(ControlType::Checkbox, name, value, checked, attributes)
	}

	/// Radio button, carrying its own name unless another value is given.
	pub fn radio(
		&mut self,
		name: &str,
		value: Option<Value>,
		checked: Option<bool>,
		attributes: Attributes,
	) -> HtmlString {
		let value = value.unwrap_or_else(|| Value::from(name));
		self.checkable(ControlType::Radio, name, value, checked, attributes)
	}

	fn checkable(
		&mut self,
		control: ControlType,
		name: &str,
		value: Value,
		checked: Option<bool>,
		attributes: Attributes,
	) -> HtmlString {
		self.control = control.clone();
		let error_count = self.html.view().shared_error_count();
		let ctx = FieldContext::new(&control)
			.with_model(self.model.as_deref())
			.with_error_count(error_count);

		let state = if control == ControlType::Checkbox {
			self.resolver.checkbox_state(name, &value, checked, ctx)
		} else {
			self.resolver.radio_state(name, &value, ctx)
		};

		let mut attributes = attributes;
		if state.or_default(checked.unwrap_or(false)) {
			attributes.set("checked", "checked");
		}
		self.input(control, Some(name), Some(value), attributes)
	}

	/// Old input for a field, as the current control would receive it.
	pub fn old(&mut self, name: &str) -> Option<Value> {
		self.resolver.old(name, &self.control)
	}

	pub fn old_input_is_empty(&self) -> bool {
		self.resolver.old_input_is_empty()
	}

	/// Value a field displays; unnamed fields keep `value`.
	pub fn get_value_attribute(&mut self, name: Option<&str>, value: Option<Value>) -> Option<Value> {
		let Some(name) = name else {
			return value;
		};

		let error_count = self.html.view().shared_error_count();
		let ctx = FieldContext::new(&self.control)
			.with_model(self.model.as_deref())
			.with_error_count(error_count);
		self.resolver.resolve(name, value.as_ref(), ctx)
	}

	/// `id` of a field: the one given, or the name when a label points at it.
	pub fn get_id_attribute(&self, name: Option<&str>, attributes: &Attributes) -> Option<AttrValue> {
		if let Some(id) = attributes.get("id") {
			return Some(id.clone());
		}
		name.filter(|name| self.labels.contains(*name))
			.map(|name| AttrValue::Text(name.to_string()))
	}

	pub fn component(&mut self, name: impl Into<String>, view: impl Into<String>, signature: Vec<ComponentParam>) {
		self.extensions.component(name, view, signature);
	}

	pub fn register_macro<F>(&mut self, name: impl Into<String>, f: F)
	where
		F: Fn(&[Value]) -> HtmlString + Send + Sync + 'static,
	{
		self.extensions.register_macro(name, f);
	}

	pub fn has_component(&self, name: &str) -> bool {
		self.extensions.has_component(name)
	}

	pub fn has_macro(&self, name: &str) -> bool {
		self.extensions.has_macro(name)
	}

	/// Invoke a registered component or macro.
	pub fn call(&self, name: &str, args: &[Value]) -> HtmlResult<HtmlString> {
		self.extensions.call(name, args, self.html.view().as_ref())
	}

	fn action_url(&self, target: &FormTarget) -> String {
		let url = self.html.url();
		match target {
			FormTarget::Current => url.current(),
			FormTarget::Url(path) => url.to(path, &[], None),
			FormTarget::Route { name, parameters } => url.route(name, parameters, None),
			FormTarget::Action { action, parameters } => url.action(action, parameters, None),
		}
	}
}

impl fmt::Debug for FormBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormBuilder")
			.field("settings", &self.settings)
			.field("resolver", &self.resolver)
			.field("has_model", &self.model.is_some())
			.field("labels", &self.labels)
			.field("control", &self.control)
			.field("state", &self.state)
			.field("extensions", &self.extensions)
			.finish_non_exhaustive()
	}
}

/// Humanize a field name: underscores become spaces, words are capitalized.
fn format_label(name: &str) -> String {
	name.replace('_', " ")
		.split(' ')
		.map(|word| {
			let mut chars = word.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect(),
				None => String::new(),
			}
		})
		.collect::<Vec<String>>()
		.join(" ")
}

fn month_label(month: u32, format: &str) -> String {
	let mut label = String::new();
	let written = NaiveDate::from_ymd_opt(2000, month, 1)
		.is_some_and(|date| write!(label, "{}", date.format(format)).is_ok());
	if written { label } else { month.to_string() }
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("first_name", "First Name")]
	#[case("email", "Email")]
	#[case("a__b", "A  B")]
	fn test_format_label(#[case] name: &str, #[case] expected: &str) {
		assert_eq!(format_label(name), expected);
	}

	#[rstest]
	#[case(1, "%B", "January")]
	#[case(12, "%b", "Dec")]
	#[case(3, "%m", "03")]
	fn test_month_label(#[case] month: u32, #[case] format: &str, #[case] expected: &str) {
		assert_eq!(month_label(month, format), expected);
	}

	#[rstest]
	fn test_month_label_with_invalid_format_falls_back() {
		assert_eq!(month_label(4, "%Q"), "4");
	}
}
