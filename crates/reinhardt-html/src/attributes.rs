//! Attribute maps and their serialization
//!
//! Attributes keep insertion order. Named keys are unique: setting a key
//! that already exists replaces its value but keeps its position, so a
//! later merge can override `id` or `value` without reshuffling the tag.
//! Positional entries are bare tokens such as `required` or `disabled`.

use crate::escape::entities;
use crate::value::to_plain_string;
use indexmap::IndexMap;
use serde_json::Value;

/// Key of an attribute entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrKey {
	/// `name="value"` style entry
	Named(String),
	/// Bare token, emitted verbatim
	Positional(usize),
}

/// Value of an attribute entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
	Text(String),
	/// Boolean attribute: the bare key when `true`, nothing when `false`
	Bool(bool),
	/// Only meaningful for `class`, whose items are joined with a space
	List(Vec<String>),
	/// Omitted from the output
	Null,
}

impl AttrValue {
	pub fn is_null(&self) -> bool {
		matches!(self, AttrValue::Null)
	}

	/// Text form of a scalar value; `None` for null and lists.
	pub fn as_text(&self) -> Option<String> {
		match self {
			AttrValue::Text(t) => Some(t.clone()),
			AttrValue::Bool(true) => Some("1".to_string()),
			AttrValue::Bool(false) => Some(String::new()),
			AttrValue::List(_) | AttrValue::Null => None,
		}
	}
}

impl From<&str> for AttrValue {
	fn from(s: &str) -> Self {
		AttrValue::Text(s.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(s: String) -> Self {
		AttrValue::Text(s)
	}
}

impl From<&String> for AttrValue {
	fn from(s: &String) -> Self {
		AttrValue::Text(s.clone())
	}
}

impl From<bool> for AttrValue {
	fn from(b: bool) -> Self {
		AttrValue::Bool(b)
	}
}

macro_rules! attr_value_from_number {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for AttrValue {
				fn from(n: $ty) -> Self {
					AttrValue::Text(n.to_string())
				}
			}
		)*
	};
}

attr_value_from_number!(i32, i64, u32, u64, usize, f64);

impl From<Vec<&str>> for AttrValue {
	fn from(items: Vec<&str>) -> Self {
		AttrValue::List(items.into_iter().map(str::to_string).collect())
	}
}

impl From<Vec<String>> for AttrValue {
	fn from(items: Vec<String>) -> Self {
		AttrValue::List(items)
	}
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(AttrValue::Null, Into::into)
	}
}

impl From<Value> for AttrValue {
	fn from(value: Value) -> Self {
		match value {
			Value::Null | Value::Object(_) => AttrValue::Null,
			Value::Bool(b) => AttrValue::Bool(b),
			Value::String(s) => AttrValue::Text(s),
			Value::Number(n) => AttrValue::Text(n.to_string()),
			Value::Array(items) => AttrValue::List(items.iter().map(to_plain_string).collect()),
		}
	}
}

/// Ordered attribute map
///
/// # Examples
///
/// ```
/// use reinhardt_html::Attributes;
///
/// let attrs = Attributes::new()
///     .with("required", true)
///     .with("class", vec!["a", "b"])
///     .with("id", None::<&str>)
///     .with("data-x", "y");
/// assert_eq!(attrs.render(), " required class=\"a b\" data-x=\"y\"");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
	entries: IndexMap<AttrKey, AttrValue>,
	next_position: usize,
}

impl Attributes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder form of [`Attributes::set`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.set(key, value);
		self
	}

	/// Builder form of [`Attributes::push_token`].
	pub fn flag(mut self, token: impl Into<String>) -> Self {
		self.push_token(token);
		self
	}

	/// Set a named attribute, replacing an existing value in place.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
		self.entries
			.insert(AttrKey::Named(key.into()), value.into());
	}

	/// Set a named attribute only when it is not present yet.
	pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
		self.entries
			.entry(AttrKey::Named(key.into()))
			.or_insert_with(|| value.into());
	}

	/// Append a bare positional token such as `disabled`.
	pub fn push_token(&mut self, token: impl Into<String>) {
		let position = self.next_position;
		self.next_position += 1;
		self.entries
			.insert(AttrKey::Positional(position), AttrValue::Text(token.into()));
	}

	pub fn get(&self, key: &str) -> Option<&AttrValue> {
		self.entries.get(&AttrKey::Named(key.to_string()))
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(&AttrKey::Named(key.to_string()))
	}

	/// Remove a named attribute, keeping the order of the others.
	pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
		self.entries.shift_remove(&AttrKey::Named(key.to_string()))
	}

	/// Merge `other` into `self`; named keys from `other` win, tokens are appended.
	pub fn merge(mut self, other: Attributes) -> Self {
		for (key, value) in other.entries {
			match key {
				AttrKey::Named(name) => self.set(name, value),
				AttrKey::Positional(_) => {
					let position = self.next_position;
					self.next_position += 1;
					self.entries.insert(AttrKey::Positional(position), value);
				}
			}
		}
		self
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &AttrValue)> {
		self.entries.iter()
	}

	/// Serialize to a leading-space-prefixed attribute string, or `""` when
	/// nothing renders.
	///
	/// Rules, first match wins per entry: positional tokens are emitted
	/// verbatim; booleans (except on `value`) emit the bare key or nothing;
	/// a `class` list is space-joined; nulls are omitted; anything else
	/// becomes `key="escaped"`.
	pub fn render(&self) -> String {
		let rendered: Vec<String> = self
			.entries
			.iter()
			.filter_map(|(key, value)| attribute_element(key, value))
			.collect();
		if rendered.is_empty() {
			String::new()
		} else {
			format!(" {}", rendered.join(" "))
		}
	}
}

fn attribute_element(key: &AttrKey, value: &AttrValue) -> Option<String> {
	let name = match key {
		AttrKey::Positional(_) => {
			return match value {
				AttrValue::Text(token) if !token.is_empty() => Some(token.clone()),
				_ => None,
			};
		}
		AttrKey::Named(name) => name,
	};

	match value {
		AttrValue::Bool(flag) if name != "value" => flag.then(|| name.clone()),
		AttrValue::List(items) if name == "class" => {
			let joined: Vec<String> = items.iter().map(|item| entities(item)).collect();
			Some(format!("class=\"{}\"", joined.join(" ")))
		}
		AttrValue::Null => None,
		// Lists only have a serialization for `class`.
		AttrValue::List(_) => None,
		other => other
			.as_text()
			.map(|text| format!("{}=\"{}\"", name, entities(&text))),
	}
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
	K: Into<String>,
	V: Into<AttrValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut attrs = Attributes::new();
		for (key, value) in iter {
			attrs.set(key, value);
		}
		attrs
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_render_follows_rule_order() {
		let attrs = Attributes::new()
			.with("required", true)
			.with("class", vec!["a", "b"])
			.with("id", AttrValue::Null)
			.with("data-x", "y");

		assert_eq!(attrs.render(), " required class=\"a b\" data-x=\"y\"");
	}

	#[rstest]
	fn test_empty_attributes_render_nothing() {
		assert_eq!(Attributes::new().render(), "");
		assert_eq!(
			Attributes::new()
				.with("disabled", false)
				.with("id", None::<String>)
				.render(),
			""
		);
	}

	#[rstest]
	fn test_positional_tokens_are_verbatim() {
		let attrs = Attributes::new().flag("autofocus").with("name", "q");
		assert_eq!(attrs.render(), " autofocus name=\"q\"");
	}

	#[rstest]
	#[case(true, " value=\"1\"")]
	#[case(false, " value=\"\"")]
	fn test_boolean_value_is_not_a_flag(#[case] flag: bool, #[case] expected: &str) {
		assert_eq!(Attributes::new().with("value", flag).render(), expected);
	}

	#[rstest]
	fn test_values_are_escaped_once() {
		let attrs = Attributes::new()
			.with("title", "\"quoted\" & <b>")
			.with("alt", "&amp;");
		assert_eq!(
			attrs.render(),
			" title=\"&quot;quoted&quot; &amp; &lt;b&gt;\" alt=\"&amp;\""
		);
	}

	#[rstest]
	fn test_set_replaces_in_place() {
		let mut attrs = Attributes::new().with("name", "a").with("id", "x");
		attrs.set("name", "b");
		assert_eq!(attrs.render(), " name=\"b\" id=\"x\"");
	}

	#[rstest]
	fn test_merge_prefers_other_and_appends_tokens() {
		let base = Attributes::new().with("type", "text").flag("required");
		let merged = base.merge(Attributes::new().with("type", "email").flag("autofocus"));
		assert_eq!(merged.render(), " type=\"email\" required autofocus");
	}

	#[rstest]
	fn test_non_class_list_is_omitted() {
		let attrs = Attributes::new().with("value", vec!["a", "b"]);
		assert_eq!(attrs.render(), "");
	}

	#[rstest]
	fn test_from_json_value() {
		assert_eq!(AttrValue::from(json!(3)), AttrValue::Text("3".to_string()));
		assert_eq!(AttrValue::from(json!({"a": 1})), AttrValue::Null);
		assert_eq!(
			AttrValue::from(json!(["x", 1])),
			AttrValue::List(vec!["x".to_string(), "1".to_string()])
		);
	}

	#[rstest]
	fn test_remove_keeps_order() {
		let mut attrs: Attributes = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
		assert_eq!(attrs.remove("b"), Some(AttrValue::Text("2".to_string())));
		assert_eq!(attrs.render(), " a=\"1\" c=\"3\"");
	}
}
