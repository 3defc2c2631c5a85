//! `<select>` entries and option rendering

use crate::attributes::Attributes;
use crate::escape::entities;
use crate::value::{is_truthy, to_plain_string};
use serde_json::Value;
use std::collections::HashMap;

/// Non-breaking spaces added in front of option text per optgroup nesting level.
const GROUP_INDENT: usize = 5;

/// Entry of a `<select>` or `<datalist>`.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectEntry {
	Option { value: Value, display: String },
	Group { label: String, entries: Vec<SelectEntry> },
}

impl SelectEntry {
	pub fn option(value: impl Into<Value>, display: impl Into<String>) -> Self {
		SelectEntry::Option {
			value: value.into(),
			display: display.into(),
		}
	}

	/// Option whose value doubles as its display text.
	pub fn plain(value: impl Into<String>) -> Self {
		let value = value.into();
		SelectEntry::Option {
			value: Value::String(value.clone()),
			display: value,
		}
	}

	pub fn group(label: impl Into<String>, entries: Vec<SelectEntry>) -> Self {
		SelectEntry::Group {
			label: label.into(),
			entries,
		}
	}
}

/// Extra attributes for individual options and option groups.
///
/// Options are keyed by the string form of their value, groups by label.
#[derive(Debug, Clone, Default)]
pub struct OptionAttributes {
	options: HashMap<String, Attributes>,
	groups: HashMap<String, Attributes>,
}

impl OptionAttributes {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn option(mut self, value: impl Into<Value>, attributes: Attributes) -> Self {
		self.options.insert(to_plain_string(&value.into()), attributes);
		self
	}

	pub fn group(mut self, label: impl Into<String>, attributes: Attributes) -> Self {
		self.groups.insert(label.into(), attributes);
		self
	}

	fn for_option(&self, value: &Value) -> Option<&Attributes> {
		self.options.get(&to_plain_string(value))
	}

	fn for_group(&self, label: &str) -> Option<&Attributes> {
		self.groups.get(label)
	}
}

/// Whether the option carrying `value` is selected by `selected`
///
/// A sequence selects by membership of string forms (records by their
/// `id`), so an option `"2"` is selected by `[2]` as well as by `["2"]`.
/// An integer option against a boolean selection compares truthiness, and
/// anything else compares string forms. Nothing selected matches only the
/// empty value.
///
/// # Examples
///
/// ```
/// use reinhardt_html::form::is_selected;
/// use serde_json::json;
///
/// assert!(is_selected(&json!(2), Some(&json!(["1", "2"]))));
/// assert!(is_selected(&json!("2"), Some(&json!([2]))));
/// assert!(is_selected(&json!(1), Some(&json!(true))));
/// assert!(is_selected(&json!("3"), Some(&json!(3))));
/// assert!(!is_selected(&json!("a"), None));
/// ```
pub fn is_selected(value: &Value, selected: Option<&Value>) -> bool {
	let key = to_plain_string(value);
	match selected {
		Some(Value::Array(items)) => items.iter().any(|item| {
			let item = item.as_object().and_then(|record| record.get("id")).unwrap_or(item);
			to_plain_string(item) == key
		}),
		Some(Value::Bool(flag)) if value.is_i64() || value.is_u64() => is_truthy(value) == *flag,
		Some(other) => to_plain_string(other) == key,
		None => key.is_empty(),
	}
}

pub(crate) fn render_entries(entries: &[SelectEntry], selected: Option<&Value>, extra: &OptionAttributes) -> String {
	entries
		.iter()
		.map(|entry| match entry {
			SelectEntry::Option { value, display } => option(display, value, selected, extra.for_option(value)),
			SelectEntry::Group { label, entries } => option_group(label, entries, selected, extra, 0),
		})
		.collect()
}

/// Leading empty-valued option, selected when nothing else is.
pub(crate) fn placeholder_option(display: &str, selected: Option<&Value>) -> String {
	let attributes = Attributes::new()
		.with("selected", is_selected(&Value::Null, selected).then_some("selected"))
		.with("value", "");
	format!("<option{}>{}</option>", attributes.render(), entities(display))
}

fn option(display: &str, value: &Value, selected: Option<&Value>, extra: Option<&Attributes>) -> String {
	let attributes = Attributes::new()
		.with("value", to_plain_string(value))
		.with("selected", is_selected(value, selected).then_some("selected"))
		.merge(extra.cloned().unwrap_or_default());
	format!("<option{}>{}</option>", attributes.render(), entities(display))
}

fn option_group(
	label: &str,
	entries: &[SelectEntry],
	selected: Option<&Value>,
	extra: &OptionAttributes,
	level: usize,
) -> String {
	let space = "&nbsp;".repeat(level);
	let body: String = entries
		.iter()
		.map(|entry| match entry {
			SelectEntry::Option { value, display } => option(
				&format!("{}{}", space, display),
				value,
				selected,
				extra.for_option(value),
			),
			SelectEntry::Group { label, entries } => {
				option_group(label, entries, selected, extra, level + GROUP_INDENT)
			}
		})
		.collect();

	let attributes = Attributes::new()
		.with("label", format!("{}{}", space, label))
		.merge(extra.for_group(label).cloned().unwrap_or_default());
	format!("<optgroup{}>{}</optgroup>", attributes.render(), body)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!("a"), Some(json!("a")), true)]
	#[case(json!(1), Some(json!("1")), true)]
	#[case(json!(0), Some(json!(false)), true)]
	#[case(json!(0), Some(json!(true)), false)]
	#[case(json!("b"), Some(json!(["a", "b"])), true)]
	#[case(json!("2"), Some(json!([2])), true)]
	#[case(json!(4), Some(json!([{"id": 4}, {"id": 5}])), true)]
	#[case(json!(6), Some(json!([{"id": 4}])), false)]
	#[case(json!(""), None, true)]
	fn test_is_selected(#[case] value: Value, #[case] selected: Option<Value>, #[case] expected: bool) {
		assert_eq!(is_selected(&value, selected.as_ref()), expected);
	}

	#[rstest]
	fn test_nested_groups_indent_labels_and_options() {
		let entries = vec![SelectEntry::group(
			"Europe",
			vec![
				SelectEntry::option("fr", "France"),
				SelectEntry::group("Nordics", vec![SelectEntry::option("no", "Norway")]),
			],
		)];

		let html = render_entries(&entries, Some(&json!("no")), &OptionAttributes::new());
		assert_eq!(
			html,
			"<optgroup label=\"Europe\"><option value=\"fr\">France</option>\
			 <optgroup label=\"&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;Nordics\">\
			 <option value=\"no\" selected=\"selected\">&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;Norway</option>\
			 </optgroup></optgroup>"
		);
	}

	#[rstest]
	fn test_option_and_group_attributes() {
		let entries = vec![
			SelectEntry::option(1, "One"),
			SelectEntry::group("More", vec![SelectEntry::option(2, "Two")]),
		];
		let extra = OptionAttributes::new()
			.option(1, Attributes::new().flag("disabled"))
			.group("More", Attributes::new().with("class", "more"));

		assert_eq!(
			render_entries(&entries, None, &extra),
			"<option value=\"1\" disabled>One</option>\
			 <optgroup label=\"More\" class=\"more\"><option value=\"2\">Two</option></optgroup>"
		);
	}

	#[rstest]
	fn test_placeholder_selected_only_without_selection() {
		assert_eq!(
			placeholder_option("Pick <one>", None),
			"<option selected=\"selected\" value=\"\">Pick &lt;one&gt;</option>"
		);
		assert_eq!(
			placeholder_option("Pick", Some(&json!("x"))),
			"<option value=\"\">Pick</option>"
		);
	}
}
