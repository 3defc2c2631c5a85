//! Field names and loosely-typed field values
//!
//! Submitted form data is untyped: a checkbox posts `"1"`, a model stores
//! `true`, a select posts `["3", "4"]` against integer keys. Comparisons
//! between such values follow the loose rules implemented here rather than
//! `PartialEq` on [`serde_json::Value`].

use serde_json::{Map, Value};

/// Normalize bracket notation into a flat dotted path
///
/// `[]` is removed, `[` becomes `.` and `]` is dropped. Dots are kept, so
/// the result contains no brackets and normalizing it again is a no-op.
///
/// # Examples
///
/// ```
/// use reinhardt_html::value::normalize_field_name;
///
/// assert_eq!(normalize_field_name("user[address][city]"), "user.address.city");
/// assert_eq!(normalize_field_name("tags[]"), "tags");
/// assert_eq!(normalize_field_name("user.email"), "user.email");
/// ```
pub fn normalize_field_name(name: &str) -> String {
	name.replace("[]", "").replace('[', ".").replace(']', "")
}

/// Truthiness of a submitted value
///
/// `null`, `false`, `0`, `""`, `"0"` and empty arrays or objects are falsy.
///
/// # Examples
///
/// ```
/// use reinhardt_html::value::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!("1")));
/// assert!(is_truthy(&json!("false")));
/// assert!(!is_truthy(&json!("0")));
/// assert!(!is_truthy(&json!([])));
/// ```
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !(s.is_empty() || s == "0"),
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
	}
}

/// Loose, type-coercing equality between two field values
///
/// # Examples
///
/// ```
/// use reinhardt_html::value::loose_eq;
/// use serde_json::json;
///
/// assert!(loose_eq(&json!("1"), &json!(true)));
/// assert!(loose_eq(&json!("10"), &json!(10)));
/// assert!(loose_eq(&json!("1e1"), &json!("10")));
/// assert!(!loose_eq(&json!("abc"), &json!(0)));
/// assert!(!loose_eq(&json!(null), &json!("x")));
/// ```
pub fn loose_eq(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Null, Value::Null) => true,
		(Value::Bool(flag), other) | (other, Value::Bool(flag)) => *flag == is_truthy(other),
		(Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
		(Value::Null, other) | (other, Value::Null) => !is_truthy(other),
		(Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
			(Some(p), Some(q)) => p == q,
			_ => x.as_f64() == y.as_f64(),
		},
		(Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
			match numeric(s) {
				Some(parsed) => n.as_f64() == Some(parsed),
				None => n.to_string() == *s,
			}
		}
		(Value::String(x), Value::String(y)) => match (numeric(x), numeric(y)) {
			(Some(p), Some(q)) => p == q,
			_ => x == y,
		},
		(Value::Array(x), Value::Array(y)) => {
			x.len() == y.len() && x.iter().zip(y).all(|(p, q)| loose_eq(p, q))
		}
		(Value::Object(x), Value::Object(y)) => {
			x.len() == y.len()
				&& x.iter()
					.all(|(key, p)| y.get(key).is_some_and(|q| loose_eq(p, q)))
		}
		_ => false,
	}
}

/// Parse a numeric string the way form input is usually coerced.
fn numeric(s: &str) -> Option<f64> {
	let trimmed = s.trim();
	if trimmed.is_empty()
		|| !trimmed
			.chars()
			.all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
	{
		return None;
	}
	trimmed.parse::<f64>().ok()
}

/// Plain string form of a value, as rendered into an attribute or text node
///
/// # Examples
///
/// ```
/// use reinhardt_html::value::to_plain_string;
/// use serde_json::json;
///
/// assert_eq!(to_plain_string(&json!("x")), "x");
/// assert_eq!(to_plain_string(&json!(42)), "42");
/// assert_eq!(to_plain_string(&json!(true)), "1");
/// assert_eq!(to_plain_string(&json!(false)), "");
/// assert_eq!(to_plain_string(&json!(null)), "");
/// ```
pub fn to_plain_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(true) => "1".to_string(),
		Value::Bool(false) => String::new(),
		Value::String(s) => s.clone(),
		Value::Number(n) => n.to_string(),
		other => other.to_string(),
	}
}

/// Look up a dotted path inside a JSON value
///
/// Object segments match keys, numeric segments index arrays. An empty key
/// returns the target itself.
///
/// # Examples
///
/// ```
/// use reinhardt_html::value::data_get;
/// use serde_json::json;
///
/// let data = json!({"user": {"tags": ["a", "b"]}});
/// assert_eq!(data_get(&data, "user.tags.1"), Some(&json!("b")));
/// assert_eq!(data_get(&data, "user.name"), None);
/// ```
pub fn data_get<'a>(target: &'a Value, key: &str) -> Option<&'a Value> {
	if key.is_empty() {
		return Some(target);
	}
	key.split('.')
		.try_fold(target, |current, segment| match current {
			Value::Object(map) => map.get(segment),
			Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
			_ => None,
		})
}

/// [`data_get`] starting from a map of top-level entries.
pub(crate) fn data_get_in<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
	let (head, rest) = key.split_once('.').unwrap_or((key, ""));
	data_get(map.get(head)?, rest)
}

/// `None` for absent or null values.
pub(crate) fn present(value: Option<Value>) -> Option<Value> {
	value.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("user[address][city]", "user.address.city")]
	#[case("tags[]", "tags")]
	#[case("items[0][name]", "items.0.name")]
	#[case("matrix[][]", "matrix")]
	#[case("plain", "plain")]
	fn test_normalize_field_name(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_field_name(input), expected);
	}

	#[rstest]
	fn test_normalize_is_idempotent_for_nested_name() {
		let once = normalize_field_name("user[address][city]");
		assert_eq!(normalize_field_name(&once), once);
		assert_eq!(once, "user.address.city");
	}

	proptest! {
		#[test]
		fn prop_normalize_is_idempotent(name in "[a-z_\\[\\]\\.0-9]{0,24}") {
			let once = normalize_field_name(&name);
			prop_assert_eq!(normalize_field_name(&once), once.clone());
			prop_assert!(!once.contains('[') && !once.contains(']'));
		}
	}

	#[rstest]
	#[case(json!("1"), json!(true), true)]
	#[case(json!("0"), json!(false), true)]
	#[case(json!(1), json!("1"), true)]
	#[case(json!(1.0), json!(1), true)]
	#[case(json!(" 2"), json!(2), true)]
	#[case(json!("abc"), json!("ABC"), false)]
	#[case(json!(null), json!(""), true)]
	#[case(json!(null), json!(0), true)]
	#[case(json!(null), json!("0"), false)]
	#[case(json!([1, "2"]), json!(["1", 2]), true)]
	#[case(json!({"id": 1}), json!({"id": "1"}), true)]
	#[case(json!([1]), json!(1), false)]
	fn test_loose_eq(#[case] a: Value, #[case] b: Value, #[case] expected: bool) {
		assert_eq!(loose_eq(&a, &b), expected);
		assert_eq!(loose_eq(&b, &a), expected);
	}

	#[rstest]
	fn test_data_get_indexes_arrays_and_objects() {
		let data = json!({"a": [{"b": 1}, {"b": 2}]});
		assert_eq!(data_get(&data, "a.1.b"), Some(&json!(2)));
		assert_eq!(data_get(&data, "a.x.b"), None);
		assert_eq!(data_get(&data, ""), Some(&data));
	}

	#[rstest]
	fn test_present_drops_null() {
		assert_eq!(present(Some(json!(null))), None);
		assert_eq!(present(Some(json!(0))), Some(json!(0)));
		assert_eq!(present(None), None);
	}
}
