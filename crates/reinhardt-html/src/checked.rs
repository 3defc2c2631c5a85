//! Checked state of checkboxes and radio buttons
//!
//! A checkbox that is missing from a real submission was unchecked, while
//! one missing from a fresh form says nothing. The checkbox rules below tell
//! the two apart through the old input; radios need no such rule because an
//! unselected group simply has no matching value anywhere.

use crate::resolver::{FieldContext, FieldValueResolver};
use crate::value::{is_truthy, loose_eq};
use serde_json::Value;

/// Outcome of a checked-state computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckedState {
	Checked,
	Unchecked,
	/// Nothing to infer from; use the caller's default.
	Fallback,
}

impl CheckedState {
	/// Collapse to a flag, using `default` for [`CheckedState::Fallback`].
	pub fn or_default(self, default: bool) -> bool {
		match self {
			CheckedState::Checked => true,
			CheckedState::Unchecked => false,
			CheckedState::Fallback => default,
		}
	}
}

impl From<bool> for CheckedState {
	fn from(checked: bool) -> Self {
		if checked {
			CheckedState::Checked
		} else {
			CheckedState::Unchecked
		}
	}
}

impl FieldValueResolver {
	/// Checked state of a checkbox carrying `value`.
	///
	/// `default` is the caller's own checked flag. It also serves as the
	/// explicit value when the posted value is resolved.
	pub fn checkbox_state(
		&mut self,
		name: &str,
		value: &Value,
		default: Option<bool>,
		ctx: FieldContext<'_>,
	) -> CheckedState {
		let live = self.request_value(name);

		if !self.considers_request()
			&& self.has_session()
			&& !self.old_input_is_empty()
			&& self.peek_old(name).is_none()
		{
			return CheckedState::Unchecked;
		}

		if live.is_none() && self.missing_old_and_model(name, ctx.model) {
			return CheckedState::Fallback;
		}

		let explicit = default.map(Value::Bool);
		let posted = self.resolve(name, explicit.as_ref(), ctx);
		CheckedState::from(posted_contains(posted.as_ref(), value))
	}

	/// Checked state of a radio button carrying `value`.
	pub fn radio_state(&mut self, name: &str, value: &Value, ctx: FieldContext<'_>) -> CheckedState {
		let live = self.request_value(name);

		if live.is_none() && self.missing_old_and_model(name, ctx.model) {
			return CheckedState::Fallback;
		}

		let resolved = self.resolve(name, None, ctx).unwrap_or(Value::Null);
		CheckedState::from(loose_eq(&resolved, value))
	}
}

/// Whether the posted value of a checkbox group selects `value`.
fn posted_contains(posted: Option<&Value>, value: &Value) -> bool {
	match posted {
		Some(Value::Array(items)) if is_id_collection(items) => items
			.iter()
			.any(|item| item.get("id").is_some_and(|id| loose_eq(id, value))),
		Some(Value::Array(items)) => items.iter().any(|item| loose_eq(item, value)),
		Some(other) => is_truthy(other),
		None => false,
	}
}

/// A non-empty array of records that all carry an `id`.
fn is_id_collection(items: &[Value]) -> bool {
	!items.is_empty()
		&& items
			.iter()
			.all(|item| item.as_object().is_some_and(|record| record.contains_key("id")))
}
