//! Bound models supplying default field values
//!
//! A form opened with [`crate::FormBuilder::model`] falls back to the bound
//! model when a field has no live, old or explicit value. Models take part
//! through the [`FormModel`] capability; plain JSON data implements it with
//! a dotted-path lookup, and [`AccessibleModel`] adds relations and form
//! mutators.

use crate::value::{data_get, data_get_in};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Capability of a bound model to resolve form field values.
pub trait FormModel {
	/// Whether this model resolves `key` at all. Keys it declines resolve to
	/// nothing.
	fn supports_field_resolution(&self, _key: &str) -> bool {
		true
	}

	/// Value for a normalized (dotted) field key.
	fn get_field_value(&self, key: &str) -> Option<Value>;
}

impl FormModel for Value {
	fn get_field_value(&self, key: &str) -> Option<Value> {
		data_get(self, key).filter(|v| !v.is_null()).cloned()
	}
}

/// Transform applied to a raw attribute before it is rendered into a form.
pub type FormMutator = Arc<dyn Fn(Option<&Value>) -> Option<Value> + Send + Sync>;

/// Related records reachable from an [`AccessibleModel`].
#[derive(Debug, Clone)]
pub enum Relation {
	One(AccessibleModel),
	Many(Vec<AccessibleModel>),
}

impl Relation {
	fn to_value(&self) -> Value {
		match self {
			Relation::One(model) => model.to_value(),
			Relation::Many(models) => Value::Array(models.iter().map(AccessibleModel::to_value).collect()),
		}
	}
}

/// Record with attributes, nested relations and form mutators
///
/// Field keys resolve in this order:
/// 1. a form mutator registered for the full key, fed the raw attribute;
/// 2. a relation named by the first key segment, resolved recursively with
///    the rest of the key (a bare relation name yields the related record,
///    or an array of records for a many-relation);
/// 3. a dotted lookup into the attributes.
///
/// # Examples
///
/// ```
/// use reinhardt_html::model::{AccessibleModel, FormModel};
/// use serde_json::json;
///
/// let address = AccessibleModel::new(json!({"city": "kyoto"}))
///     .with_form_mutator("city", |v| v.and_then(|v| v.as_str()).map(|s| json!(s.to_uppercase())));
/// let user = AccessibleModel::new(json!({"id": 7, "name": "Aki"}))
///     .with_relation("address", address);
///
/// assert_eq!(user.get_field_value("name"), Some(json!("Aki")));
/// assert_eq!(user.get_field_value("address.city"), Some(json!("KYOTO")));
/// ```
#[derive(Clone, Default)]
pub struct AccessibleModel {
	attributes: Map<String, Value>,
	relations: HashMap<String, Relation>,
	mutators: HashMap<String, FormMutator>,
}

impl AccessibleModel {
	/// Create a model from a JSON object of attributes. Non-object input
	/// yields a model without attributes.
	pub fn new(attributes: Value) -> Self {
		let attributes = match attributes {
			Value::Object(map) => map,
			_ => Map::new(),
		};
		Self {
			attributes,
			..Self::default()
		}
	}

	pub fn with_relation(mut self, name: impl Into<String>, model: AccessibleModel) -> Self {
		self.relations.insert(name.into(), Relation::One(model));
		self
	}

	pub fn with_many(mut self, name: impl Into<String>, models: Vec<AccessibleModel>) -> Self {
		self.relations.insert(name.into(), Relation::Many(models));
		self
	}

	pub fn with_form_mutator<F>(mut self, key: impl Into<String>, mutator: F) -> Self
	where
		F: Fn(Option<&Value>) -> Option<Value> + Send + Sync + 'static,
	{
		self.mutators.insert(key.into(), Arc::new(mutator));
		self
	}

	pub fn has_form_mutator(&self, key: &str) -> bool {
		self.mutators.contains_key(key)
	}

	pub fn attribute(&self, key: &str) -> Option<&Value> {
		self.attributes.get(key)
	}

	/// Attributes and relations as one JSON object.
	pub fn to_value(&self) -> Value {
		let mut map = self.attributes.clone();
		for (name, relation) in &self.relations {
			map.insert(name.clone(), relation.to_value());
		}
		Value::Object(map)
	}
}

impl FormModel for AccessibleModel {
	fn get_field_value(&self, key: &str) -> Option<Value> {
		if let Some(mutator) = self.mutators.get(key) {
			return mutator(self.attributes.get(key));
		}

		let (head, rest) = key.split_once('.').unwrap_or((key, ""));
		if let Some(relation) = self.relations.get(head) {
			return match relation {
				Relation::One(model) if !rest.is_empty() => model.get_field_value(rest),
				other => other.to_value().get_field_value(rest),
			};
		}

		data_get_in(&self.attributes, key)
			.filter(|v| !v.is_null())
			.cloned()
	}
}

impl fmt::Debug for AccessibleModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut mutators: Vec<&String> = self.mutators.keys().collect();
		mutators.sort();
		f.debug_struct("AccessibleModel")
			.field("attributes", &self.attributes)
			.field("relations", &self.relations)
			.field("mutators", &mutators)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn user() -> AccessibleModel {
		AccessibleModel::new(json!({
			"id": 1,
			"name": "taylor",
			"meta": {"theme": "dark"},
			"nickname": null,
		}))
		.with_relation(
			"address",
			AccessibleModel::new(json!({"city": "Osaka", "zip": "530"}))
				.with_form_mutator("zip", |v| v.map(|z| json!(format!("〒{}", z.as_str().unwrap_or_default())))),
		)
		.with_many(
			"roles",
			vec![
				AccessibleModel::new(json!({"id": 1, "name": "admin"})),
				AccessibleModel::new(json!({"id": 3, "name": "editor"})),
			],
		)
		.with_form_mutator("name", |v| v.and_then(Value::as_str).map(|s| json!(s.to_uppercase())))
	}

	#[rstest]
	fn test_mutator_replaces_raw_attribute(user: AccessibleModel) {
		assert_eq!(user.get_field_value("name"), Some(json!("TAYLOR")));
		assert_eq!(user.attribute("name"), Some(&json!("taylor")));
	}

	#[rstest]
	fn test_nested_relation_delegates_with_remaining_key(user: AccessibleModel) {
		assert_eq!(user.get_field_value("address.city"), Some(json!("Osaka")));
		assert_eq!(user.get_field_value("address.zip"), Some(json!("〒530")));
		assert_eq!(user.get_field_value("address.street"), None);
	}

	#[rstest]
	fn test_many_relation_yields_records(user: AccessibleModel) {
		let roles = user.get_field_value("roles").unwrap();
		assert_eq!(roles[0]["id"], json!(1));
		assert_eq!(roles[1]["name"], json!("editor"));
		assert_eq!(user.get_field_value("roles.1.id"), Some(json!(3)));
	}

	#[rstest]
	fn test_dotted_attribute_lookup(user: AccessibleModel) {
		assert_eq!(user.get_field_value("meta.theme"), Some(json!("dark")));
		assert_eq!(user.get_field_value("nickname"), None);
		assert_eq!(user.get_field_value("missing"), None);
	}

	#[rstest]
	fn test_json_value_model() {
		let model = json!({"profile": {"age": 30}});
		assert!(model.supports_field_resolution("profile.age"));
		assert_eq!(model.get_field_value("profile.age"), Some(json!(30)));
		assert_eq!(model.get_field_value("profile.name"), None);
	}

	#[rstest]
	fn test_debug_lists_mutator_keys(user: AccessibleModel) {
		let debug = format!("{:?}", user);
		assert!(debug.contains("mutators: [\"name\"]"));
	}
}
