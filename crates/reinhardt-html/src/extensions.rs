//! Named rendering snippets registered at runtime
//!
//! Applications extend the builders with components (a view rendered with
//! positionally bound arguments) and macros (plain closures). Invoking a
//! name that was never registered fails with
//! [`HtmlError::UnknownExtension`].

use crate::contracts::ViewFactory;
use crate::error::{HtmlError, HtmlResult};
use crate::escape::HtmlString;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One parameter of a component signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentParam {
	pub name: String,
	/// Bound when the caller passes fewer arguments; `None` binds null.
	pub default: Option<Value>,
}

impl ComponentParam {
	pub fn required(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			default: None,
		}
	}

	pub fn with_default(name: impl Into<String>, default: Value) -> Self {
		Self {
			name: name.into(),
			default: Some(default),
		}
	}
}

/// A registered component: a view and the ordered parameters it accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
	pub view: String,
	pub signature: Vec<ComponentParam>,
}

impl Component {
	/// Bind positional arguments to the signature. Extra arguments are ignored.
	pub fn bind(&self, args: &[Value]) -> Map<String, Value> {
		self.signature
			.iter()
			.enumerate()
			.map(|(i, param)| {
				let value = args
					.get(i)
					.cloned()
					.or_else(|| param.default.clone())
					.unwrap_or(Value::Null);
				(param.name.clone(), value)
			})
			.collect()
	}
}

/// Closure registered as a macro.
pub type MacroFn = Arc<dyn Fn(&[Value]) -> HtmlString + Send + Sync>;

/// Registry of components and macros for one builder
///
/// # Examples
///
/// ```
/// use reinhardt_html::extensions::{ComponentParam, Extensions};
/// use reinhardt_html::HtmlString;
///
/// let mut extensions = Extensions::new("HtmlBuilder");
/// extensions.register_macro("shout", |args| {
///     let text = args.first().and_then(|v| v.as_str()).unwrap_or_default();
///     HtmlString::new(text.to_uppercase())
/// });
/// extensions.component("bs_text", "components.text", vec![ComponentParam::required("name")]);
///
/// assert!(extensions.has_macro("shout"));
/// assert!(extensions.has_component("bs_text"));
/// assert!(!extensions.has_macro("whisper"));
/// ```
#[derive(Clone)]
pub struct Extensions {
	owner: &'static str,
	components: HashMap<String, Component>,
	macros: HashMap<String, MacroFn>,
}

impl Extensions {
	/// `owner` names the builder in error messages.
	pub fn new(owner: &'static str) -> Self {
		Self {
			owner,
			components: HashMap::new(),
			macros: HashMap::new(),
		}
	}

	pub fn component(
		&mut self,
		name: impl Into<String>,
		view: impl Into<String>,
		signature: Vec<ComponentParam>,
	) {
		let name = name.into();
		let view = view.into();
		tracing::debug!(builder = self.owner, component = %name, view = %view, "registered component");
		self.components.insert(name, Component { view, signature });
	}

	pub fn register_macro<F>(&mut self, name: impl Into<String>, f: F)
	where
		F: Fn(&[Value]) -> HtmlString + Send + Sync + 'static,
	{
		let name = name.into();
		tracing::debug!(builder = self.owner, r#macro = %name, "registered macro");
		self.macros.insert(name, Arc::new(f));
	}

	pub fn has_component(&self, name: &str) -> bool {
		self.components.contains_key(name)
	}

	pub fn has_macro(&self, name: &str) -> bool {
		self.macros.contains_key(name)
	}

	pub fn get_component(&self, name: &str) -> Option<&Component> {
		self.components.get(name)
	}

	/// Invoke a component or macro by name. Components take precedence.
	pub fn call(&self, name: &str, args: &[Value], view: &dyn ViewFactory) -> HtmlResult<HtmlString> {
		if let Some(component) = self.components.get(name) {
			let data = component.bind(args);
			return Ok(HtmlString::new(view.render(&component.view, &data)));
		}

		if let Some(f) = self.macros.get(name) {
			return Ok(f(args));
		}

		Err(HtmlError::UnknownExtension {
			builder: self.owner,
			name: name.to_string(),
		})
	}
}

impl fmt::Debug for Extensions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut macros: Vec<&String> = self.macros.keys().collect();
		macros.sort();
		f.debug_struct("Extensions")
			.field("owner", &self.owner)
			.field("components", &self.components)
			.field("macros", &macros)
			.finish()
	}
}
