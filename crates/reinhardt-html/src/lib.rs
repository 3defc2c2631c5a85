//! HTML and form builders for Reinhardt templates
//!
//! This crate renders markup fragments from Rust code:
//! - Attribute serialization and escaping
//! - Links, assets, listings and meta tags ([`HtmlBuilder`])
//! - Forms with method spoofing and CSRF fields ([`FormBuilder`])
//! - Field repopulation from the current request, flashed old input, an
//!   explicit value or a bound model
//! - Checked state of checkboxes and radio buttons
//! - Components and macros registered at runtime
//!
//! URL generation, view rendering, the session and the request belong to
//! the application and are reached through the traits in [`contracts`].

pub mod attributes;
pub mod checked;
pub mod contracts;
pub mod error;
pub mod escape;
pub mod extensions;
pub mod form;
pub mod html;
pub mod memory;
pub mod model;
pub mod resolver;
pub mod settings;
pub mod value;

pub use attributes::{AttrKey, AttrValue, Attributes};
pub use checked::CheckedState;
pub use contracts::{RequestAccessor, SessionStore, UrlGenerator, ViewFactory};
pub use error::{HtmlError, HtmlResult};
pub use escape::{HtmlString, decode, entities, escape};
pub use extensions::{Component, ComponentParam, Extensions};
pub use form::{
	FormBuilder, FormOptions, FormState, FormTarget, OptionAttributes, SelectEntry,
};
pub use html::{HtmlBuilder, ListItem};
pub use model::{AccessibleModel, FormModel};
pub use resolver::{ControlType, FieldContext, FieldValueResolver};
pub use settings::FormSettings;
pub use value::normalize_field_name;
