//! Builder for non-form HTML fragments
//!
//! Links, assets, lists and meta tags. URLs come from the application's
//! [`UrlGenerator`]; components render through its [`ViewFactory`].

use crate::attributes::Attributes;
use crate::contracts::{UrlGenerator, ViewFactory};
use crate::error::HtmlResult;
use crate::escape::{self, HtmlString};
use crate::extensions::{ComponentParam, Extensions};
use rand::Rng;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Item of an `ol`/`ul` listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
	/// `<li>text</li>`
	Item(String),
	/// A nested list emitted in place, without an enclosing `<li>`
	Nested(Vec<ListItem>),
	/// `<li>label<ul>...</ul></li>`
	Labeled(String, Vec<ListItem>),
}

impl From<&str> for ListItem {
	fn from(text: &str) -> Self {
		ListItem::Item(text.to_string())
	}
}

impl From<String> for ListItem {
	fn from(text: String) -> Self {
		ListItem::Item(text)
	}
}

/// Renders links, assets and other tag fragments
///
/// Components and macros are registered through `&mut self`, so register
/// them before the builder is wrapped in an `Arc` and handed to a
/// [`FormBuilder`](crate::FormBuilder).
pub struct HtmlBuilder {
	url: Arc<dyn UrlGenerator>,
	view: Arc<dyn ViewFactory>,
	extensions: Extensions,
}

impl HtmlBuilder {
	pub fn new(url: Arc<dyn UrlGenerator>, view: Arc<dyn ViewFactory>) -> Self {
		Self {
			url,
			view,
			extensions: Extensions::new("HtmlBuilder"),
		}
	}

	pub fn url(&self) -> &Arc<dyn UrlGenerator> {
		&self.url
	}

	pub fn view(&self) -> &Arc<dyn ViewFactory> {
		&self.view
	}

	/// Serialize an attribute map; see [`Attributes::render`].
	pub fn attributes(&self, attributes: &Attributes) -> String {
		attributes.render()
	}

	/// Escape text without double-encoding existing entities.
	pub fn entities(&self, value: &str) -> String {
		escape::entities(value)
	}

	/// Turn entities back into characters.
	pub fn decode(&self, value: &str) -> String {
		escape::decode(value)
	}

	/// `<script>` tag for a script asset.
	pub fn script(&self, url: &str, attributes: Attributes, secure: Option<bool>) -> HtmlString {
		let mut attributes = attributes;
		attributes.set("src", self.url.asset(url, secure));
		HtmlString::new(format!("<script{}></script>\n", attributes.render()))
	}

	/// Stylesheet `<link>` tag. Caller attributes override the defaults.
	pub fn style(&self, url: &str, attributes: Attributes, secure: Option<bool>) -> HtmlString {
		let mut attributes = Attributes::new()
			.with("media", "all")
			.with("type", "text/css")
			.with("rel", "stylesheet")
			.merge(attributes);
		attributes.set("href", self.url.asset(url, secure));
		HtmlString::new(format!("<link{}>\n", attributes.render()))
	}

	pub fn image(&self, url: &str, alt: Option<&str>, attributes: Attributes, secure: Option<bool>) -> HtmlString {
		let mut attributes = Attributes::new()
			.with("src", self.url.asset(url, secure))
			.merge(attributes);
		attributes.set("alt", alt);
		HtmlString::new(format!("<img{}>", attributes.render()))
	}

	pub fn favicon(&self, url: &str, attributes: Attributes, secure: Option<bool>) -> HtmlString {
		let mut attributes = Attributes::new()
			.with("rel", "shortcut icon")
			.with("type", "image/x-icon")
			.merge(attributes);
		attributes.set("href", self.url.asset(url, secure));
		HtmlString::new(format!("<link{}>\n", attributes.render()))
	}

	/// Anchor to an application path. Without a title the URL is shown.
	pub fn link(
		&self,
		url: &str,
		title: Option<&str>,
		attributes: Attributes,
		secure: Option<bool>,
		escape: bool,
	) -> HtmlString {
		let href = self.url.to(url, &[], secure);
		self.anchor(&href, title, attributes, escape)
	}

	pub fn secure_link(&self, url: &str, title: Option<&str>, attributes: Attributes, escape: bool) -> HtmlString {
		self.link(url, title, attributes, Some(true), escape)
	}

	/// Anchor to a static asset.
	pub fn link_asset(
		&self,
		url: &str,
		title: Option<&str>,
		attributes: Attributes,
		secure: Option<bool>,
		escape: bool,
	) -> HtmlString {
		let href = self.url.asset(url, secure);
		self.anchor(&href, title, attributes, escape)
	}

	pub fn link_secure_asset(
		&self,
		url: &str,
		title: Option<&str>,
		attributes: Attributes,
		escape: bool,
	) -> HtmlString {
		self.link_asset(url, title, attributes, Some(true), escape)
	}

	/// Anchor to a named route.
	pub fn link_route(
		&self,
		name: &str,
		title: Option<&str>,
		parameters: &Value,
		attributes: Attributes,
		secure: Option<bool>,
		escape: bool,
	) -> HtmlString {
		let href = self.url.route(name, parameters, secure);
		self.anchor(&href, title, attributes, escape)
	}

	/// Anchor to a controller action.
	pub fn link_action(
		&self,
		action: &str,
		title: Option<&str>,
		parameters: &Value,
		attributes: Attributes,
		secure: Option<bool>,
		escape: bool,
	) -> HtmlString {
		let href = self.url.action(action, parameters, secure);
		self.anchor(&href, title, attributes, escape)
	}

	fn anchor(&self, href: &str, title: Option<&str>, attributes: Attributes, escape: bool) -> HtmlString {
		let title = title.unwrap_or(href);
		let title = if escape {
			escape::entities(title)
		} else {
			title.to_string()
		};
		HtmlString::new(format!(
			"<a href=\"{}\"{}>{}</a>",
			escape::entities(href),
			attributes.render(),
			title
		))
	}

	/// Obfuscated `mailto:` anchor.
	pub fn mailto(&self, email: &str, title: Option<&str>, attributes: Attributes, escape: bool) -> HtmlString {
		let email = self.email(email);
		let title = match title {
			Some(title) if escape => escape::entities(title),
			Some(title) => title.to_string(),
			None => email.clone(),
		};
		let href = format!("{}{}", self.obfuscate("mailto:"), email);
		HtmlString::new(format!("<a href=\"{}\"{}>{}</a>", href, attributes.render(), title))
	}

	/// Obfuscate an e-mail address against harvesting.
	pub fn email(&self, email: &str) -> String {
		self.obfuscate(email).replace('@', "&#64;")
	}

	pub fn obfuscate(&self, value: &str) -> String {
		self.obfuscate_with(value, &mut rand::thread_rng())
	}

	/// Randomly encode each ASCII character as a decimal entity, a hex
	/// entity, or itself. Other characters are kept as they are.
	pub fn obfuscate_with<R: Rng + ?Sized>(&self, value: &str, rng: &mut R) -> String {
		let mut safe = String::with_capacity(value.len() * 4);
		for letter in value.chars() {
			if !letter.is_ascii() {
				safe.push(letter);
				continue;
			}
			match rng.gen_range(1..=3) {
				1 => safe.push_str(&format!("&#{};", letter as u32)),
				2 => safe.push_str(&format!("&#x{:x};", letter as u32)),
				_ => safe.push(letter),
			}
		}
		safe
	}

	/// `count` non-breaking spaces.
	pub fn nbsp(&self, count: usize) -> String {
		"&nbsp;".repeat(count)
	}

	pub fn ol(&self, items: &[ListItem], attributes: Attributes) -> HtmlString {
		HtmlString::new(listing("ol", items, &attributes))
	}

	pub fn ul(&self, items: &[ListItem], attributes: Attributes) -> HtmlString {
		HtmlString::new(listing("ul", items, &attributes))
	}

	/// Definition list of terms and their descriptions.
	pub fn dl<T, D>(&self, entries: &[(T, Vec<D>)], attributes: Attributes) -> HtmlString
	where
		T: AsRef<str>,
		D: AsRef<str>,
	{
		let mut html = format!("<dl{}>", attributes.render());
		for (term, descriptions) in entries {
			html.push_str(&format!("<dt>{}</dt>", escape::entities(term.as_ref())));
			for description in descriptions {
				html.push_str(&format!("<dd>{}</dd>", escape::entities(description.as_ref())));
			}
		}
		html.push_str("</dl>");
		HtmlString::new(html)
	}

	pub fn meta(&self, name: &str, content: &str, attributes: Attributes) -> HtmlString {
		let attributes = Attributes::new()
			.with("name", name)
			.with("content", content)
			.merge(attributes);
		HtmlString::new(format!("<meta{}>\n", attributes.render()))
	}

	/// Wrap already safe content in an arbitrary tag.
	pub fn tag(&self, tag: &str, content: &str, attributes: Attributes) -> HtmlString {
		HtmlString::new(format!(
			"<{tag}{}>\n{}\n</{tag}>\n",
			attributes.render(),
			content
		))
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
		self.extensions.call(name, args, self.view.as_ref())
	}
}

impl fmt::Debug for HtmlBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HtmlBuilder")
			.field("extensions", &self.extensions)
			.finish_non_exhaustive()
	}
}

fn listing(kind: &str, items: &[ListItem], attributes: &Attributes) -> String {
	if items.is_empty() {
		return String::new();
	}

	let body: String = items.iter().map(|item| listing_element(kind, item)).collect();
	format!("<{kind}{}>{}</{kind}>", attributes.render(), body)
}

fn listing_element(kind: &str, item: &ListItem) -> String {
	match item {
		ListItem::Item(text) => format!("<li>{}</li>", escape::entities(text)),
		ListItem::Nested(items) => listing(kind, items, &Attributes::new()),
		ListItem::Labeled(label, items) => format!(
			"<li>{}{}</li>",
			escape::entities(label),
			listing(kind, items, &Attributes::new())
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use rstest::{fixture, rstest};
	use serde_json::{Map, json};

	struct StaticUrls;

	impl UrlGenerator for StaticUrls {
		fn to(&self, path: &str, _extra: &[String], secure: Option<bool>) -> String {
			let scheme = if secure == Some(true) { "https" } else { "http" };
			format!("{}://app.test/{}", scheme, path.trim_start_matches('/'))
		}

		fn route(&self, name: &str, parameters: &Value, _secure: Option<bool>) -> String {
			format!("http://app.test/route/{}?{}", name, parameters)
		}

		fn action(&self, action: &str, _parameters: &Value, _secure: Option<bool>) -> String {
			format!("http://app.test/action/{}", action)
		}

		fn current(&self) -> String {
			"http://app.test/current".to_string()
		}

		fn asset(&self, path: &str, secure: Option<bool>) -> String {
			let scheme = if secure == Some(true) { "https" } else { "http" };
			format!("{}://cdn.test/{}", scheme, path)
		}
	}

	struct NullView;

	impl ViewFactory for NullView {
		fn render(&self, view: &str, _data: &Map<String, Value>) -> String {
			format!("[{}]", view)
		}
	}

	#[fixture]
	fn html() -> HtmlBuilder {
		HtmlBuilder::new(Arc::new(StaticUrls), Arc::new(NullView))
	}

	#[rstest]
	fn test_script_and_style(html: HtmlBuilder) {
		assert_eq!(
			html.script("app.js", Attributes::new().flag("defer"), None).as_str(),
			"<script defer src=\"http://cdn.test/app.js\"></script>\n"
		);
		assert_eq!(
			html.style("app.css", Attributes::new().with("media", "print"), Some(true)).as_str(),
			"<link media=\"print\" type=\"text/css\" rel=\"stylesheet\" href=\"https://cdn.test/app.css\">\n"
		);
	}

	#[rstest]
	fn test_image_and_favicon(html: HtmlBuilder) {
		assert_eq!(
			html.image("logo.png", Some("A & B"), Attributes::new().with("width", 10), None).as_str(),
			"<img src=\"http://cdn.test/logo.png\" width=\"10\" alt=\"A &amp; B\">"
		);
		assert_eq!(
			html.favicon("favicon.ico", Attributes::new(), None).as_str(),
			"<link rel=\"shortcut icon\" type=\"image/x-icon\" href=\"http://cdn.test/favicon.ico\">\n"
		);
	}

	#[rstest]
	#[case(Some("<Home>"), true, "<a href=\"http://app.test/home\">&lt;Home&gt;</a>")]
	#[case(Some("<b>Home</b>"), false, "<a href=\"http://app.test/home\"><b>Home</b></a>")]
	#[case(None, true, "<a href=\"http://app.test/home\">http://app.test/home</a>")]
	fn test_link_title(html: HtmlBuilder, #[case] title: Option<&str>, #[case] escape: bool, #[case] expected: &str) {
		assert_eq!(html.link("/home", title, Attributes::new(), None, escape).as_str(), expected);
	}

	#[rstest]
	fn test_link_variants(html: HtmlBuilder) {
		assert_eq!(
			html.secure_link("login", Some("Login"), Attributes::new(), true).as_str(),
			"<a href=\"https://app.test/login\">Login</a>"
		);
		assert_eq!(
			html.link_secure_asset("doc.pdf", None, Attributes::new(), true).as_str(),
			"<a href=\"https://cdn.test/doc.pdf\">https://cdn.test/doc.pdf</a>"
		);
		assert_eq!(
			html.link_route("users.show", Some("Me"), &json!({"id": 1}), Attributes::new(), None, true)
				.as_str(),
			"<a href=\"http://app.test/route/users.show?{&quot;id&quot;:1}\">Me</a>"
		);
		assert_eq!(
			html.link_action("UserController@index", Some("Users"), &json!({}), Attributes::new(), None, true)
				.as_str(),
			"<a href=\"http://app.test/action/UserController@index\">Users</a>"
		);
	}

	#[rstest]
	fn test_obfuscate_round_trips_through_decode(html: HtmlBuilder) {
		let mut rng = StdRng::seed_from_u64(7);
		let obfuscated = html.obfuscate_with("hello@example.com", &mut rng);
		assert_eq!(html.decode(&obfuscated), "hello@example.com");
	}

	#[rstest]
	fn test_obfuscate_keeps_non_ascii(html: HtmlBuilder) {
		let mut rng = StdRng::seed_from_u64(1);
		let obfuscated = html.obfuscate_with("ü", &mut rng);
		assert_eq!(obfuscated, "ü");
	}

	#[rstest]
	fn test_email_hides_at_sign(html: HtmlBuilder) {
		let email = html.email("a@b.c");
		assert!(!email.contains('@'));
		assert_eq!(html.decode(&email), "a@b.c");
	}

	#[rstest]
	fn test_mailto_uses_obfuscated_address(html: HtmlBuilder) {
		let anchor = html.mailto("a@b.c", Some("Mail"), Attributes::new(), true);
		let decoded = html.decode(anchor.as_str());
		assert_eq!(decoded, "<a href=\"mailto:a@b.c\">Mail</a>");
	}

	#[rstest]
	fn test_nested_listing(html: HtmlBuilder) {
		let items = vec![
			ListItem::from("a"),
			ListItem::Labeled("Fruits".to_string(), vec!["apple".into(), "<pear>".into()]),
			ListItem::Nested(vec!["x".into()]),
		];

		assert_eq!(
			html.ul(&items, Attributes::new().with("class", "list")).as_str(),
			"<ul class=\"list\"><li>a</li><li>Fruits<ul><li>apple</li><li>&lt;pear&gt;</li></ul></li><ul><li>x</li></ul></ul>"
		);
		assert_eq!(html.ol(&[], Attributes::new()).as_str(), "");
	}

	#[rstest]
	fn test_definition_list(html: HtmlBuilder) {
		let entries = [("Rust", vec!["systems", "safe"]), ("Go", vec![])];
		assert_eq!(
			html.dl(&entries, Attributes::new()).as_str(),
			"<dl><dt>Rust</dt><dd>systems</dd><dd>safe</dd><dt>Go</dt></dl>"
		);
	}

	#[rstest]
	fn test_meta_and_tag(html: HtmlBuilder) {
		assert_eq!(
			html.meta("description", "A \"site\"", Attributes::new()).as_str(),
			"<meta name=\"description\" content=\"A &quot;site&quot;\">\n"
		);
		assert_eq!(
			html.tag("div", "<p>hi</p>", Attributes::new().with("id", "box")).as_str(),
			"<div id=\"box\">\n<p>hi</p>\n</div>\n"
		);
		assert_eq!(html.nbsp(2), "&nbsp;&nbsp;");
	}

	#[rstest]
	fn test_component_renders_through_view(mut html: HtmlBuilder) {
		html.component("alert", "components.alert", vec![]);
		assert!(html.has_component("alert"));
		assert_eq!(html.call("alert", &[]).unwrap().as_str(), "[components.alert]");
		assert!(html.call("missing", &[]).is_err());
	}
}
