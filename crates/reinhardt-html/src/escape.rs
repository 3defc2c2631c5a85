//! HTML escaping and the safe markup string type

use std::fmt;

/// Escape HTML special characters
///
/// # Examples
///
/// ```
/// use reinhardt_html::escape::escape;
///
/// assert_eq!(escape("Hello, World!"), "Hello, World!");
/// assert_eq!(escape("<b>\"Tom\" & 'Jerry'</b>"),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
/// ```
pub fn escape(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 10);
	for ch in text.chars() {
		push_escaped(&mut result, ch);
	}
	result
}

/// Escape HTML special characters without double-encoding existing entities
///
/// # Examples
///
/// ```
/// use reinhardt_html::escape::entities;
///
/// assert_eq!(entities("Fish & Chips"), "Fish &amp; Chips");
/// assert_eq!(entities("Fish &amp; Chips"), "Fish &amp; Chips");
/// assert_eq!(entities("&#64; &#x40;"), "&#64; &#x40;");
/// ```
pub fn entities(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 10);
	for (idx, ch) in text.char_indices() {
		if ch == '&' && entity_at(&text[idx..]).is_some() {
			result.push('&');
		} else {
			push_escaped(&mut result, ch);
		}
	}
	result
}

/// Convert HTML entities back to their characters
///
/// Unknown or malformed entities are left untouched.
///
/// # Examples
///
/// ```
/// use reinhardt_html::escape::decode;
///
/// assert_eq!(decode("&lt;div&gt;"), "<div>");
/// assert_eq!(decode("a&#64;b&#x2e;c"), "a@b.c");
/// assert_eq!(decode("&bogus; & done"), "&bogus; & done");
/// ```
pub fn decode(text: &str) -> String {
	let mut result = String::with_capacity(text.len());
	let mut rest = text;

	while let Some(pos) = rest.find('&') {
		result.push_str(&rest[..pos]);
		let tail = &rest[pos..];
		match entity_at(tail).and_then(|len| decode_entity(&tail[1..len - 1]).map(|ch| (len, ch))) {
			Some((len, ch)) => {
				result.push(ch);
				rest = &tail[len..];
			}
			None => {
				result.push('&');
				rest = &tail[1..];
			}
		}
	}
	result.push_str(rest);
	result
}

fn push_escaped(out: &mut String, ch: char) {
	match ch {
		'&' => out.push_str("&amp;"),
		'<' => out.push_str("&lt;"),
		'>' => out.push_str("&gt;"),
		'"' => out.push_str("&quot;"),
		'\'' => out.push_str("&#x27;"),
		_ => out.push(ch),
	}
}

/// Longest entity name recognized between `&` and `;`.
const MAX_ENTITY_NAME: usize = 32;

/// Length in bytes of the well-formed entity starting at `text`, `;` included.
fn entity_at(text: &str) -> Option<usize> {
	let body = text.strip_prefix('&')?;
	let end = body.bytes().take(MAX_ENTITY_NAME + 1).position(|b| b == b';')?;
	let name = &body[..end];
	let well_formed = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
		!hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
	} else if let Some(dec) = name.strip_prefix('#') {
		!dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit())
	} else {
		!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
	};
	well_formed.then_some(end + 2)
}

fn decode_entity(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		_ => {
			let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
				u32::from_str_radix(hex, 16).ok()?
			} else {
				name.strip_prefix('#')?.parse::<u32>().ok()?
			};
			char::from_u32(code)
		}
	}
}

/// Markup that is already safe to emit.
///
/// Every builder operation returns one of these; the content is never
/// escaped again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HtmlString(String);

impl HtmlString {
	/// Wrap already-safe markup
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_html::HtmlString;
	///
	/// let html = HtmlString::new("<b>Bold</b>");
	/// assert_eq!(html.as_str(), "<b>Bold</b>");
	/// assert_eq!(html.to_string(), "<b>Bold</b>");
	/// ```
	pub fn new(markup: impl Into<String>) -> Self {
		Self(markup.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for HtmlString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for HtmlString {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl From<&str> for HtmlString {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl AsRef<str> for HtmlString {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl PartialEq<str> for HtmlString {
	fn eq(&self, other: &str) -> bool {
		self.0 == other
	}
}

impl PartialEq<&str> for HtmlString {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}
