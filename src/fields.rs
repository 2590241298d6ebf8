//! Typed field values and the field sets that get merged into error pages.

use std::sync::OnceLock;

use handlebars::html_escape;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

/// A single value made available to the error page template.
///
/// Escaping is decided here rather than in the template: `Text` is escaped
/// when it enters the render context, `Html` is trusted and inserted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Html(String),
    Int(i64),
}

impl FieldValue {
    /// Value as it appears in the render context
    pub fn to_context_value(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(html_escape(s)),
            FieldValue::Html(s) => Value::String(s.clone()),
            FieldValue::Int(n) => Value::from(*n),
        }
    }

    /// Plain text version of the value: tags removed and the common
    /// entities (`&lt;`, `&gt;`, `&quot;`, `&#39;`, `&#x27;`, `&nbsp;`, `&amp;`) decoded.
    pub fn to_plain_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Html(s) => decode_entities(&filter_tags(s)),
            FieldValue::Int(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

/// Removes HTML tags from strings.
fn filter_tags(inp_string: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let filter = TAGS.get_or_init(|| Regex::new(r##"<.*?>"##).expect("tag regex is valid"));
    String::from(filter.replace_all(inp_string, ""))
}

fn decode_entities(inp_string: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;"
    inp_string
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Ordered mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(IndexMap<String, FieldValue>);

impl FieldSet {
    pub fn new() -> FieldSet {
        FieldSet(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> FieldSet {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(name.to_string(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Shallow merge: every key in `overrides` replaces the same key in
    /// `self`, keys only present in `self` are kept.
    pub fn merge(mut self, overrides: FieldSet) -> FieldSet {
        for (name, value) in overrides {
            self.0.insert(name, value);
        }
        self
    }

    /// Converts the set into a JSON object for handlebars
    pub fn to_context(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_context_value()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FieldSet(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldSet {
    type Item = (String, FieldValue);
    type IntoIter = indexmap::map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_and_defaults_survive() {
        let defaults = FieldSet::new()
            .with("Title", "Not Found")
            .with("Content", "default content")
            .with("Footer", "configured footer");
        let overrides = FieldSet::new().with("Content", "caller content");

        let merged = defaults.merge(overrides);

        assert_eq!(merged.get("Content"), Some(&FieldValue::from("caller content")));
        assert_eq!(merged.get("Footer"), Some(&FieldValue::from("configured footer")));
        assert_eq!(merged.get("Title"), Some(&FieldValue::from("Not Found")));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merge_keeps_first_insertion_order() {
        let merged = FieldSet::new()
            .with("Title", "a")
            .with("Content", "b")
            .merge(FieldSet::new().with("Extra", "c").with("Title", "d"));
        let names: Vec<&String> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["Title", "Content", "Extra"]);
    }

    #[test]
    fn text_is_escaped_html_is_not() {
        assert_eq!(
            FieldValue::from("<b>hi</b>").to_context_value(),
            Value::String("&lt;b&gt;hi&lt;/b&gt;".to_string())
        );
        assert_eq!(
            FieldValue::Html("<b>hi</b>".to_string()).to_context_value(),
            Value::String("<b>hi</b>".to_string())
        );
        assert_eq!(FieldValue::Int(404).to_context_value(), Value::from(404));
    }

    #[test]
    fn plain_text_strips_tags_from_html() {
        let html = FieldValue::Html("<p>Try the <a href=\"/\">home page</a>.</p>".to_string());
        assert_eq!(html.to_plain_text(), "Try the home page.");
        assert_eq!(FieldValue::from("a < b").to_plain_text(), "a < b");
    }

    #[test]
    fn plain_text_decodes_entities() {
        let html = FieldValue::Html("<p>Tom &amp; Co say &quot;hi&quot; &lt;3 &amp;lt;</p>".to_string());
        assert_eq!(html.to_plain_text(), "Tom & Co say \"hi\" <3 &lt;");
        // text values are taken literally
        assert_eq!(FieldValue::from("&amp;").to_plain_text(), "&amp;");
    }
}
