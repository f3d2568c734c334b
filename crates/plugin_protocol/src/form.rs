//! Declarative configuration forms.
//!
//! Plugins never render widgets themselves. They describe the settings they
//! accept as a [`ConfigForm`], an ordered list of [`FormElement`]s, and the
//! host turns that into whatever UI it has (an admin page, a CLI prompt, a
//! JSON document).
//!
//! ```rust
//! use vizkit_plugin_protocol::{ConfigForm, FormElement};
//!
//! let mut form = ConfigForm::new();
//! form.push(FormElement::text_area("labels", "Labels").with_description("One original|new pair per line"));
//!
//! assert_eq!(form.get("labels").map(|e| e.title.as_str()), Some("Labels"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Widget type of a form element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormElementKind {
    /// Single line of text.
    TextField,
    /// Multi-line text.
    TextArea,
    /// One value out of [`FormElement::options`].
    Select,
    /// Any number of values out of [`FormElement::options`].
    Checkboxes,
}

/// One configurable setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    /// Configuration key the value is stored under. Nested keys use `.`.
    pub key: String,
    pub kind: FormElementKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values for selects and checkboxes, `value -> label`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub default: JsonValue,
}

impl FormElement {
    fn new(key: impl Into<String>, kind: FormElementKind, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            title: title.into(),
            description: None,
            options: IndexMap::new(),
            default: JsonValue::Null,
        }
    }

    #[must_use]
    pub fn text_field(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(key, FormElementKind::TextField, title)
    }

    #[must_use]
    pub fn text_area(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(key, FormElementKind::TextArea, title)
    }

    #[must_use]
    pub fn select(
        key: impl Into<String>,
        title: impl Into<String>,
        options: IndexMap<String, String>,
    ) -> Self {
        Self {
            options,
            ..Self::new(key, FormElementKind::Select, title)
        }
    }

    #[must_use]
    pub fn checkboxes(
        key: impl Into<String>,
        title: impl Into<String>,
        options: IndexMap<String, String>,
    ) -> Self {
        Self {
            options,
            ..Self::new(key, FormElementKind::Checkboxes, title)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Self {
        self.default = default.into();
        self
    }
}

/// Ordered collection of form elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigForm {
    elements: Vec<FormElement>,
}

impl ConfigForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: FormElement) {
        self.elements.push(element);
    }

    /// Append every element of `other`, keeping its order.
    pub fn extend(&mut self, other: ConfigForm) {
        self.elements.extend(other.elements);
    }

    /// Look up an element by its configuration key.
    pub fn get(&self, key: &str) -> Option<&FormElement> {
        self.elements.iter().find(|element| element.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_a_plain_list() {
        let mut options = IndexMap::new();
        options.insert("a".to_string(), "Alpha".to_string());

        let mut form = ConfigForm::new();
        form.push(FormElement::checkboxes("fields", "Fields", options).with_default(json!([])));
        form.push(FormElement::text_field("q", "Query"));

        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(
            value,
            json!([
                {"key": "fields", "kind": "checkboxes", "title": "Fields", "options": {"a": "Alpha"}, "default": []},
                {"key": "q", "kind": "text_field", "title": "Query"}
            ])
        );
    }

    #[test]
    fn extend_keeps_order() {
        let mut first = ConfigForm::new();
        first.push(FormElement::text_field("one", "One"));
        let mut second = ConfigForm::new();
        second.push(FormElement::text_area("two", "Two"));

        first.extend(second);

        let keys: Vec<_> = first.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["one", "two"]);
        assert_eq!(first.len(), 2);
    }
}
