//! Synthetic page record handed to templates that expect one

use serde_json::{Map, Value};

use crate::fields::FieldSet;

/// A page that only exists for the duration of one error response.
///
/// Its id is the negated status code so it can never collide with a real
/// record while still being stable for template-side caching.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderPage {
    pub id: i64,
    pub kind: String,
    pub fields: FieldSet,
}

impl PlaceholderPage {
    pub fn new(code: u16, controller_kind: &str, fields: FieldSet) -> PlaceholderPage {
        PlaceholderPage {
            id: -i64::from(code),
            kind: page_kind(controller_kind),
            fields,
        }
    }

    /// `{ID, ClassName, <fields>}` for the render context
    pub fn to_context(&self) -> Value {
        let mut page = Map::new();
        page.insert(String::from("ID"), Value::from(self.id));
        page.insert(String::from("ClassName"), Value::from(self.kind.clone()));
        page.extend(self.fields.to_context());
        Value::Object(page)
    }
}

/// Page kind for a controller kind: `ErrorPageController` -> `ErrorPage`.
/// Only the last `Controller` is removed; names without it are kept whole.
pub fn page_kind(controller_kind: &str) -> String {
    match controller_kind.rfind("Controller") {
        Some(pos) => {
            let mut kind = controller_kind.to_string();
            kind.replace_range(pos..pos + "Controller".len(), "");
            kind
        }
        None => controller_kind.to_string(),
    }
}
