//! YAML configuration for error pages.
//!
//! ```yaml
//! default_controller: ErrorPageController
//! default_template: [ErrorPage]
//! custom_fields:
//!   default:
//!     Content: "Something went wrong."
//!   e404:
//!     Title: "Page not found"
//!     Content:
//!       Type: HTMLText
//!       Value: "<p>Try the <a href=\"/\">home page</a>.</p>"
//! ```

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

use crate::error::{ErrorPageError, Result};
use crate::fields::{FieldSet, FieldValue};

/// Name of the generic fallback bucket in `custom_fields`
pub const DEFAULT_BUCKET: &str = "default";

/// Field name -> configured value, for one bucket
pub type FieldBucket = IndexMap<String, ConfiguredField>;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorPagesConfig {
    #[serde(default)]
    pub custom_fields: IndexMap<String, FieldBucket>,
    #[serde(default = "default_controller")]
    pub default_controller: String,
    #[serde(default)]
    pub default_template: TemplateList,
}

fn default_controller() -> String {
    String::from("PageController")
}

impl Default for ErrorPagesConfig {
    fn default() -> Self {
        ErrorPagesConfig {
            custom_fields: IndexMap::new(),
            default_controller: default_controller(),
            default_template: TemplateList::default(),
        }
    }
}

/// `default_template` may be a single name or an ordered list of names
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TemplateList {
    One(String),
    Many(Vec<String>),
}

impl Default for TemplateList {
    fn default() -> Self {
        TemplateList::Many(Vec::new())
    }
}

impl TemplateList {
    /// Configured names in order, blanks skipped
    pub fn names(&self) -> Vec<&str> {
        let names: Vec<&str> = match self {
            TemplateList::One(name) => vec![name.as_str()],
            TemplateList::Many(names) => names.iter().map(String::as_str).collect(),
        };
        names
            .into_iter()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect()
    }
}

/// A configured field: either a plain scalar or a `{Type, Value}` pair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ConfiguredField {
    Typed {
        #[serde(rename = "Type")]
        kind: String,
        #[serde(rename = "Value")]
        value: YamlValue,
    },
    Plain(YamlValue),
}

/// Supported field types for `{Type, Value}` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Html,
    Int,
}

impl FromStr for FieldKind {
    type Err = ErrorPageError;

    fn from_str(s: &str) -> Result<FieldKind> {
        match s {
            "Text" | "Varchar" => Ok(FieldKind::Text),
            "HTMLText" | "HTMLVarchar" | "HTMLFragment" => Ok(FieldKind::Html),
            "Int" => Ok(FieldKind::Int),
            other => Err(ErrorPageError::InvalidConfig(format!(
                "unsupported field type {}",
                other
            ))),
        }
    }
}

/// Renders a YAML scalar as text, rejecting sequences and mappings
fn scalar_to_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Null => Some(String::new()),
        _ => None,
    }
}

impl ConfiguredField {
    /// Builds the typed value this entry describes
    pub fn to_field_value(&self, name: &str) -> Result<FieldValue> {
        let not_scalar = || {
            ErrorPageError::InvalidConfig(format!(
                "field {} must be a scalar or a {{Type, Value}} pair",
                name
            ))
        };
        match self {
            ConfiguredField::Plain(value) => {
                scalar_to_string(value).map(FieldValue::Text).ok_or_else(not_scalar)
            }
            ConfiguredField::Typed { kind, value } => {
                let raw = scalar_to_string(value).ok_or_else(not_scalar)?;
                match kind.parse::<FieldKind>()? {
                    FieldKind::Text => Ok(FieldValue::Text(raw)),
                    FieldKind::Html => Ok(FieldValue::Html(raw)),
                    FieldKind::Int => raw.trim().parse::<i64>().map(FieldValue::Int).map_err(|_| {
                        ErrorPageError::InvalidConfig(format!(
                            "field {} has type Int but value {:?} is not an integer",
                            name, raw
                        ))
                    }),
                }
            }
        }
    }
}

/// Configuration key for a status code's bucket
pub fn bucket_key(code: u16) -> String {
    format!("e{}", code)
}

impl ErrorPagesConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<ErrorPagesConfig> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Whether `custom_fields` has a bucket for exactly this code
    pub fn has_code_bucket(&self, code: u16) -> bool {
        self.custom_fields.contains_key(&bucket_key(code))
    }

    /// Bucket for the code, falling back to the `default` bucket
    pub fn bucket_for(&self, code: u16) -> Option<(&str, &FieldBucket)> {
        self.custom_fields
            .get_key_value(&bucket_key(code))
            .or_else(|| self.custom_fields.get_key_value(DEFAULT_BUCKET))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Checks everything that would otherwise only fail while a request is
    /// being answered.
    pub fn validate(&self) -> Result<()> {
        if !self.custom_fields.contains_key(DEFAULT_BUCKET) {
            return Err(ErrorPageError::InvalidConfig(format!(
                "custom_fields needs a {} bucket",
                DEFAULT_BUCKET
            )));
        }
        for (key, bucket) in &self.custom_fields {
            if key != DEFAULT_BUCKET {
                let code_ok = key
                    .strip_prefix('e')
                    .and_then(|c| c.parse::<u16>().ok())
                    .map_or(false, |c| (100..=999).contains(&c) && *key == bucket_key(c));
                if !code_ok {
                    return Err(ErrorPageError::InvalidConfig(format!(
                        "custom_fields key {} is neither {} nor e<status code>",
                        key, DEFAULT_BUCKET
                    )));
                }
            }
            for (name, field) in bucket {
                field.to_field_value(name)?;
            }
        }
        if self.default_controller.trim().is_empty() {
            return Err(ErrorPageError::InvalidConfig(String::from(
                "default_controller is empty",
            )));
        }
        Ok(())
    }

    /// Fields configured for the code, with typed entries constructed
    pub fn resolve_fields(&self, code: u16) -> Result<FieldSet> {
        let (key, bucket) = self
            .bucket_for(code)
            .ok_or(ErrorPageError::ConfigurationMissing { code })?;
        log::debug!("Using custom_fields.{} for {}", key, code);
        bucket
            .iter()
            .map(|(name, field)| field.to_field_value(name).map(|value| (name.as_str(), value)))
            .collect()
    }
}
