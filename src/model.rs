//! Ordered discovery model.
//!
//! Output ordering is observable, so every map in the model keeps insertion
//! order ([`indexmap::IndexMap`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered mapping of attribute or folder names to values.
pub type Model = IndexMap<String, ModelValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ModelValue>),
    Folder(Model),
}

impl ModelValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ModelValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Model> {
        match self {
            ModelValue::Folder(model) => Some(model),
            _ => None,
        }
    }

    /// String form handed to relocation handlers. Lists and folders have no
    /// meaningful path form.
    pub fn as_reference(&self) -> Option<String> {
        match self {
            ModelValue::Text(value) => Some(value.clone()),
            ModelValue::Bool(value) => Some(value.to_string()),
            ModelValue::Integer(value) => Some(value.to_string()),
            ModelValue::Float(value) => Some(value.to_string()),
            ModelValue::Null | ModelValue::List(_) | ModelValue::Folder(_) => None,
        }
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        ModelValue::Text(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        ModelValue::Text(value)
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        ModelValue::Bool(value)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        ModelValue::Integer(value)
    }
}

impl From<Model> for ModelValue {
    fn from(value: Model) -> Self {
        ModelValue::Folder(value)
    }
}

impl<T: Into<ModelValue>> From<Option<T>> for ModelValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ModelValue::Null)
    }
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Null => write!(f, "None"),
            ModelValue::Bool(value) => write!(f, "{}", value),
            ModelValue::Integer(value) => write!(f, "{}", value),
            ModelValue::Float(value) => write!(f, "{}", value),
            ModelValue::Text(value) => write!(f, "{}", value),
            ModelValue::List(values) => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            ModelValue::Folder(model) => write!(f, "{{{} entries}}", model.len()),
        }
    }
}

/// Inserts `value` under `key` only when it holds at least one entry.
///
/// Returns whether the value was inserted.
pub fn add_to_model_if_not_empty(model: &mut Model, key: &str, value: Model) -> bool {
    if value.is_empty() {
        return false;
    }
    model.insert(key.to_string(), ModelValue::Folder(value));
    true
}

/// Follows a chain of folder keys through nested models.
pub fn get_path<'a>(model: &'a Model, keys: &[&str]) -> Option<&'a ModelValue> {
    let (first, rest) = keys.split_first()?;
    let mut current = model.get(*first)?;
    for key in rest {
        current = current.as_folder()?.get(*key)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_model_if_not_empty_skips_empty() {
        let mut model = Model::new();
        assert!(!add_to_model_if_not_empty(&mut model, "Folder", Model::new()));
        assert!(model.is_empty());
    }

    #[test]
    fn test_add_to_model_if_not_empty_inserts() {
        let mut model = Model::new();
        let mut child = Model::new();
        child.insert("Name".to_string(), "value".into());

        assert!(add_to_model_if_not_empty(&mut model, "Folder", child));
        assert_eq!(
            get_path(&model, &["Folder", "Name"]),
            Some(&ModelValue::Text("value".to_string()))
        );
    }

    #[test]
    fn test_insertion_order_preserved_in_json() {
        let mut model = Model::new();
        model.insert("Zeta".to_string(), 1i64.into());
        model.insert("Alpha".to_string(), true.into());
        model.insert("Middle".to_string(), ModelValue::Null);

        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"Zeta":1,"Alpha":true,"Middle":null}"#);
    }

    #[test]
    fn test_deserialize_untagged_values() {
        let model: Model =
            serde_yaml::from_str("Name: a\nPort: 7574\nEnabled: false\nHosts: [h1, h2]\nSub:\n  Key: v\n")
                .unwrap();

        assert_eq!(model["Name"], ModelValue::Text("a".to_string()));
        assert_eq!(model["Port"], ModelValue::Integer(7574));
        assert_eq!(model["Enabled"], ModelValue::Bool(false));
        assert!(matches!(model["Hosts"], ModelValue::List(ref hosts) if hosts.len() == 2));
        assert!(model["Sub"].as_folder().is_some());
    }

    #[test]
    fn test_as_reference() {
        assert_eq!(ModelValue::from("/tmp/a.xml").as_reference().as_deref(), Some("/tmp/a.xml"));
        assert_eq!(ModelValue::Integer(3).as_reference().as_deref(), Some("3"));
        assert_eq!(ModelValue::Null.as_reference(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(ModelValue::from(None::<String>), ModelValue::Null);
        assert_eq!(ModelValue::from(Some("x")), ModelValue::Text("x".to_string()));
    }
}
