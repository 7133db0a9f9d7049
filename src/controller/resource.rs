use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_SEARCH_FIELD;
use crate::render::{Column, RenderPolicy};

fn default_search_field() -> String {
    DEFAULT_SEARCH_FIELD.to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceSpec {
    #[serde(default = "default_search_field")]
    pub search_field: String,
    /// Fields that must be non-blank on create.
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub editable: Vec<String>,
    #[serde(default)]
    pub view: RenderPolicy,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            search_field: default_search_field(),
            required: Vec::new(),
            editable: Vec::new(),
            view: RenderPolicy {
                columns: vec![Column::new("ID", "id"), Column::new("Title", "title")],
                soft_delete_badge: true,
                actions: true,
                ..Default::default()
            },
        }
    }
}

impl ResourceSpec {
    pub fn posts() -> Self {
        Self {
            search_field: "title".to_string(),
            required: vec!["title".to_string(), "views".to_string()],
            editable: vec!["title".to_string(), "views".to_string()],
            view: RenderPolicy::posts(),
        }
    }

    pub fn comments() -> Self {
        Self {
            search_field: "text".to_string(),
            required: vec!["text".to_string(), "postId".to_string()],
            editable: vec!["text".to_string()],
            view: RenderPolicy::comments(),
        }
    }

    pub fn products() -> Self {
        Self {
            search_field: "title".to_string(),
            required: vec!["title".to_string()],
            editable: Vec::new(),
            view: RenderPolicy::products(),
        }
    }
}

pub fn builtin_resources() -> HashMap<String, ResourceSpec> {
    HashMap::from([
        ("posts".to_string(), ResourceSpec::posts()),
        ("comments".to_string(), ResourceSpec::comments()),
        ("products".to_string(), ResourceSpec::products()),
    ])
}
