pub mod cards;
pub mod format;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::error::Failure;
use crate::model::{Entity, EntityStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Table,
    Cards,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    #[default]
    Text,
    Currency,
    Badge,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

fn default_fallback() -> String {
    "N/A".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Column {
    pub header: String,
    pub field: String,
    #[serde(default)]
    pub format: ColumnFormat,
    #[serde(default)]
    pub align: Align,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

impl Column {
    pub fn new(header: &str, field: &str) -> Self {
        Self {
            header: header.to_string(),
            field: field.to_string(),
            format: ColumnFormat::Text,
            align: Align::Left,
            fallback: default_fallback(),
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn format(mut self, format: ColumnFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Truncate {
    pub field: String,
    pub max_length: usize,
}

fn default_alt_field() -> String {
    "title".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImagePolicy {
    pub field: String,
    pub fallback_text: String,
    #[serde(default = "default_alt_field")]
    pub alt_field: String,
}

fn default_empty_message() -> String {
    "No records found.".to_string()
}

fn default_error_title() -> String {
    "Could not load data!".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderPolicy {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub soft_delete_badge: bool,
    #[serde(default)]
    pub truncate: Option<Truncate>,
    #[serde(default)]
    pub image: Option<ImagePolicy>,
    #[serde(default)]
    pub actions: bool,
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
    #[serde(default = "default_error_title")]
    pub error_title: String,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            layout: Layout::Table,
            columns: Vec::new(),
            soft_delete_badge: false,
            truncate: None,
            image: None,
            actions: false,
            empty_message: default_empty_message(),
            error_title: default_error_title(),
        }
    }
}

impl RenderPolicy {
    pub fn posts() -> Self {
        Self {
            columns: vec![
                Column::new("ID", "id"),
                Column::new("Title", "title"),
                Column::new("Views", "views"),
            ],
            soft_delete_badge: true,
            actions: true,
            ..Default::default()
        }
    }

    pub fn comments() -> Self {
        Self {
            columns: vec![
                Column::new("ID", "id"),
                Column::new("Text", "text"),
                Column::new("Post ID", "postId"),
            ],
            soft_delete_badge: true,
            actions: true,
            ..Default::default()
        }
    }

    pub fn products() -> Self {
        Self {
            columns: vec![
                Column::new("ID", "id"),
                Column::new("Product", "title"),
                Column::new("Category", "category.name").align(Align::Center),
                Column::new("Price", "price")
                    .format(ColumnFormat::Currency)
                    .align(Align::Right),
                Column::new("Description", "description"),
            ],
            truncate: Some(Truncate {
                field: "description".to_string(),
                max_length: 50,
            }),
            image: Some(ImagePolicy {
                field: "images.0".to_string(),
                fallback_text: "No image".to_string(),
                alt_field: default_alt_field(),
            }),
            empty_message: "No products found.".to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn cell(&self, entity: &Entity, column: &Column) -> String {
        let raw = match column.format {
            ColumnFormat::Currency => Some(format::currency(entity.lookup(&column.field))),
            ColumnFormat::Text | ColumnFormat::Badge => entity.text(&column.field),
        };
        let mut text = raw
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| column.fallback.clone());
        if let Some(truncate) = self.truncate.as_ref().filter(|t| t.field == column.field) {
            text = format::truncate(&text, truncate.max_length);
        }
        match column.format {
            ColumnFormat::Badge => format!(
                r#"<span class="badge bg-secondary">{}</span>"#,
                escape_html(&text)
            ),
            _ => escape_html(&text),
        }
    }

    pub(crate) fn row_is_muted(&self, entity: &Entity) -> bool {
        self.soft_delete_badge && entity.is_deleted()
    }

    pub(crate) fn image(&self, entity: &Entity) -> Option<String> {
        let policy = self.image.as_ref()?;
        let markup = match entity.text(&policy.field).filter(|u| is_safe_image_url(u)) {
            Some(url) => format!(
                r#"<img src="{}" alt="{}" class="thumb">"#,
                escape_html(&url),
                escape_html(&entity.text(&policy.alt_field).unwrap_or_default())
            ),
            None => format!(
                r#"<span class="no-image">{}</span>"#,
                escape_html(&policy.fallback_text)
            ),
        };
        Some(markup)
    }
}

// http, https or relative; anything else renders the fallback
fn is_safe_image_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return false;
    }
    let Ok(base) = reqwest::Url::parse("http://localhost/") else {
        return false;
    };
    base.join(raw)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

pub(crate) fn status_badge(status: EntityStatus) -> String {
    let class = match status {
        EntityStatus::Active => "bg-success",
        EntityStatus::Deleted => "bg-danger",
    };
    format!(r#"<span class="badge {class}">{}</span>"#, status.label())
}

pub(crate) fn action_buttons(entity: &Entity, soft_delete: bool) -> String {
    let id = escape_html(&entity.id());
    let mut out = format!(
        r#"<button class="btn btn-sm btn-warning" data-action="edit" data-id="{id}">Edit</button>"#
    );
    if soft_delete {
        out.push(' ');
        if entity.is_deleted() {
            out.push_str(&format!(
                r#"<button class="btn btn-sm btn-info" data-action="restore" data-id="{id}">Restore</button>"#
            ));
        } else {
            out.push_str(&format!(
                r#"<button class="btn btn-sm btn-danger" data-action="delete" data-id="{id}">Delete</button>"#
            ));
        }
    }
    out
}

pub fn render(collection: &[Entity], policy: &RenderPolicy) -> String {
    if collection.is_empty() {
        return render_empty(policy);
    }
    match policy.layout {
        Layout::Table => table::render(collection, policy),
        Layout::Cards => cards::render(collection, policy),
    }
}

pub fn render_empty(policy: &RenderPolicy) -> String {
    format!(
        r#"<div class="no-data">{}</div>"#,
        escape_html(&policy.empty_message)
    )
}

pub fn render_error(failure: &Failure, policy: &RenderPolicy) -> String {
    format!(
        "<div class=\"error\">\n    <strong>{}</strong><br>\n    <small>{}</small>\n</div>\n",
        escape_html(&policy.error_title),
        escape_html(&failure.to_string())
    )
}

pub fn render_count(shown: usize, total: usize) -> String {
    format!(r#"<span class="result-count">{shown} / {total}</span>"#)
}
