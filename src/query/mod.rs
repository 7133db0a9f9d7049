pub mod collate;

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::model::{Collection, Entity};
use collate::CollationKey;

pub const DEFAULT_SEARCH_FIELD: &str = "title";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKind {
    Text,
    Numeric,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub kind: SortKind,
}

impl SortKey {
    pub fn text(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: SortKind::Text,
        }
    }

    pub fn numeric(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: SortKind::Numeric,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Accepts `field[:asc|desc[:text|numeric]]` and the preset names
    /// `nameAsc`, `nameDesc`, `priceAsc`, `priceDesc`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        match value {
            "nameAsc" => return Ok(Self::new(SortKey::text("title"), SortDirection::Asc)),
            "nameDesc" => return Ok(Self::new(SortKey::text("title"), SortDirection::Desc)),
            "priceAsc" => return Ok(Self::new(SortKey::numeric("price"), SortDirection::Asc)),
            "priceDesc" => return Ok(Self::new(SortKey::numeric("price"), SortDirection::Desc)),
            _ => {}
        }

        let mut parts = value.split(':').map(str::trim);
        let field = parts
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| "empty sort field".to_string())?;
        let direction = match parts.next().map(str::to_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => return Err(format!("unknown sort direction '{other}'")),
        };
        let kind = match parts.next().map(str::to_lowercase).as_deref() {
            None | Some("text") => SortKind::Text,
            Some("numeric") | Some("number") => SortKind::Numeric,
            Some(other) => return Err(format!("unknown sort kind '{other}'")),
        };
        if parts.next().is_some() {
            return Err(format!("too many sort segments in '{value}'"));
        }
        Ok(Self::new(
            SortKey {
                field: field.to_string(),
                kind,
            },
            direction,
        ))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        let kind = match self.key.kind {
            SortKind::Text => "text",
            SortKind::Numeric => "numeric",
        };
        write!(f, "{}:{}:{}", self.key.field, direction, kind)
    }
}

pub fn numeric_value(entity: &Entity, field: &str) -> f64 {
    let n = match entity.lookup(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

enum SortValue {
    Text(CollationKey),
    Numeric(f64),
}

impl SortValue {
    fn of(entity: &Entity, key: &SortKey) -> Self {
        match key.kind {
            SortKind::Text => Self::Text(CollationKey::new(
                &entity.text(&key.field).unwrap_or_default(),
            )),
            SortKind::Numeric => Self::Numeric(numeric_value(entity, &key.field)),
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Numeric(a), Self::Numeric(b)) => a.total_cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Clone, Debug)]
pub struct QueryEngine {
    search_field: String,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_FIELD)
    }
}

impl QueryEngine {
    pub fn new(search_field: &str) -> Self {
        Self {
            search_field: search_field.to_string(),
        }
    }

    pub fn search(&self, collection: &[Entity], keyword: &str) -> Collection {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return collection.to_vec();
        }
        collection
            .iter()
            .filter(|entity| {
                entity
                    .text(&self.search_field)
                    .is_some_and(|text| text.to_lowercase().contains(&keyword))
            })
            .cloned()
            .collect()
    }

    pub fn sort(&self, collection: &[Entity], key: &SortKey, direction: SortDirection) -> Collection {
        let mut keyed: Vec<(SortValue, &Entity)> = collection
            .iter()
            .map(|entity| (SortValue::of(entity, key), entity))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        });
        keyed.into_iter().map(|(_, entity)| entity.clone()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub filtered: Collection,
    pub active_sort: Option<SortSpec>,
    pub keyword: String,
}

impl ViewState {
    pub fn full(collection: &[Entity]) -> Self {
        Self {
            filtered: collection.to_vec(),
            active_sort: None,
            keyword: String::new(),
        }
    }

    pub fn apply_search(&mut self, engine: &QueryEngine, source: &[Entity], keyword: &str) {
        self.filtered = engine.search(source, keyword);
        self.keyword = keyword.trim().to_string();
        self.active_sort = None;
    }

    pub fn apply_sort(&mut self, engine: &QueryEngine, spec: SortSpec) {
        self.filtered = engine.sort(&self.filtered, &spec.key, spec.direction);
        self.active_sort = Some(spec);
    }
}
