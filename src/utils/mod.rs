use serde_json::{Map, Value};

pub fn parse_field_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("empty field name".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn parse_field_assignments(values: &[String]) -> Result<Map<String, Value>, String> {
    let mut out = Map::new();
    for raw in values {
        let (key, value) =
            parse_field_assignment(raw).map_err(|e| format!("invalid --field '{raw}': {e}"))?;
        if out.insert(key.clone(), Value::String(value)).is_some() {
            return Err(format!("field '{key}' given more than once"));
        }
    }
    Ok(out)
}

pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
