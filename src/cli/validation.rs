use crate::cli::args::{CliArgs, Command};
use crate::query::SortSpec;

fn check_sort(raw: Option<&str>) -> Result<(), String> {
    if let Some(raw) = raw {
        SortSpec::parse(raw).map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    Ok(())
}

fn check_resource(name: &str) -> Result<(), String> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(format!("invalid resource name '{name}'"));
    }
    Ok(())
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.base_url.as_deref() {
        reqwest::Url::parse(raw).map_err(|e| format!("invalid --base-url '{raw}': {e}"))?;
    }
    match &args.command {
        Command::List { resource, sort, .. } | Command::Search { resource, sort, .. } => {
            check_resource(resource)?;
            check_sort(sort.as_deref())?;
        }
        Command::Create { resource, fields } => {
            check_resource(resource)?;
            crate::utils::parse_field_assignments(fields)?;
        }
        Command::Edit { resource, fields, .. } => {
            check_resource(resource)?;
            if fields.is_empty() {
                return Err("edit needs at least one --field".to_string());
            }
            crate::utils::parse_field_assignments(fields)?;
        }
        Command::Delete { resource, .. } | Command::Restore { resource, .. } => {
            check_resource(resource)?;
        }
        Command::Dashboard { resources } => {
            for resource in resources {
                check_resource(resource)?;
            }
        }
        Command::Document { resource, sort, .. } => {
            check_resource(resource)?;
            check_sort(sort.as_deref())?;
        }
        Command::InitConfig => {}
    }
    Ok(())
}
