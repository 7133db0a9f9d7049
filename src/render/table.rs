use super::{action_buttons, escape_html, status_badge, RenderPolicy};
use crate::model::Entity;

pub fn render(collection: &[Entity], policy: &RenderPolicy) -> String {
    let mut out = String::new();
    out.push_str("<table class=\"table table-hover\">\n");
    out.push_str("    <thead>\n        <tr>\n");
    for column in &policy.columns {
        out.push_str(&format!(
            "            <th style=\"text-align: {};\">{}</th>\n",
            column.align.css(),
            escape_html(&column.header)
        ));
    }
    if policy.image.is_some() {
        out.push_str("            <th style=\"text-align: center;\">Image</th>\n");
    }
    if policy.soft_delete_badge {
        out.push_str("            <th>Status</th>\n");
    }
    if policy.actions {
        out.push_str("            <th>Actions</th>\n");
    }
    out.push_str("        </tr>\n    </thead>\n    <tbody>\n");

    for entity in collection {
        render_row(&mut out, entity, policy);
    }

    out.push_str("    </tbody>\n</table>\n");
    out
}

fn render_row(out: &mut String, entity: &Entity, policy: &RenderPolicy) {
    if policy.row_is_muted(entity) {
        out.push_str("        <tr class=\"deleted\">\n");
    } else {
        out.push_str("        <tr>\n");
    }
    for column in &policy.columns {
        out.push_str(&format!(
            "            <td style=\"text-align: {};\">{}</td>\n",
            column.align.css(),
            policy.cell(entity, column)
        ));
    }
    if let Some(image) = policy.image(entity) {
        out.push_str(&format!(
            "            <td style=\"text-align: center;\">{image}</td>\n"
        ));
    }
    if policy.soft_delete_badge {
        out.push_str(&format!(
            "            <td>{}</td>\n",
            status_badge(entity.status())
        ));
    }
    if policy.actions {
        out.push_str(&format!(
            "            <td>{}</td>\n",
            action_buttons(entity, policy.soft_delete_badge)
        ));
    }
    out.push_str("        </tr>\n");
}
