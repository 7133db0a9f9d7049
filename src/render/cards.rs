use super::{action_buttons, escape_html, status_badge, RenderPolicy};
use crate::model::Entity;

pub fn render(collection: &[Entity], policy: &RenderPolicy) -> String {
    let mut out = String::from("<div class=\"card-grid\">\n");
    for entity in collection {
        let class = if policy.row_is_muted(entity) {
            "card deleted"
        } else {
            "card"
        };
        out.push_str(&format!(
            "    <div class=\"{class}\" data-id=\"{}\">\n",
            escape_html(&entity.id())
        ));
        if let Some(image) = policy.image(entity) {
            out.push_str(&format!("        <div class=\"card-image\">{image}</div>\n"));
        }
        out.push_str("        <div class=\"card-body\">\n");

        let mut columns = policy.columns.iter();
        if let Some(title) = columns.next() {
            out.push_str(&format!(
                "            <h5 class=\"card-title\">{}</h5>\n",
                policy.cell(entity, title)
            ));
        }
        for column in columns {
            out.push_str(&format!(
                "            <p class=\"card-field\"><span class=\"card-label\">{}</span> {}</p>\n",
                escape_html(&column.header),
                policy.cell(entity, column)
            ));
        }
        if policy.soft_delete_badge {
            out.push_str(&format!(
                "            <div class=\"card-status\">{}</div>\n",
                status_badge(entity.status())
            ));
        }
        if policy.actions {
            out.push_str(&format!(
                "            <div class=\"card-actions\">{}</div>\n",
                action_buttons(entity, policy.soft_delete_badge)
            ));
        }
        out.push_str("        </div>\n    </div>\n");
    }
    out.push_str("</div>\n");
    out
}
