// ABOUTME: HTML renderer emitting absolutely-positioned divs from solved layouts

use crate::layout::{BoxItem, LayoutNode};
use crate::solver::ConstraintSystem;

const DOCUMENT_TOP: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>Layout</title>\n</head>\n<body>\n";
const DOCUMENT_BOTTOM: &str = "\n</body>\n</html>\n";

/// Renders one layout entity. Boxes become a styled div at their solved
/// position; groups wrap their children's HTML in order. Rendering only reads
/// solver values; it never adds constraints.
pub fn render_node(node: &LayoutNode, cs: &mut ConstraintSystem) -> String {
    match node {
        LayoutNode::Box(item) => render_box(item, cs),
        LayoutNode::Group(group) => {
            let mut html = String::from("<div>");
            for child in &group.children {
                html.push_str(&render_node(child, cs));
            }
            html.push_str("</div>");
            html
        }
    }
}

fn render_box(item: &BoxItem, cs: &mut ConstraintSystem) -> String {
    let top = item.frame.top(cs);
    let left = item.frame.left_edge(cs);
    let width = item.frame.right_edge(cs) - left;
    let height = item.frame.bottom(cs) - top;

    format!(
        "<div style=\"border: solid grey 1px;position: absolute;top: {:.0}px;left: {:.0}px;width: {:.0}px;height: {:.0}px;\">BOX {}</div>",
        top, left, width, height, item.id
    )
}

/// Wraps rendered divs in the minimal HTML5 document shell
pub fn document(body: &str) -> String {
    format!("{}{}{}", DOCUMENT_TOP, body, DOCUMENT_BOTTOM)
}
