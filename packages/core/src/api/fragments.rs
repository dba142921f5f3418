//! HTML fragments
//!
//! The rendered list is the only channel through which a browser-side drag
//! controller learns tree shape, so every row carries its `data-*` attributes
//! (see [`crate::drag::attributes`]). Labels and paths are HTML-escaped.

use crate::drag::attributes::{ATTR_DEPTH, ATTR_NODE_ID, ATTR_PARENT_ID, ATTR_PATH, ATTR_POSITION};
use crate::models::FlatEntry;
use crate::services::Page;
use std::fmt::Write;

/// Escape text for use in element content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render one page of the flattened tree as a `<ul>` fragment
///
/// # Examples
///
/// ```rust
/// # use deftree_core::api::fragments::render_list;
/// # use deftree_core::models::{FlatEntry, Node};
/// # use deftree_core::services::present_page;
/// let root = Node::new("1", None, 0, "Forms & Inputs");
/// let page = present_page(&[FlatEntry::from(&root)], 0, 10);
///
/// let html = render_list(&page);
/// assert!(html.contains(r#"data-node-id="1""#));
/// assert!(html.contains(r#"data-parent-id="""#));
/// assert!(html.contains("Forms &amp; Inputs"));
/// ```
pub fn render_list(page: &Page<FlatEntry>) -> String {
    let mut html = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(
        html,
        r#"<ul class="deftree-list" data-total="{}" data-offset="{}" data-next-offset="{}" data-has-more="{}">"#,
        page.total_count, page.offset, page.next_offset, page.has_more
    );

    for entry in &page.items {
        let _ = writeln!(
            html,
            r#"  <li class="deftree-node" draggable="true" {}="{}" {}="{}" {}="{}" {}="{}" {}="{}" style="--depth: {}">{}</li>"#,
            ATTR_NODE_ID,
            escape_html(&entry.id),
            ATTR_PARENT_ID,
            escape_html(entry.parent_id.as_deref().unwrap_or("")),
            ATTR_POSITION,
            entry.position,
            ATTR_PATH,
            escape_html(&entry.path),
            ATTR_DEPTH,
            entry.depth,
            entry.depth,
            escape_html(&entry.label),
        );
    }

    html.push_str("</ul>\n");
    html
}

/// Render a short notice, used for refusals
pub fn render_notice(message: &str) -> String {
    format!(
        "<div class=\"deftree-notice\" role=\"alert\">{}</div>\n",
        escape_html(message)
    )
}
