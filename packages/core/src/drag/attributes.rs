//! Rendered node attributes
//!
//! The drag controller learns tree shape only from the `data-*` attributes
//! each rendered `<li>` carries:
//!
//! | Attribute | Meaning |
//! |---|---|
//! | `data-node-id` | node id |
//! | `data-parent-id` | parent id, empty for a root |
//! | `data-position` | 0-based sibling position |
//! | `data-path` | materialized path |
//!
//! `data-depth` is also rendered, for indentation only, and is not read back.

use crate::models::{is_valid_node_id, FlatEntry, PATH_DELIMITER};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const ATTR_NODE_ID: &str = "data-node-id";
pub const ATTR_PARENT_ID: &str = "data-parent-id";
pub const ATTR_POSITION: &str = "data-position";
pub const ATTR_PATH: &str = "data-path";
pub const ATTR_DEPTH: &str = "data-depth";

/// Attribute parsing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("Missing attribute {0}")]
    Missing(&'static str),

    #[error("Attribute {attribute} has invalid id {value:?}")]
    InvalidId {
        attribute: &'static str,
        value: String,
    },

    #[error("Attribute data-position is not a position: {0:?}")]
    InvalidPosition(String),

    #[error("Path {path:?} does not end in node id {id:?}")]
    PathMismatch { id: String, path: String },
}

/// Tree shape of one rendered row, as read from its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: u32,
    pub path: String,
}

impl RenderedNode {
    /// Parse from an attribute lookup
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use deftree_core::drag::RenderedNode;
    /// # use std::collections::HashMap;
    /// let attrs = HashMap::from([
    ///     ("data-node-id", "2"),
    ///     ("data-parent-id", ""),
    ///     ("data-position", "1"),
    ///     ("data-path", "2"),
    /// ]);
    /// let node = RenderedNode::from_attributes(|name| attrs.get(name).copied()).unwrap();
    /// assert!(node.parent_id.is_none());
    /// assert_eq!(node.position, 1);
    /// ```
    pub fn from_attributes<'a, F>(lookup: F) -> Result<Self, AttributeError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let require = |name: &'static str| lookup(name).ok_or(AttributeError::Missing(name));

        let id = require(ATTR_NODE_ID)?.trim();
        if !is_valid_node_id(id) {
            return Err(AttributeError::InvalidId {
                attribute: ATTR_NODE_ID,
                value: id.to_string(),
            });
        }

        let parent_id = match require(ATTR_PARENT_ID)?.trim() {
            "" => None,
            parent if is_valid_node_id(parent) => Some(parent.to_string()),
            parent => {
                return Err(AttributeError::InvalidId {
                    attribute: ATTR_PARENT_ID,
                    value: parent.to_string(),
                })
            }
        };

        let raw_position = require(ATTR_POSITION)?.trim();
        let position = raw_position
            .parse::<u32>()
            .map_err(|_| AttributeError::InvalidPosition(raw_position.to_string()))?;

        let path = require(ATTR_PATH)?.trim();
        if path.rsplit(PATH_DELIMITER).next() != Some(id) {
            return Err(AttributeError::PathMismatch {
                id: id.to_string(),
                path: path.to_string(),
            });
        }

        Ok(Self {
            id: id.to_string(),
            parent_id,
            position,
            path: path.to_string(),
        })
    }
}

impl From<&FlatEntry> for RenderedNode {
    fn from(entry: &FlatEntry) -> Self {
        Self {
            id: entry.id.clone(),
            parent_id: entry.parent_id.clone(),
            position: entry.position,
            path: entry.path.clone(),
        }
    }
}

fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Read every `<li data-node-id=...>` row of a rendered list fragment
///
/// Only double-quoted attribute values are recognized, which is what the
/// list fragment emits.
pub fn parse_list_items(html: &str) -> Result<Vec<RenderedNode>, AttributeError> {
    static LI_TAG: OnceLock<Regex> = OnceLock::new();
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();

    let li_tag = LI_TAG
        .get_or_init(|| Regex::new(r"<li\s([^>]*)>").expect("li tag pattern is a valid regex"));
    let attribute = ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)="([^"]*)""#)
            .expect("attribute pattern is a valid regex")
    });

    li_tag
        .captures_iter(html)
        .filter(|tag| tag[1].contains(ATTR_NODE_ID))
        .map(|tag| {
            let attrs: Vec<(String, String)> = attribute
                .captures_iter(&tag[1])
                .map(|attr| (attr[1].to_string(), unescape_attribute(&attr[2])))
                .collect();
            RenderedNode::from_attributes(|name| {
                attrs
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            })
        })
        .collect()
}
