use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeKey, Style};
use crate::line::LineNode;
use crate::node::NodeLen;

/// A run of consecutive lines sharing one block-grouping attribute value,
/// e.g. the items of a bulleted list. Group continuity is determined purely
/// by attribute equality between adjacent lines; the document optimize pass
/// merges adjacent blocks with equal styles and drops empty ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub style: Style,
    #[serde(default)]
    pub children: Vec<LineNode>,
}

impl NodeLen for BlockNode {
    fn len(&self) -> usize {
        self.children.iter().map(|line| line.len()).sum()
    }
}

impl BlockNode {
    pub fn new(style: Style, children: Vec<LineNode>) -> Self {
        Self { style, children }
    }

    pub fn len(&self) -> usize {
        NodeLen::len(self)
    }

    pub fn block_value(&self) -> Option<&serde_json::Value> {
        self.style.get(AttributeKey::Block)
    }
}
