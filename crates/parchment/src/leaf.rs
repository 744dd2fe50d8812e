use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeScope, Style};
use crate::delta::Embed;
use crate::node::{NodeLen, byte_of_char};

/// Object replacement character, the plain-text stand-in for an embed.
pub const EMBED_PLACEHOLDER: char = '\u{fffc}';

/// The smallest addressable units of content inside a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum LeafNode {
    Text(TextNode),
    Embed(EmbedNode),
}

impl LeafNode {
    pub fn style(&self) -> &Style {
        match self {
            LeafNode::Text(text) => &text.style,
            LeafNode::Embed(embed) => &embed.style,
        }
    }

    /// Merges an inline-scoped style into this leaf's style.
    pub fn apply_style(&mut self, style: &Style) {
        debug_assert!(style.scope_is(AttributeScope::Inline));
        match self {
            LeafNode::Text(text) => text.style.merge_all(style),
            LeafNode::Embed(embed) => embed.style.merge_all(style),
        }
    }

    pub fn plain_text(&self, out: &mut String) {
        match self {
            LeafNode::Text(text) => out.push_str(&text.text),
            LeafNode::Embed(_) => out.push(EMBED_PLACEHOLDER),
        }
    }
}

impl NodeLen for LeafNode {
    fn len(&self) -> usize {
        match self {
            LeafNode::Text(text) => text.len(),
            LeafNode::Embed(_) => 1,
        }
    }
}

/// A run of text sharing one inline style. Splittable at any character
/// boundary; adjacent runs with equal styles merge back together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
}

impl TextNode {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Splits off the tail starting at `char_ix`, keeping the style.
    pub fn split_off(&mut self, char_ix: usize) -> TextNode {
        let at = byte_of_char(&self.text, char_ix);
        TextNode {
            text: self.text.split_off(at),
            style: self.style.clone(),
        }
    }
}

/// An atomic embedded object. Length 1, never splits, never merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedNode {
    pub embed: Embed,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
}

impl EmbedNode {
    pub fn new(embed: Embed, style: Style) -> Self {
        Self { embed, style }
    }
}
