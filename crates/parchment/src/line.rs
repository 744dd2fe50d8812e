use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeScope, Style, StyleIntersection};
use crate::delta::Embed;
use crate::leaf::{EmbedNode, LeafNode, TextNode};
use crate::node::{self, NodeLen};

/// One paragraph: an ordered run of leaves terminated by an implicit
/// line separator of length 1. The separator is the sole carrier of the
/// line-scoped style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineNode {
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<LeafNode>,
}

impl NodeLen for LineNode {
    fn len(&self) -> usize {
        self.text_len() + 1
    }
}

impl LineNode {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            children: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        NodeLen::len(self)
    }

    /// Length of the leaf content, excluding the separator.
    pub fn text_len(&self) -> usize {
        self.children.iter().map(|leaf| leaf.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Inserts separator-free text at `index`. Line and block attributes are
    /// untouched; only the separator can carry them.
    pub fn insert_text(&mut self, index: usize, text: &str, style: &Style) {
        debug_assert!(!text.contains('\n'));
        debug_assert!(index <= self.text_len());
        if text.is_empty() {
            return;
        }
        let at = self.split_leaf(index);
        self.children
            .insert(at, LeafNode::Text(TextNode::new(text, style.inline_only())));
        self.optimize();
    }

    /// Inserts an embed at `index`. Mixed embed and text content is tolerated
    /// structurally; block-embed exclusivity is a higher layer's concern.
    pub fn insert_embed(&mut self, index: usize, embed: Embed, style: &Style) {
        debug_assert!(index <= self.text_len());
        let at = self.split_leaf(index);
        self.children
            .insert(at, LeafNode::Embed(EmbedNode::new(embed, style.inline_only())));
    }

    /// Splits this line at `index`, returning a new line with the same style
    /// that receives every leaf at or after the split point. Total content
    /// length is preserved exactly; the caller links the new line after this
    /// one.
    pub fn split_at(&mut self, index: usize) -> LineNode {
        debug_assert!(index < self.len());
        let at = self.split_leaf(index);
        LineNode {
            style: self.style.clone(),
            children: self.children.split_off(at),
        }
    }

    /// Applies an inline style to the leaves covering `[index, index+len)`.
    /// The range is clamped to the leaf content; the separator cannot carry
    /// inline formatting.
    pub fn retain_inline(&mut self, index: usize, len: usize, style: &Style) {
        debug_assert!(style.scope_is(AttributeScope::Inline));
        let end = (index + len).min(self.text_len());
        if index >= end {
            return;
        }
        let first = self.split_leaf(index);
        let last = self.split_leaf(end);
        for leaf in &mut self.children[first..last] {
            leaf.apply_style(style);
        }
        self.optimize();
    }

    /// Removes the leaf content in `[index, index+len)`. The separator is
    /// never part of the range here; separator deletion is a line merge and
    /// is handled by the document.
    pub fn delete_interior(&mut self, index: usize, len: usize) {
        let end = (index + len).min(self.text_len());
        if index >= end {
            return;
        }
        let first = self.split_leaf(index);
        let last = self.split_leaf(end);
        self.children.drain(first..last);
        self.optimize();
    }

    pub(crate) fn collect_inline(&self, index: usize, len: usize, acc: &mut StyleIntersection) {
        let end = (index + len).min(self.text_len());
        if index >= end {
            return;
        }
        let mut offset = 0;
        for leaf in &self.children {
            let leaf_end = offset + leaf.len();
            if leaf_end > index && offset < end {
                acc.intersect(leaf.style());
            }
            offset = leaf_end;
            if offset >= end {
                break;
            }
        }
    }

    /// Merges adjacent text runs with equal styles and drops empty ones.
    pub fn optimize(&mut self) {
        self.children.retain(|leaf| match leaf {
            LeafNode::Text(text) => !text.text.is_empty(),
            LeafNode::Embed(_) => true,
        });
        let mut ix = 1;
        while ix < self.children.len() {
            let merge = matches!(
                (&self.children[ix - 1], &self.children[ix]),
                (LeafNode::Text(a), LeafNode::Text(b)) if a.style == b.style
            );
            if merge {
                let LeafNode::Text(next) = self.children.remove(ix) else {
                    unreachable!();
                };
                let LeafNode::Text(prev) = &mut self.children[ix - 1] else {
                    unreachable!();
                };
                prev.text.push_str(&next.text);
            } else {
                ix += 1;
            }
        }
    }

    pub fn plain_text(&self, out: &mut String) {
        for leaf in &self.children {
            leaf.plain_text(out);
        }
        out.push('\n');
    }

    /// Ensures a leaf boundary at character offset `index` and returns the
    /// child index of that boundary, splitting a straddling text run.
    fn split_leaf(&mut self, index: usize) -> usize {
        let Some((ix, local)) = node::lookup(&self.children, index, true) else {
            debug_assert_eq!(index, 0);
            return 0;
        };
        if local == 0 {
            return ix;
        }
        if local == self.children[ix].len() {
            return ix + 1;
        }
        let LeafNode::Text(text) = &mut self.children[ix] else {
            // Embeds are length 1; an interior offset cannot land inside one.
            unreachable!("embed nodes cannot be split");
        };
        let tail = text.split_off(local);
        self.children.insert(ix + 1, LeafNode::Text(tail));
        ix + 1
    }
}
