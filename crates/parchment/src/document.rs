use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::{Attribute, AttributeKey, AttributeScope, Style, StyleIntersection};
use crate::block::BlockNode;
use crate::delta::{Delta, Embed, Insertable, Op};
use crate::line::LineNode;
use crate::node::{self, NodeLen};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("operation at offset {offset} (length {len}) exceeds document bounds")]
    OutOfBounds { offset: usize, len: usize },
    #[error("invalid document delta: {0}")]
    InvalidDocument(&'static str),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// A direct child of the document: a standalone line, or a block grouping
/// consecutive lines that share a block attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum DocNode {
    Line(LineNode),
    Block(BlockNode),
}

impl NodeLen for DocNode {
    fn len(&self) -> usize {
        match self {
            DocNode::Line(line) => line.len(),
            DocNode::Block(block) => block.len(),
        }
    }
}

/// Position of a line: index into the document's children, plus the index
/// inside the block when the line is wrapped in one. Parent references are
/// navigational only, so positions stand in for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinePos {
    root: usize,
    sub: Option<usize>,
}

/// The root of the document tree. Holds a mixed ordered sequence of lines
/// and blocks, never fewer than one line; the empty document is a single
/// empty line of length 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    children: Vec<DocNode>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            children: vec![DocNode::Line(LineNode::default())],
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.children.iter().map(|child| child.len()).sum()
    }

    pub fn children(&self) -> &[DocNode] {
        &self.children
    }

    /// All lines in document order, whether standalone or inside a block.
    pub fn lines(&self) -> impl Iterator<Item = &LineNode> {
        self.children.iter().flat_map(|child| match child {
            DocNode::Line(line) => std::slice::from_ref(line).iter(),
            DocNode::Block(block) => block.children.iter(),
        })
    }

    /// Applies a delta against a single running cursor. The delta is
    /// validated up front; a delta that walks out of bounds aborts the edit
    /// without touching the document.
    pub fn apply(&mut self, delta: &Delta) -> Result<(), ApplyError> {
        self.validate(delta)?;
        let mut cursor = 0;
        for op in delta.iter() {
            match op {
                Op::Insert {
                    content,
                    attributes,
                } => {
                    match content {
                        Insertable::Text(text) => self.insert(cursor, text, attributes)?,
                        Insertable::Embed(embed) => {
                            self.insert_embed(cursor, embed.clone(), attributes)?
                        }
                    }
                    cursor += content.len();
                }
                Op::Retain { len, attributes } => {
                    self.retain(cursor, *len, attributes)?;
                    cursor += len;
                }
                Op::Delete { len } => {
                    self.delete(cursor, *len)?;
                }
            }
        }
        Ok(())
    }

    fn validate(&self, delta: &Delta) -> Result<(), ApplyError> {
        let mut cursor = 0;
        let mut doc_len = self.len();
        for op in delta.iter() {
            match op {
                Op::Insert { content, .. } => {
                    if cursor >= doc_len {
                        return Err(ApplyError::OutOfBounds {
                            offset: cursor,
                            len: content.len(),
                        });
                    }
                    doc_len += content.len();
                    cursor += content.len();
                }
                Op::Retain { len, .. } | Op::Delete { len } => {
                    if cursor + len > doc_len {
                        return Err(ApplyError::OutOfBounds {
                            offset: cursor,
                            len: *len,
                        });
                    }
                    match op {
                        Op::Delete { .. } => doc_len -= len,
                        _ => cursor += len,
                    }
                }
            }
        }
        Ok(())
    }

    /// Inserts text at `offset`. Text containing separators splits the
    /// target line: content after each separator moves to a new line that
    /// inherits the current line's style, while the line ahead of the
    /// separator is cleared, unwrapped from any block, and reformatted with
    /// the caller's line-scoped style. The separator carries the formatting
    /// decision for the paragraph it terminates.
    pub fn insert(&mut self, offset: usize, text: &str, style: &Style) -> Result<(), ApplyError> {
        if text.is_empty() {
            return Ok(());
        }
        let Some((mut pos, mut index)) = self.lookup(offset) else {
            return Err(ApplyError::OutOfBounds {
                offset,
                len: text.chars().count(),
            });
        };
        let mut rest = text;
        loop {
            match rest.find('\n') {
                None => {
                    self.line_mut(pos).insert_text(index, rest, style);
                    break;
                }
                Some(at) => {
                    let head = &rest[..at];
                    self.line_mut(pos).insert_text(index, head, style);
                    let split_ix = index + head.chars().count();
                    self.split_line(pos, split_ix);
                    self.line_mut(pos).style = Style::new();
                    self.unwrap_line(&mut pos);
                    self.format_line(&mut pos, style);
                    pos = self
                        .next_pos(pos)
                        .expect("split leaves a following line in place");
                    index = 0;
                    rest = &rest[at + 1..];
                }
            }
        }
        self.optimize();
        Ok(())
    }

    pub fn insert_embed(
        &mut self,
        offset: usize,
        embed: Embed,
        style: &Style,
    ) -> Result<(), ApplyError> {
        let Some((pos, index)) = self.lookup(offset) else {
            return Err(ApplyError::OutOfBounds { offset, len: 1 });
        };
        self.line_mut(pos).insert_embed(index, embed, style);
        Ok(())
    }

    /// Applies `style` over `[offset, offset+len)`. A span that is exactly a
    /// line's trailing separator is a line/block format change; interior
    /// spans format the leaves they cover. A span crossing the separator
    /// continues onto the following line at offset 0.
    pub fn retain(&mut self, offset: usize, len: usize, style: &Style) -> Result<(), ApplyError> {
        if offset + len > self.len() {
            return Err(ApplyError::OutOfBounds { offset, len });
        }
        if len == 0 || style.is_empty() {
            return Ok(());
        }
        let Some((mut pos, mut index)) = self.lookup(offset) else {
            return Err(ApplyError::OutOfBounds { offset, len });
        };
        let mut remaining = len;
        loop {
            let line_len = self.line(pos).len();
            let local = (line_len - index).min(remaining);
            if index + local == line_len && local == 1 {
                debug_assert!(style.scope_is(AttributeScope::Line));
                self.format_line(&mut pos, style);
            } else {
                debug_assert!(style.scope_is(AttributeScope::Inline));
                self.line_mut(pos).retain_inline(index, local, &style.inline_only());
            }
            remaining -= local;
            if remaining == 0 {
                break;
            }
            pos = match self.next_pos(pos) {
                Some(next) => next,
                None => break,
            };
            index = 0;
        }
        self.optimize();
        Ok(())
    }

    /// Deletes `[offset, offset+len)`. Deleting a line's trailing separator
    /// discards that line's style and merges its surviving content onto the
    /// following line, whose identity and style persist. The final line's
    /// separator is not deletable; the document never shrinks below one line.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<(), ApplyError> {
        if offset + len > self.len() {
            return Err(ApplyError::OutOfBounds { offset, len });
        }
        if len == 0 {
            return Ok(());
        }
        let Some((pos, index)) = self.lookup(offset) else {
            return Err(ApplyError::OutOfBounds { offset, len });
        };
        self.delete_at(pos, index, len);
        self.optimize();
        Ok(())
    }

    fn delete_at(&mut self, pos: LinePos, index: usize, len: usize) {
        let line_len = self.line(pos).len();
        let local = (line_len - index).min(len);
        let separator_deleted = index + local == line_len;
        {
            let line = self.line_mut(pos);
            if separator_deleted {
                line.style = Style::new();
                if local > 1 {
                    line.delete_interior(index, local - 1);
                }
            } else {
                line.delete_interior(index, local);
            }
        }
        let remaining = len - local;
        if remaining > 0 {
            if let Some(next) = self.next_pos(pos) {
                self.delete_at(next, 0, remaining);
            }
        }
        if separator_deleted {
            if let Some(next) = self.next_pos(pos) {
                let moved = std::mem::take(&mut self.line_mut(pos).children);
                let next_line = self.line_mut(next);
                next_line.children.splice(0..0, moved);
                next_line.optimize();
                self.unlink_line(pos);
            }
        }
    }

    /// The attribute set common to every unit of content in the range.
    /// Inline attributes are intersected across the leaves touched; line and
    /// block attributes are intersected across every line the range spans,
    /// partially-covered lines included. A range with nothing in common
    /// yields an empty style.
    pub fn collect_style(&self, offset: usize, len: usize) -> Style {
        let mut inline = StyleIntersection::new();
        let mut lines = StyleIntersection::new();
        let Some((mut pos, mut index)) = self.lookup(offset) else {
            return Style::new();
        };
        let mut remaining = len.min(self.len() - offset);
        if remaining == 0 {
            return Style::new();
        }
        loop {
            let line = self.line(pos);
            let local = (line.len() - index).min(remaining);
            line.collect_inline(index, local, &mut inline);
            let mut line_style = line.style.clone();
            if pos.sub.is_some() {
                let DocNode::Block(block) = &self.children[pos.root] else {
                    unreachable!("line position desynchronized");
                };
                line_style.merge_all(&block.style);
            }
            lines.intersect(&line_style);
            remaining -= local;
            if remaining == 0 {
                break;
            }
            pos = match self.next_pos(pos) {
                Some(next) => next,
                None => break,
            };
            index = 0;
        }
        let mut result = inline.finish();
        result.merge_all(&lines.finish());
        result
    }

    /// Canonical delta form: one insert per leaf with its inline style, one
    /// separator insert per line carrying the resolved line and block style.
    pub fn to_delta(&self) -> Delta {
        let mut delta = Delta::new();
        for child in &self.children {
            match child {
                DocNode::Line(line) => push_line(&mut delta, line, None),
                DocNode::Block(block) => {
                    for line in &block.children {
                        push_line(&mut delta, line, Some(&block.style));
                    }
                }
            }
        }
        delta
    }

    /// Rebuilds a document from its canonical delta, which must consist of
    /// inserts only, ending in a separator.
    pub fn from_delta(delta: &Delta) -> Result<Self, ApplyError> {
        let mut doc = Document::default();
        let mut cursor = 0;
        for op in delta.iter() {
            let Op::Insert {
                content,
                attributes,
            } = op
            else {
                return Err(ApplyError::InvalidDocument(
                    "document deltas contain only insert operations",
                ));
            };
            match content {
                Insertable::Text(text) => doc.insert(cursor, text, attributes)?,
                Insertable::Embed(embed) => {
                    doc.insert_embed(cursor, embed.clone(), attributes)?
                }
            }
            cursor += content.len();
        }
        match delta.ops().last() {
            Some(Op::Insert {
                content: Insertable::Text(text),
                ..
            }) if text.ends_with('\n') => {}
            _ => {
                return Err(ApplyError::InvalidDocument(
                    "document deltas end with a line separator",
                ));
            }
        }
        // The final separator of the delta already terminates the last line;
        // drop the surplus empty line the split left behind.
        if doc.children.len() > 1 {
            if let Some(DocNode::Line(line)) = doc.children.last() {
                if line.is_empty() && line.style.is_empty() {
                    doc.children.pop();
                }
            }
        }
        Ok(doc)
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            line.plain_text(&mut out);
        }
        out
    }

    fn lookup(&self, offset: usize) -> Option<(LinePos, usize)> {
        let (root, local) = node::lookup(&self.children, offset, false)?;
        match &self.children[root] {
            DocNode::Line(_) => Some((LinePos { root, sub: None }, local)),
            DocNode::Block(block) => {
                let (sub, local) = node::lookup(&block.children, local, false)?;
                Some((
                    LinePos {
                        root,
                        sub: Some(sub),
                    },
                    local,
                ))
            }
        }
    }

    fn line(&self, pos: LinePos) -> &LineNode {
        match (&self.children[pos.root], pos.sub) {
            (DocNode::Line(line), None) => line,
            (DocNode::Block(block), Some(sub)) => &block.children[sub],
            _ => unreachable!("line position desynchronized"),
        }
    }

    fn line_mut(&mut self, pos: LinePos) -> &mut LineNode {
        match (&mut self.children[pos.root], pos.sub) {
            (DocNode::Line(line), None) => line,
            (DocNode::Block(block), Some(sub)) => &mut block.children[sub],
            _ => unreachable!("line position desynchronized"),
        }
    }

    fn next_pos(&self, pos: LinePos) -> Option<LinePos> {
        if let Some(sub) = pos.sub {
            let DocNode::Block(block) = &self.children[pos.root] else {
                unreachable!("line position desynchronized");
            };
            if sub + 1 < block.children.len() {
                return Some(LinePos {
                    root: pos.root,
                    sub: Some(sub + 1),
                });
            }
        }
        let root = pos.root + 1;
        match self.children.get(root)? {
            DocNode::Line(_) => Some(LinePos { root, sub: None }),
            DocNode::Block(_) => Some(LinePos {
                root,
                sub: Some(0),
            }),
        }
    }

    /// Links the second half of a line split immediately after the first,
    /// inside the same parent, so a split list item stays in its list.
    fn split_line(&mut self, pos: LinePos, index: usize) {
        let new_line = self.line_mut(pos).split_at(index);
        match pos.sub {
            None => self
                .children
                .insert(pos.root + 1, DocNode::Line(new_line)),
            Some(sub) => {
                let DocNode::Block(block) = &mut self.children[pos.root] else {
                    unreachable!("line position desynchronized");
                };
                block.children.insert(sub + 1, new_line);
            }
        }
    }

    /// Applies a line-scoped style to the line at `pos` and reconciles its
    /// block membership: unset unwraps, a changed grouping re-wraps into a
    /// fresh or adjacent matching block, an unchanged one is a no-op.
    fn format_line(&mut self, pos: &mut LinePos, style: &Style) {
        let mut line_scoped = style.line_only();
        if line_scoped.is_empty() {
            return;
        }
        let block_value = line_scoped.remove(AttributeKey::Block);
        self.line_mut(*pos).style.merge_all(&line_scoped);
        let Some(block_value) = block_value else {
            return;
        };
        let current = match pos.sub {
            Some(_) => {
                let DocNode::Block(block) = &self.children[pos.root] else {
                    unreachable!("line position desynchronized");
                };
                block.block_value().cloned()
            }
            None => None,
        };
        if block_value.is_null() {
            self.unwrap_line(pos);
            return;
        }
        if current.as_ref() == Some(&block_value) {
            return;
        }
        self.unwrap_line(pos);
        self.wrap_line(pos, Style::from(Attribute::new(AttributeKey::Block, block_value)));
    }

    /// Returns the line at `pos` to being a direct child of the document,
    /// splitting its block around it. Keeps `pos` pointing at the line.
    fn unwrap_line(&mut self, pos: &mut LinePos) {
        let Some(sub) = pos.sub else {
            return;
        };
        let root = pos.root;
        let DocNode::Block(block) = &mut self.children[root] else {
            unreachable!("line position desynchronized");
        };
        let line = block.children.remove(sub);
        let tail = block.children.split_off(sub);
        let style = block.style.clone();
        let mut insert_at = root + 1;
        if block.children.is_empty() {
            self.children.remove(root);
            insert_at = root;
        }
        self.children.insert(insert_at, DocNode::Line(line));
        if !tail.is_empty() {
            self.children
                .insert(insert_at + 1, DocNode::Block(BlockNode::new(style, tail)));
        }
        pos.root = insert_at;
        pos.sub = None;
    }

    /// Wraps the standalone line at `pos` into a block with the given style,
    /// joining an adjacent block when its style already matches. Keeps `pos`
    /// pointing at the line.
    fn wrap_line(&mut self, pos: &mut LinePos, style: Style) {
        debug_assert!(pos.sub.is_none());
        let joins_prev = pos.root > 0
            && matches!(&self.children[pos.root - 1], DocNode::Block(prev) if prev.style == style);
        if joins_prev {
            let DocNode::Line(line) = self.children.remove(pos.root) else {
                unreachable!("line position desynchronized");
            };
            let DocNode::Block(prev) = &mut self.children[pos.root - 1] else {
                unreachable!();
            };
            prev.children.push(line);
            pos.root -= 1;
            pos.sub = Some(prev.children.len() - 1);
            self.merge_block_with_next(pos.root);
            return;
        }
        let joins_next = pos.root + 1 < self.children.len()
            && matches!(&self.children[pos.root + 1], DocNode::Block(next) if next.style == style);
        if joins_next {
            let DocNode::Line(line) = self.children.remove(pos.root) else {
                unreachable!("line position desynchronized");
            };
            let DocNode::Block(next) = &mut self.children[pos.root] else {
                unreachable!();
            };
            next.children.insert(0, line);
            pos.sub = Some(0);
            return;
        }
        let DocNode::Line(line) = self.children.remove(pos.root) else {
            unreachable!("line position desynchronized");
        };
        self.children
            .insert(pos.root, DocNode::Block(BlockNode::new(style, vec![line])));
        pos.sub = Some(0);
    }

    /// Absorbs the block following `root` when both carry the same style.
    fn merge_block_with_next(&mut self, root: usize) {
        let merge = root + 1 < self.children.len()
            && matches!(
                (&self.children[root], &self.children[root + 1]),
                (DocNode::Block(a), DocNode::Block(b)) if a.style == b.style
            );
        if !merge {
            return;
        }
        let DocNode::Block(next) = self.children.remove(root + 1) else {
            unreachable!();
        };
        let DocNode::Block(block) = &mut self.children[root] else {
            unreachable!();
        };
        block.children.extend(next.children);
    }

    fn unlink_line(&mut self, pos: LinePos) {
        match pos.sub {
            None => {
                self.children.remove(pos.root);
            }
            Some(sub) => {
                let DocNode::Block(block) = &mut self.children[pos.root] else {
                    unreachable!("line position desynchronized");
                };
                block.children.remove(sub);
                if block.children.is_empty() {
                    self.children.remove(pos.root);
                }
            }
        }
    }

    /// Localized cleanup after structural mutation: empty blocks dropped,
    /// adjacent blocks with equal styles merged, and the document kept at
    /// one line minimum.
    fn optimize(&mut self) {
        self.children.retain(|child| match child {
            DocNode::Block(block) => !block.children.is_empty(),
            DocNode::Line(_) => true,
        });
        let mut ix = 1;
        while ix < self.children.len() {
            let merge = matches!(
                (&self.children[ix - 1], &self.children[ix]),
                (DocNode::Block(a), DocNode::Block(b)) if a.style == b.style
            );
            if merge {
                self.merge_block_with_next(ix - 1);
            } else {
                ix += 1;
            }
        }
        if self.children.is_empty() {
            self.children.push(DocNode::Line(LineNode::default()));
        }
    }
}

fn push_line(delta: &mut Delta, line: &LineNode, block_style: Option<&Style>) {
    for leaf in &line.children {
        match leaf {
            crate::leaf::LeafNode::Text(text) => delta.push(Op::Insert {
                content: Insertable::Text(text.text.clone()),
                attributes: text.style.clone(),
            }),
            crate::leaf::LeafNode::Embed(embed) => delta.push(Op::Insert {
                content: Insertable::Embed(embed.embed.clone()),
                attributes: embed.style.clone(),
            }),
        }
    }
    let mut attributes = line.style.clone();
    if let Some(block_style) = block_style {
        attributes.merge_all(block_style);
    }
    delta.push(Op::Insert {
        content: Insertable::Text("\n".to_string()),
        attributes,
    });
}
