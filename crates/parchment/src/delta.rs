use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::Style;

/// Reference to an embedded external object. Non-inline embeds are block
/// embeds and are expected to occupy an entire line by themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub inline: bool,
}

impl Embed {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
            inline: false,
        }
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }
}

/// Payload of an insert operation: either a text run or a single embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insertable {
    Text(String),
    Embed(Embed),
}

impl Insertable {
    /// Length in flat character coordinates. Embeds always count as one.
    pub fn len(&self) -> usize {
        match self {
            Insertable::Text(text) => text.chars().count(),
            Insertable::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Insert {
        content: Insertable,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        attributes: Style,
    },
    Retain {
        len: usize,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        attributes: Style,
    },
    Delete {
        len: usize,
    },
}

impl Op {
    pub fn len(&self) -> usize {
        match self {
            Op::Insert { content, .. } => content.len(),
            Op::Retain { len, .. } | Op::Delete { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered sequence of insert/retain/delete operations interpreted
/// against a single running cursor over the document's flat offsets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Appends an operation, coalescing it into the previous one when both
    /// are the same kind and carry equal attributes. Empty operations are
    /// dropped.
    pub fn push(&mut self, op: Op) {
        if op.is_empty() {
            return;
        }
        match (self.ops.last_mut(), &op) {
            (
                Some(Op::Insert {
                    content: Insertable::Text(prev),
                    attributes: prev_attrs,
                }),
                Op::Insert {
                    content: Insertable::Text(next),
                    attributes: next_attrs,
                },
            ) if prev_attrs == next_attrs => {
                prev.push_str(next);
                return;
            }
            (
                Some(Op::Retain {
                    len,
                    attributes: prev_attrs,
                }),
                Op::Retain {
                    len: next,
                    attributes: next_attrs,
                },
            ) if prev_attrs == next_attrs => {
                *len += next;
                return;
            }
            (Some(Op::Delete { len }), Op::Delete { len: next }) => {
                *len += next;
                return;
            }
            _ => {}
        }
        self.ops.push(op);
    }

    pub fn insert(mut self, text: impl Into<String>) -> Self {
        self.push(Op::Insert {
            content: Insertable::Text(text.into()),
            attributes: Style::new(),
        });
        self
    }

    pub fn insert_with(mut self, text: impl Into<String>, attributes: Style) -> Self {
        self.push(Op::Insert {
            content: Insertable::Text(text.into()),
            attributes,
        });
        self
    }

    pub fn insert_embed(mut self, embed: Embed, attributes: Style) -> Self {
        self.push(Op::Insert {
            content: Insertable::Embed(embed),
            attributes,
        });
        self
    }

    pub fn retain(mut self, len: usize) -> Self {
        self.push(Op::Retain {
            len,
            attributes: Style::new(),
        });
        self
    }

    pub fn retain_with(mut self, len: usize, attributes: Style) -> Self {
        self.push(Op::Retain { len, attributes });
        self
    }

    pub fn delete(mut self, len: usize) -> Self {
        self.push(Op::Delete { len });
        self
    }

    /// Canonical form: empty operations dropped, adjacent compatible
    /// operations merged, trailing attribute-free retains removed.
    pub fn normalized(&self) -> Delta {
        let mut out = Delta::new();
        for op in &self.ops {
            out.push(op.clone());
        }
        while let Some(Op::Retain { attributes, .. }) = out.ops.last() {
            if !attributes.is_empty() {
                break;
            }
            out.ops.pop();
        }
        out
    }
}

impl IntoIterator for Delta {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
