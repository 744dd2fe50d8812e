mod attributes;
mod block;
mod delta;
mod document;
mod editor;
mod leaf;
mod line;
mod node;
mod value;

pub use crate::attributes::{Attribute, AttributeKey, AttributeScope, Style};
pub use crate::block::BlockNode;
pub use crate::delta::{Delta, Embed, Insertable, Op};
pub use crate::document::{ApplyError, DocNode, Document};
pub use crate::editor::EditorBuffer;
pub use crate::leaf::{EMBED_PLACEHOLDER, EmbedNode, LeafNode, TextNode};
pub use crate::line::LineNode;
pub use crate::node::NodeLen;
pub use crate::value::DocumentValue;
