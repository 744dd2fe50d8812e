use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeScope {
    Inline,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Link,
    Heading,
    Block,
    Checked,
}

impl AttributeKey {
    pub fn scope(self) -> AttributeScope {
        match self {
            AttributeKey::Bold
            | AttributeKey::Italic
            | AttributeKey::Underline
            | AttributeKey::Strikethrough
            | AttributeKey::Code
            | AttributeKey::Link => AttributeScope::Inline,
            AttributeKey::Heading | AttributeKey::Block | AttributeKey::Checked => {
                AttributeScope::Line
            }
        }
    }

    /// The attribute that decides which block grouping a line belongs to.
    pub fn is_block_grouping(self) -> bool {
        matches!(self, AttributeKey::Block)
    }
}

/// A single formatting attribute. A `Null` value is the "unset" sentinel:
/// merging it into a style removes the key instead of storing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: AttributeKey,
    pub value: Value,
}

impl Attribute {
    pub fn new(key: AttributeKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn unset(key: AttributeKey) -> Self {
        Self {
            key,
            value: Value::Null,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.value.is_null()
    }

    pub fn scope(&self) -> AttributeScope {
        self.key.scope()
    }

    pub fn bold() -> Self {
        Self::new(AttributeKey::Bold, true)
    }

    pub fn italic() -> Self {
        Self::new(AttributeKey::Italic, true)
    }

    pub fn underline() -> Self {
        Self::new(AttributeKey::Underline, true)
    }

    pub fn strikethrough() -> Self {
        Self::new(AttributeKey::Strikethrough, true)
    }

    pub fn code() -> Self {
        Self::new(AttributeKey::Code, true)
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self::new(AttributeKey::Link, url.into())
    }

    pub fn heading(level: u8) -> Self {
        Self::new(AttributeKey::Heading, level)
    }

    pub fn block(kind: impl Into<String>) -> Self {
        Self::new(AttributeKey::Block, kind.into())
    }

    pub fn checked(value: bool) -> Self {
        Self::new(AttributeKey::Checked, value)
    }
}

/// A set of attributes, unique by key. Styles attached to nodes never hold
/// the unset sentinel; styles carried by delta operations may, which is how
/// an operation expresses "clear this formatting".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style {
    attrs: BTreeMap<AttributeKey, Value>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn get(&self, key: AttributeKey) -> Option<&Value> {
        self.attrs.get(&key)
    }

    pub fn contains(&self, attr: &Attribute) -> bool {
        self.attrs.get(&attr.key) == Some(&attr.value)
    }

    pub fn contains_key(&self, key: AttributeKey) -> bool {
        self.attrs.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, &Value)> {
        self.attrs.iter().map(|(k, v)| (*k, v))
    }

    /// Stores the attribute as given, unset sentinel included. Used when
    /// building operation styles.
    pub fn set(&mut self, attr: Attribute) {
        self.attrs.insert(attr.key, attr.value);
    }

    /// Applies the attribute: the incoming value wins on collision, and the
    /// unset sentinel removes the key entirely.
    pub fn merge(&mut self, attr: Attribute) {
        if attr.is_unset() {
            self.attrs.remove(&attr.key);
        } else {
            self.attrs.insert(attr.key, attr.value);
        }
    }

    pub fn merge_all(&mut self, other: &Style) {
        for (key, value) in other.iter() {
            self.merge(Attribute::new(key, value.clone()));
        }
    }

    pub fn remove(&mut self, key: AttributeKey) -> Option<Value> {
        self.attrs.remove(&key)
    }

    pub fn removed(&self, keys: &[AttributeKey]) -> Style {
        let mut out = self.clone();
        for key in keys {
            out.attrs.remove(key);
        }
        out
    }

    pub fn scope_is(&self, scope: AttributeScope) -> bool {
        self.attrs.keys().all(|key| key.scope() == scope)
    }

    pub fn inline_only(&self) -> Style {
        self.filtered(AttributeScope::Inline)
    }

    pub fn line_only(&self) -> Style {
        self.filtered(AttributeScope::Line)
    }

    fn filtered(&self, scope: AttributeScope) -> Style {
        Style {
            attrs: self
                .attrs
                .iter()
                .filter(|(key, _)| key.scope() == scope)
                .map(|(key, value)| (*key, value.clone()))
                .collect(),
        }
    }

    /// The block-grouping attribute, if present. The value may be the unset
    /// sentinel, which means "remove this line from its block".
    pub fn block_attribute(&self) -> Option<Attribute> {
        self.attrs
            .iter()
            .find(|(key, _)| key.is_block_grouping())
            .map(|(key, value)| Attribute::new(*key, value.clone()))
    }
}

impl From<Attribute> for Style {
    fn from(attr: Attribute) -> Self {
        let mut style = Style::new();
        style.set(attr);
        style
    }
}

impl FromIterator<Attribute> for Style {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut style = Style::new();
        for attr in iter {
            style.set(attr);
        }
        style
    }
}

/// Running intersection used by collect-style: the result only ever shrinks,
/// and keys dropped once stay dropped.
#[derive(Debug, Default)]
pub(crate) struct StyleIntersection {
    result: Style,
    seeded: bool,
}

impl StyleIntersection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn intersect(&mut self, style: &Style) {
        if !self.seeded {
            self.seeded = true;
            self.result = style.clone();
            return;
        }
        let mut dropped = Vec::new();
        for (key, value) in self.result.iter() {
            if style.get(key) != Some(value) {
                dropped.push(key);
            }
        }
        for key in dropped {
            self.result.remove(key);
        }
    }

    pub(crate) fn finish(self) -> Style {
        if self.seeded { self.result } else { Style::new() }
    }
}
