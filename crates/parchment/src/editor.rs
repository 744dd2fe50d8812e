use std::ops::Range;

use crate::attributes::Style;
use crate::delta::Delta;
use crate::document::{ApplyError, Document};

/// The single mutation surface the surrounding editor UI calls. Every edit
/// is expressed as one delete followed by one insert against the document;
/// the buffer holds no private tree access of its own.
#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
    document: Document,
    selection: Range<usize>,
}

impl EditorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            selection: 0..0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        let max = self.document.len();
        self.selection = selection.start.min(max)..selection.end.min(max);
    }

    pub fn text(&self) -> String {
        self.document.to_plain_text()
    }

    pub fn delta(&self) -> Delta {
        self.document.to_delta()
    }

    /// Replaces `delete_len` characters at `start` with `text`. With no
    /// explicit selection the caret lands after the inserted text.
    pub fn replace_text(
        &mut self,
        start: usize,
        delete_len: usize,
        text: &str,
        selection: Option<Range<usize>>,
    ) -> Result<(), ApplyError> {
        let mut delta = Delta::new().retain(start);
        if delete_len > 0 {
            delta = delta.delete(delete_len);
        }
        if !text.is_empty() {
            delta = delta.insert(text);
        }
        self.document.apply(&delta)?;
        let caret = start + text.chars().count();
        self.set_selection(selection.unwrap_or(caret..caret));
        Ok(())
    }

    /// Formats the current selection.
    pub fn format_selection(&mut self, style: Style) -> Result<(), ApplyError> {
        let Range { start, end } = self.selection.clone();
        if start == end {
            return Ok(());
        }
        self.document.retain(start, end - start, &style)
    }

    /// Platform autocorrection prompts are not part of this model. Declared
    /// unsupported so integrators notice misuse immediately instead of the
    /// call being silently ignored.
    pub fn autocorrect_suggestion(
        &mut self,
        _range: Range<usize>,
        _replacement: &str,
    ) -> Result<(), ApplyError> {
        Err(ApplyError::Unsupported("autocorrection prompts"))
    }
}
