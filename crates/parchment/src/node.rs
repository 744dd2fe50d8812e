/// Shared base behavior of every node kind: a length in the document's flat
/// character coordinates. Lengths are computed from content, never cached,
/// so they stay exact across every mutation.
pub trait NodeLen {
    fn len(&self) -> usize;
}

/// Finds the child containing `offset` and the remaining offset within it.
///
/// With `inclusive` set, an offset landing exactly on a child boundary
/// resolves to the earlier child with the offset at its end. Edits that land
/// exactly at the end of a text run must target that run, not the start of
/// its successor.
pub(crate) fn lookup<T: NodeLen>(
    children: &[T],
    mut offset: usize,
    inclusive: bool,
) -> Option<(usize, usize)> {
    for (ix, child) in children.iter().enumerate() {
        let len = child.len();
        if offset < len || (inclusive && offset == len) {
            return Some((ix, offset));
        }
        offset -= len;
    }
    None
}

pub(crate) fn byte_of_char(text: &str, char_ix: usize) -> usize {
    text.char_indices()
        .nth(char_ix)
        .map(|(ix, _)| ix)
        .unwrap_or(text.len())
}
