use parchment::{Attribute, AttributeKey, Delta, Document, Style};
use serde_json::json;

fn doc_from(delta: Delta) -> Document {
    let mut doc = Document::new();
    doc.apply(&delta).unwrap();
    doc
}

#[test]
fn empty_range_yields_an_empty_style() {
    let doc = doc_from(Delta::new().insert_with("abc", Style::from(Attribute::bold())));
    assert_eq!(doc.collect_style(1, 0), Style::new());
}

#[test]
fn intersection_keeps_only_attributes_common_to_all_leaves() {
    let mut doc = doc_from(Delta::new().insert("abcd"));
    doc.apply(&Delta::new().retain_with(
        2,
        Style::from_iter([Attribute::bold(), Attribute::italic()]),
    ))
    .unwrap();
    doc.apply(&Delta::new().retain(2).retain_with(2, Style::from(Attribute::bold())))
        .unwrap();

    assert_eq!(doc.collect_style(0, 4), Style::from(Attribute::bold()));
    assert_eq!(
        doc.collect_style(0, 2),
        Style::from_iter([Attribute::bold(), Attribute::italic()])
    );
}

#[test]
fn style_differences_yield_an_empty_result() {
    let mut doc = doc_from(Delta::new().insert("ab"));
    doc.apply(&Delta::new().retain_with(1, Style::from(Attribute::bold())))
        .unwrap();

    assert_eq!(doc.collect_style(0, 2), Style::new());
}

#[test]
fn line_attributes_intersect_across_spanned_lines() {
    let mut doc = doc_from(Delta::new().insert("AB\nCD"));
    doc.apply(&Delta::new().retain_with(2, Style::from(Attribute::bold())))
        .unwrap();
    doc.apply(&Delta::new().retain(3).retain_with(2, Style::from(Attribute::bold())))
        .unwrap();
    doc.apply(
        &Delta::new()
            .retain(2)
            .retain_with(1, Style::from(Attribute::heading(1))),
    )
    .unwrap();
    doc.apply(
        &Delta::new()
            .retain(5)
            .retain_with(1, Style::from(Attribute::heading(1))),
    )
    .unwrap();

    // Range covers both lines, the second one only partially.
    assert_eq!(
        doc.collect_style(0, 5),
        Style::from_iter([Attribute::bold(), Attribute::heading(1)])
    );

    // Differing line formats drop out of the intersection.
    doc.apply(
        &Delta::new()
            .retain(5)
            .retain_with(1, Style::from(Attribute::heading(2))),
    )
    .unwrap();
    assert_eq!(doc.collect_style(0, 5), Style::from(Attribute::bold()));
}

#[test]
fn block_attributes_resolve_through_the_enclosing_block() {
    let doc = doc_from(
        Delta::new()
            .insert("A")
            .insert_with("\n", Style::from(Attribute::block("ul")))
            .insert("B")
            .insert_with("\n", Style::from(Attribute::block("ul"))),
    );

    let collected = doc.collect_style(0, 4);
    assert_eq!(collected.get(AttributeKey::Block), Some(&json!("ul")));
}
