use parchment::{Attribute, AttributeKey, Delta, DocNode, Document, Style};
use serde_json::json;

fn doc_from(delta: Delta) -> Document {
    let mut doc = Document::new();
    doc.apply(&delta).unwrap();
    doc
}

#[test]
fn inline_retain_formats_only_the_covered_range() {
    let mut doc = doc_from(Delta::new().insert("Hello World"));
    doc.apply(&Delta::new().retain(6).retain_with(5, Style::from(Attribute::bold())))
        .unwrap();

    assert_eq!(doc.collect_style(6, 5), Style::from(Attribute::bold()));
    assert_eq!(doc.collect_style(0, 5), Style::new());
}

#[test]
fn style_application_is_idempotent() {
    let mut doc = doc_from(Delta::new().insert("Hello World"));
    let format = Delta::new()
        .retain(6)
        .retain_with(5, Style::from(Attribute::bold()));

    doc.apply(&format).unwrap();
    let once = doc.clone();
    doc.apply(&format).unwrap();

    assert_eq!(doc, once);
    assert_eq!(doc.collect_style(6, 5), Style::from(Attribute::bold()));
}

#[test]
fn adjacent_lines_with_equal_block_attribute_share_one_block() {
    let doc = doc_from(
        Delta::new()
            .insert("A")
            .insert_with("\n", Style::from(Attribute::block("ul")))
            .insert("B")
            .insert_with("\n", Style::from(Attribute::block("ul"))),
    );

    assert_eq!(doc.children().len(), 2);
    let DocNode::Block(block) = &doc.children()[0] else {
        panic!("expected block");
    };
    assert_eq!(block.children.len(), 2);
    assert_eq!(block.style, Style::from(Attribute::block("ul")));
}

#[test]
fn unsetting_block_attribute_unwraps_only_that_line() {
    let mut doc = doc_from(
        Delta::new()
            .insert("A")
            .insert_with("\n", Style::from(Attribute::block("ul")))
            .insert("B")
            .insert_with("\n", Style::from(Attribute::block("ul"))),
    );

    doc.apply(
        &Delta::new()
            .retain(1)
            .retain_with(1, Style::from(Attribute::unset(AttributeKey::Block))),
    )
    .unwrap();

    assert_eq!(doc.children().len(), 3);
    let DocNode::Line(first) = &doc.children()[0] else {
        panic!("expected standalone line");
    };
    assert!(first.style.is_empty());
    let DocNode::Block(block) = &doc.children()[1] else {
        panic!("expected remaining block");
    };
    assert_eq!(block.children.len(), 1);
}

#[test]
fn separately_formatted_neighbors_merge_into_one_block() {
    let mut doc = doc_from(Delta::new().insert("A\nB"));
    doc.apply(
        &Delta::new()
            .retain(1)
            .retain_with(1, Style::from(Attribute::block("ul"))),
    )
    .unwrap();
    assert_eq!(doc.children().len(), 2);

    doc.apply(
        &Delta::new()
            .retain(3)
            .retain_with(1, Style::from(Attribute::block("ul"))),
    )
    .unwrap();
    assert_eq!(doc.children().len(), 1);
    let DocNode::Block(block) = &doc.children()[0] else {
        panic!("expected block");
    };
    assert_eq!(block.children.len(), 2);
}

#[test]
fn changing_block_attribute_rewraps_into_a_fresh_block() {
    let mut doc = doc_from(
        Delta::new()
            .insert("A")
            .insert_with("\n", Style::from(Attribute::block("ul")))
            .insert("B")
            .insert_with("\n", Style::from(Attribute::block("ul"))),
    );

    doc.apply(
        &Delta::new()
            .retain(3)
            .retain_with(1, Style::from(Attribute::block("ol"))),
    )
    .unwrap();

    let kinds: Vec<_> = doc
        .children()
        .iter()
        .map(|child| match child {
            DocNode::Block(block) => block.block_value().cloned(),
            DocNode::Line(_) => None,
        })
        .collect();
    assert_eq!(kinds, [Some(json!("ul")), Some(json!("ol")), None]);
}

#[test]
fn line_format_applies_at_the_separator_only() {
    let mut doc = doc_from(Delta::new().insert("Hello"));
    doc.apply(
        &Delta::new()
            .retain(5)
            .retain_with(1, Style::from(Attribute::heading(1))),
    )
    .unwrap();

    let line = doc.lines().next().unwrap();
    assert_eq!(line.style.get(AttributeKey::Heading), Some(&json!(1)));
    // The leaves themselves stay unformatted.
    for leaf in &line.children {
        assert!(leaf.style().is_empty());
    }
}

#[test]
fn unsetting_a_line_attribute_clears_it() {
    let mut doc = doc_from(Delta::new().insert("Hello"));
    doc.apply(
        &Delta::new()
            .retain(5)
            .retain_with(1, Style::from(Attribute::heading(1))),
    )
    .unwrap();
    doc.apply(
        &Delta::new()
            .retain(5)
            .retain_with(1, Style::from(Attribute::unset(AttributeKey::Heading))),
    )
    .unwrap();

    assert!(doc.lines().next().unwrap().style.is_empty());
}

#[test]
fn retain_past_the_end_is_rejected() {
    let mut doc = doc_from(Delta::new().insert("Hi"));
    assert!(doc.retain(0, 10, &Style::from(Attribute::bold())).is_err());
}
