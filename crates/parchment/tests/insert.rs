use parchment::{
    ApplyError, Attribute, AttributeKey, Delta, DocNode, Document, Embed, LeafNode, Style,
};
use serde_json::json;

fn line_texts(doc: &Document) -> Vec<String> {
    doc.lines()
        .map(|line| {
            let mut out = String::new();
            line.plain_text(&mut out);
            out.pop();
            out
        })
        .collect()
}

fn assert_length_invariant(doc: &Document) {
    assert_eq!(doc.len(), doc.to_plain_text().chars().count());
}

#[test]
fn multi_line_insert_splits_into_lines() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert("Hello\nWorld")).unwrap();

    assert_eq!(line_texts(&doc), ["Hello", "World"]);
    let lens: Vec<_> = doc.lines().map(|line| line.len()).collect();
    assert_eq!(lens, [6, 6]);
    assert_eq!(doc.len(), 12);
    assert_length_invariant(&doc);
}

#[test]
fn styled_insert_merges_into_matching_run() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert_with("bold", Style::from(Attribute::bold())))
        .unwrap();
    doc.insert(4, "er", &Style::from(Attribute::bold())).unwrap();

    let line = doc.lines().next().unwrap();
    assert_eq!(line.children.len(), 1);
    let LeafNode::Text(text) = &line.children[0] else {
        panic!("expected text leaf");
    };
    assert_eq!(text.text, "bolder");
    assert!(text.style.contains(&Attribute::bold()));
}

#[test]
fn unstyled_insert_splits_a_styled_run() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert_with("bold", Style::from(Attribute::bold())))
        .unwrap();
    doc.insert(2, "xy", &Style::new()).unwrap();

    let line = doc.lines().next().unwrap();
    let pieces: Vec<_> = line
        .children
        .iter()
        .map(|leaf| {
            let LeafNode::Text(text) = leaf else {
                panic!("expected text leaf");
            };
            (text.text.as_str(), text.style.contains(&Attribute::bold()))
        })
        .collect();
    assert_eq!(pieces, [("bo", true), ("xy", false), ("ld", true)]);
    assert_length_invariant(&doc);
}

#[test]
fn separator_insert_formats_the_line_it_terminates() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert("TitleBody")).unwrap();
    doc.insert(5, "\n", &Style::from(Attribute::heading(1)))
        .unwrap();

    assert_eq!(line_texts(&doc), ["Title", "Body"]);
    let styles: Vec<_> = doc.lines().map(|line| line.style.clone()).collect();
    assert_eq!(styles[0].get(AttributeKey::Heading), Some(&json!(1)));
    assert!(styles[1].is_empty());
    assert_length_invariant(&doc);
}

#[test]
fn separator_insert_with_block_attribute_wraps_the_line() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert("Item")).unwrap();
    doc.insert(4, "\n", &Style::from(Attribute::block("ul")))
        .unwrap();

    assert_eq!(doc.children().len(), 2);
    let DocNode::Block(block) = &doc.children()[0] else {
        panic!("expected block");
    };
    assert_eq!(block.style, Style::from(Attribute::block("ul")));
    assert_eq!(block.children.len(), 1);
    let DocNode::Line(last) = &doc.children()[1] else {
        panic!("expected trailing line");
    };
    assert!(last.is_empty());
    assert_length_invariant(&doc);
}

#[test]
fn inserting_empty_text_is_a_no_op() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert("Hello")).unwrap();
    let before = doc.clone();
    doc.insert(2, "", &Style::from(Attribute::bold())).unwrap();
    assert_eq!(doc, before);
}

#[test]
fn embed_insert_is_atomic_and_length_one() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert("ab")).unwrap();
    let embed = Embed::new("image", json!({"src": "x.png"})).inline(true);
    doc.insert_embed(1, embed, &Style::new()).unwrap();

    assert_eq!(doc.len(), 4);
    assert_eq!(doc.to_plain_text(), "a\u{fffc}b\n");
    let line = doc.lines().next().unwrap();
    assert_eq!(line.children.len(), 3);
    assert_length_invariant(&doc);
}

#[test]
fn insert_past_the_end_is_out_of_bounds() {
    let mut doc = Document::new();
    doc.apply(&Delta::new().insert("Hi")).unwrap();
    let err = doc.insert(doc.len(), "x", &Style::new()).unwrap_err();
    assert!(matches!(err, ApplyError::OutOfBounds { .. }));
}
