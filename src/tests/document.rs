use crate::{Document, DocumentError, SourceMetadata, TextSpan};

#[test]
fn test_empty_and_whitespace_input_is_rejected() {
    assert_eq!(Document::new(""), Err(DocumentError::Empty));
    assert_eq!(Document::new("  \n\t "), Err(DocumentError::Empty));
}

#[test]
fn test_oversized_input_is_rejected() {
    let err = Document::with_limit("abcdef", 4).unwrap_err();
    assert_eq!(err, DocumentError::TooLarge { len: 6, limit: 4 });
}

#[test]
fn test_non_linguistic_input_is_still_a_document() {
    let doc = Document::new("### --- ***").unwrap();
    assert!(doc.words().is_empty());
}

#[test]
fn test_words_carry_byte_spans() {
    let doc = Document::new("Pay $1,250.00 under 42 U.S.C. now").unwrap();
    let words: Vec<(&str, TextSpan)> = doc.words().iter().map(|w| (w.text, w.span)).collect();
    assert_eq!(words[0], ("Pay", TextSpan::new(0, 3)));
    assert_eq!(words[1], ("1,250.00", TextSpan::new(5, 13)));
    assert!(words.iter().any(|(w, _)| *w == "U.S.C"));
    for (text, span) in words {
        assert_eq!(span.slice(doc.text()), text);
    }
}

#[test]
fn test_content_hash_is_stable_and_metadata_is_kept() {
    let a = Document::new("same text").unwrap();
    let b = Document::new("same text")
        .unwrap()
        .with_metadata(SourceMetadata {
            filename: Some("notice.txt".to_string()),
            timestamp: None,
        });
    assert_eq!(a.content_hash(), b.content_hash());
    assert_eq!(a.content_hash().len(), 64);

    let reference = b.reference();
    assert_eq!(reference.length, 9);
    assert_eq!(reference.metadata.filename.as_deref(), Some("notice.txt"));
}

#[test]
fn test_span_relations() {
    let outer = TextSpan::new(0, 10);
    let inner = TextSpan::new(2, 5);
    let apart = TextSpan::new(10, 12);
    assert!(outer.contains(&inner));
    assert!(outer.overlaps(&inner));
    assert!(!outer.overlaps(&apart));
    assert_eq!(inner.offset(3), TextSpan::new(5, 8));
    assert_eq!(TextSpan::new(4, 4).len(), 0);
}
