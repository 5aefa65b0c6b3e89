use super::*;
use crate::test_utils::{FailingEmbedder, TEST_DIMENSION, VocabularyEmbedder};

const TWO_PARAGRAPHS: &str = "Paragraph one.\n\nParagraph two talks about rockets.";

fn knowledge_base() -> KnowledgeBase {
    KnowledgeBase::new(
        Arc::new(VocabularyEmbedder::default()),
        ChunkingConfig::default(),
    )
}

#[test]
fn build_then_search() {
    let kb = knowledge_base();

    let summary = kb
        .build_index(TWO_PARAGRAPHS.as_bytes(), "txt")
        .expect("should build index");
    assert_eq!(
        summary,
        BuildSummary {
            chunk_count: 2,
            dimension: TEST_DIMENSION
        }
    );

    let results = kb.search("rockets", 1).expect("should search");
    assert_eq!(results, vec!["Paragraph two talks about rockets."]);
}

#[test]
fn search_before_build() {
    let kb = knowledge_base();
    assert!(matches!(kb.search("anything", 3), Err(QaError::NotIndexed)));
    assert_eq!(kb.status().expect("status"), KnowledgeStatus::Empty);
}

#[test]
fn unsupported_type_is_rejected() {
    let kb = knowledge_base();
    assert!(matches!(
        kb.build_index(b"hello", "docx"),
        Err(QaError::UnsupportedType(_))
    ));
    assert!(matches!(
        kb.build_named("report.docx", b"hello"),
        Err(QaError::UnsupportedType(_))
    ));
}

#[test]
fn file_type_is_case_insensitive() {
    let kb = knowledge_base();
    kb.build_index(b"Some text.", "TXT")
        .expect("upper-case type is accepted");
    kb.build_named("NOTES.TXT", b"Other text.")
        .expect("upper-case extension is accepted");
}

#[test]
fn whitespace_document_keeps_previous_index() {
    let kb = knowledge_base();
    kb.build_index(TWO_PARAGRAPHS.as_bytes(), "txt")
        .expect("should build index");

    assert!(matches!(
        kb.build_index(b"  \n\n \t \n", "txt"),
        Err(QaError::EmptyDocument)
    ));

    let results = kb.search("rockets", 1).expect("old index still served");
    assert_eq!(results, vec!["Paragraph two talks about rockets."]);
}

#[test]
fn whitespace_document_on_empty_base() {
    let kb = knowledge_base();
    assert!(matches!(
        kb.build_index(b"\n\n\n", "txt"),
        Err(QaError::EmptyDocument)
    ));
    assert_eq!(kb.status().expect("status"), KnowledgeStatus::Empty);
}

#[test]
fn invalid_bytes_keep_previous_index() {
    let kb = knowledge_base();
    kb.build_index(TWO_PARAGRAPHS.as_bytes(), "txt")
        .expect("should build index");

    assert!(matches!(
        kb.build_index(&[0xff, 0xfe, 0x00], "txt"),
        Err(QaError::Extraction(_))
    ));
    assert!(matches!(
        kb.build_index(b"not a pdf", "pdf"),
        Err(QaError::Extraction(_))
    ));

    assert_eq!(kb.search("rockets", 5).expect("search").len(), 2);
}

#[test]
fn k_larger_than_chunk_count() {
    let kb = knowledge_base();
    kb.build_index(TWO_PARAGRAPHS.as_bytes(), "txt")
        .expect("should build index");

    let results = kb.search("paragraph", 10).expect("should search");
    assert_eq!(results.len(), 2);
    assert!(kb.search("paragraph", 0).expect("should search").is_empty());
}

#[test]
fn every_chunk_finds_itself() {
    let kb = knowledge_base();
    let text = "Alpha bravo charlie.\n\nDelta echo foxtrot.\n\nGolf hotel india.";
    kb.build_index(text.as_bytes(), "txt")
        .expect("should build index");

    for chunk in ["Alpha bravo charlie.", "Delta echo foxtrot.", "Golf hotel india."] {
        let results = kb.search(chunk, 1).expect("should search");
        assert_eq!(results, vec![chunk]);
    }
}

#[test]
fn rebuild_replaces_document() {
    let kb = knowledge_base();
    kb.build_named("first.txt", TWO_PARAGRAPHS.as_bytes())
        .expect("should build index");
    kb.build_named("second.txt", b"Only one chunk here.")
        .expect("should rebuild index");

    let results = kb.search("rockets", 5).expect("should search");
    assert_eq!(results, vec!["Only one chunk here."]);
    assert_eq!(
        kb.status().expect("status"),
        KnowledgeStatus::Ready {
            chunk_count: 1,
            dimension: TEST_DIMENSION,
            source: Some("second.txt".to_string()),
        }
    );
}

#[test]
fn embedding_failure_surfaces() {
    let kb = KnowledgeBase::new(Arc::new(FailingEmbedder), ChunkingConfig::default());
    assert!(matches!(
        kb.build_index(TWO_PARAGRAPHS.as_bytes(), "txt"),
        Err(QaError::Embedding(_))
    ));
    assert_eq!(kb.status().expect("status"), KnowledgeStatus::Empty);
}

#[test]
fn concurrent_searches_see_whole_snapshots() {
    let kb = knowledge_base();
    let first = "Apples grow on trees.\n\nApples are red.";
    let second = "Boats float on water.\n\nBoats are slow.\n\nBoats need sails.";
    kb.build_index(first.as_bytes(), "txt")
        .expect("should build index");

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..10 {
                let doc = if i % 2 == 0 { second } else { first };
                kb.build_index(doc.as_bytes(), "txt")
                    .expect("should rebuild index");
            }
        });

        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..20 {
                    let results = kb.search("apples boats", 10).expect("should search");
                    let all_first = results.iter().all(|r| r.starts_with("Apples"));
                    let all_second = results.iter().all(|r| r.starts_with("Boats"));
                    assert!(
                        (all_first && results.len() == 2) || (all_second && results.len() == 3),
                        "torn read: {:?}",
                        results
                    );
                }
            });
        }
    });
}
