use std::sync::Arc;

use docgen::{
    AddImageOptions, ChapterNumber, DocgenConfig, DocgenError, DocumentId, DocumentManager,
    DocumentStore, DocumentType, FigureId, FilesystemStore, ImagePosition, InMemoryStore,
    SectionNumber, SectionNumbering, TableId,
};
use tempfile::{TempDir, tempdir};

type Manager = DocumentManager<Arc<dyn DocumentStore>>;

/// One manager per store implementation; every scenario runs against both.
fn managers() -> Vec<(&'static str, Manager, TempDir)> {
    let memory_root = tempdir().unwrap();
    let memory = DocumentManager::new(
        Arc::new(InMemoryStore::new()) as Arc<dyn DocumentStore>,
        DocgenConfig::new(memory_root.path()),
    );

    let fs_root = tempdir().unwrap();
    let filesystem = DocumentManager::new(
        Arc::new(FilesystemStore::new(fs_root.path())) as Arc<dyn DocumentStore>,
        DocgenConfig::new(fs_root.path()),
    );

    vec![
        ("memory", memory, memory_root),
        ("filesystem", filesystem, fs_root),
    ]
}

fn ch(n: u32) -> ChapterNumber {
    ChapterNumber::new(n).unwrap()
}

fn sec(s: &str) -> SectionNumber {
    SectionNumber::parse(s).unwrap()
}

fn new_doc(manager: &Manager, title: &str) -> DocumentId {
    manager
        .create_document(title, "Ada Lovelace", DocumentType::Book)
        .unwrap()
}

fn assert_consistent(store: &str, manager: &Manager, doc: &DocumentId) {
    let report = manager.validate(doc).unwrap();
    assert!(report.valid, "[{store}] {:?}", report.errors);
    let manifest = manager.get_manifest(doc).unwrap();
    manifest.check_dense().unwrap();
}

fn chapter_titles(manager: &Manager, doc: &DocumentId) -> Vec<String> {
    manager
        .get_manifest(doc)
        .unwrap()
        .chapters
        .into_iter()
        .map(|entry| entry.title)
        .collect()
}

fn section_numbers(manager: &Manager, doc: &DocumentId, chapter: u32) -> Vec<String> {
    manager
        .get_chapter(doc, ch(chapter))
        .unwrap()
        .sections
        .iter()
        .map(|s| s.number.to_string())
        .collect()
}

#[test]
fn appended_and_inserted_chapters_shift_existing_ones() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Ordering Guide");

        assert_eq!(manager.add_chapter(&doc, "Intro", None).unwrap(), ch(1));
        assert_eq!(manager.add_chapter(&doc, "Setup", Some(1)).unwrap(), ch(1));

        assert_eq!(chapter_titles(&manager, &doc), vec!["Setup", "Intro"], "[{store}]");
        assert_eq!(manager.get_chapter(&doc, ch(2)).unwrap().title, "Intro");
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn inserting_in_the_middle_relabels_sections_figures_and_tables() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Middle Insert");
        manager.add_chapter(&doc, "One", None).unwrap();
        manager.add_chapter(&doc, "Two", None).unwrap();
        manager
            .add_section(&doc, ch(2), "Basics", "Two basics.", 1)
            .unwrap();
        manager
            .add_image(&doc, ch(2), AddImageOptions::new("img/a.png", "A diagram"))
            .unwrap();
        manager
            .add_table(&doc, ch(2), "Numbers", "| a | b |\n|---|---|\n| 1 | 2 |")
            .unwrap();

        manager.add_chapter(&doc, "Inserted", Some(2)).unwrap();

        let moved = manager.get_chapter(&doc, ch(3)).unwrap();
        assert_eq!(moved.title, "Two", "[{store}]");
        assert_eq!(moved.sections[0].number.to_string(), "3.1");
        assert_eq!(moved.sections[0].content, "Two basics.");
        assert_eq!(moved.figures[0].id.as_str(), "fig-3.1");
        assert_eq!(moved.tables[0].id.as_str(), "table-3.1");
        assert!(manager.get_chapter(&doc, ch(2)).unwrap().sections.is_empty());
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn insert_position_past_the_end_is_rejected() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Bad Position");
        manager.add_chapter(&doc, "Only", None).unwrap();

        for position in [0, 3] {
            let err = manager
                .add_chapter(&doc, "Nope", Some(position))
                .unwrap_err();
            assert!(matches!(err, DocgenError::ValidationFailed(_)), "[{store}] {err}");
        }
        assert_eq!(chapter_titles(&manager, &doc), vec!["Only"]);
        assert!(manager.add_chapter(&doc, "Tail", Some(2)).is_ok());
    }
}

#[test]
fn section_numbers_follow_the_outline() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Sections");
        manager.add_chapter(&doc, "Intro", None).unwrap();

        let first = manager.add_section(&doc, ch(1), "A", "a", 1).unwrap();
        let second = manager.add_section(&doc, ch(1), "B", "b", 1).unwrap();
        assert_eq!(first, sec("1.1"));
        assert_eq!(second, sec("1.2"));

        let third = manager.add_section(&doc, ch(1), "C", "c", 1).unwrap();
        assert_eq!(third.to_string(), "1.3", "[{store}]");
        let nested = manager.add_section(&doc, ch(1), "C.1", "c1", 2).unwrap();
        assert_eq!(nested.to_string(), "1.3.1", "[{store}]");

        let manifest = manager.get_manifest(&doc).unwrap();
        assert_eq!(manifest.entry(ch(1)).unwrap().counts.sections, 4);
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn deep_section_in_empty_chapter_starts_a_branch_of_ones() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Deep");
        manager.add_chapter(&doc, "One", None).unwrap();
        manager.add_chapter(&doc, "Two", None).unwrap();

        let deep = manager.add_section(&doc, ch(2), "Deep", "x", 4).unwrap();
        assert_eq!(deep.to_string(), "2.1.1.1.1", "[{store}]");
        let sibling = manager.add_section(&doc, ch(2), "Deeper", "y", 4).unwrap();
        assert_eq!(sibling.to_string(), "2.1.1.1.2");
    }
}

#[test]
fn invalid_section_requests_fail_before_mutation() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Invalid Sections");
        manager.add_chapter(&doc, "One", None).unwrap();

        for level in [0, 7] {
            let err = manager
                .add_section(&doc, ch(1), "T", "c", level)
                .unwrap_err();
            assert!(matches!(err, DocgenError::ValidationFailed(_)), "[{store}] {err}");
        }
        assert!(matches!(
            manager.add_section(&doc, ch(1), "", "c", 1).unwrap_err(),
            DocgenError::ValidationFailed(_)
        ));
        assert!(matches!(
            manager.add_section(&doc, ch(1), "T", "  ", 1).unwrap_err(),
            DocgenError::ValidationFailed(_)
        ));
        assert!(matches!(
            manager.add_section(&doc, ch(9), "T", "c", 1).unwrap_err(),
            DocgenError::NotFound { entity: "chapter", .. }
        ));
        assert!(section_numbers(&manager, &doc, 1).is_empty());
    }
}

#[test]
fn update_section_requires_exact_number() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Updates");
        manager.add_chapter(&doc, "One", None).unwrap();
        manager.add_section(&doc, ch(1), "A", "first", 1).unwrap();
        manager.add_section(&doc, ch(1), "A.1", "nested", 2).unwrap();

        manager
            .update_section(&doc, ch(1), &sec("1.1"), "rewritten")
            .unwrap();
        assert_eq!(
            manager.get_section(&doc, ch(1), &sec("1.1")).unwrap().content,
            "rewritten",
            "[{store}]"
        );
        assert_eq!(
            manager.get_section(&doc, ch(1), &sec("1.1.1")).unwrap().content,
            "nested"
        );

        let err = manager
            .update_section(&doc, ch(1), &sec("1.2"), "nope")
            .unwrap_err();
        assert!(matches!(err, DocgenError::NotFound { entity: "section", .. }));

        manager
            .update_section_title(&doc, ch(1), &sec("1.1"), "Renamed")
            .unwrap();
        assert_eq!(
            manager.get_section(&doc, ch(1), &sec("1.1")).unwrap().title,
            "Renamed"
        );
    }
}

#[test]
fn deleting_a_section_removes_its_subtree_and_closes_the_gap() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Delete Sections");
        manager.add_chapter(&doc, "One", None).unwrap();
        manager.add_section(&doc, ch(1), "A", "a", 1).unwrap();
        manager.add_section(&doc, ch(1), "B", "b", 1).unwrap();
        manager.add_section(&doc, ch(1), "B.1", "b1", 2).unwrap();
        manager.add_section(&doc, ch(1), "C", "c", 1).unwrap();
        manager.add_section(&doc, ch(1), "C.1", "c1", 2).unwrap();
        assert_eq!(
            section_numbers(&manager, &doc, 1),
            vec!["1.1", "1.2", "1.2.1", "1.3", "1.3.1"]
        );

        let removed = manager.delete_section(&doc, ch(1), &sec("1.2")).unwrap();
        let removed: Vec<_> = removed.iter().map(|n| n.to_string()).collect();
        assert_eq!(removed, vec!["1.2", "1.2.1"], "[{store}]");

        assert_eq!(
            section_numbers(&manager, &doc, 1),
            vec!["1.1", "1.2", "1.2.1"],
            "[{store}]"
        );
        let moved = manager.get_section(&doc, ch(1), &sec("1.2")).unwrap();
        assert_eq!(moved.title, "C");
        assert_eq!(moved.content, "c");
        let child = manager.get_section(&doc, ch(1), &sec("1.2.1")).unwrap();
        assert_eq!(child.content, "c1");

        let manifest = manager.get_manifest(&doc).unwrap();
        assert_eq!(manifest.entry(ch(1)).unwrap().counts.sections, 3);
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn deleting_a_nested_section_leaves_other_branches_alone() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Nested Delete");
        manager.add_chapter(&doc, "One", None).unwrap();
        manager.add_section(&doc, ch(1), "A", "a", 1).unwrap();
        manager.add_section(&doc, ch(1), "A.1", "a1", 2).unwrap();
        manager.add_section(&doc, ch(1), "A.2", "a2", 2).unwrap();
        manager.add_section(&doc, ch(1), "A.3", "a3", 2).unwrap();

        manager.delete_section(&doc, ch(1), &sec("1.1.2")).unwrap();
        assert_eq!(
            section_numbers(&manager, &doc, 1),
            vec!["1.1", "1.1.1", "1.1.2"],
            "[{store}]"
        );
        assert_eq!(
            manager.get_section(&doc, ch(1), &sec("1.1.2")).unwrap().content,
            "a3"
        );
    }
}

#[test]
fn figure_sequences_never_backfill_and_compact_on_delete() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Figures");
        manager.add_chapter(&doc, "One", None).unwrap();
        manager.add_chapter(&doc, "Two", None).unwrap();
        for caption in ["first", "second", "third"] {
            manager
                .add_image(
                    &doc,
                    ch(2),
                    AddImageOptions::new(format!("img/{caption}.png"), caption)
                        .position(ImagePosition::Top),
                )
                .unwrap();
        }

        manager
            .delete_image(&doc, &FigureId::parse("fig-2.2").unwrap())
            .unwrap();
        let chapter = manager.get_chapter(&doc, ch(2)).unwrap();
        let ids: Vec<_> = chapter.figures.iter().map(|f| f.id.to_string()).collect();
        assert_eq!(ids, vec!["fig-2.1", "fig-2.2"], "[{store}]");
        assert_eq!(chapter.figures[1].caption, "third");
        assert_eq!(chapter.figures[1].position, ImagePosition::Top);

        // introduce a gap behind the manager's back
        let mut raw = manager.store().load_chapter_metadata(&doc, ch(2)).unwrap();
        raw.figures[1].sequence = 3;
        raw.figures[1].id = FigureId::parse("fig-2.3").unwrap();
        manager.store().save_chapter_metadata(&doc, &raw).unwrap();

        let next = manager
            .add_image(&doc, ch(2), AddImageOptions::new("img/d.png", "fourth"))
            .unwrap();
        assert_eq!(next.as_str(), "fig-2.4", "[{store}]");

        manager
            .update_image_caption(&doc, &next, "renamed")
            .unwrap();
        let err = manager
            .delete_image(&doc, &FigureId::parse("fig-2.9").unwrap())
            .unwrap_err();
        assert!(matches!(err, DocgenError::NotFound { entity: "figure", .. }));
    }
}

#[test]
fn tables_update_and_compact() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Tables");
        manager.add_chapter(&doc, "One", None).unwrap();
        let first = manager.add_table(&doc, ch(1), "A", "| a |").unwrap();
        let second = manager.add_table(&doc, ch(1), "B", "| b |").unwrap();
        assert_eq!(second.as_str(), "table-1.2");

        manager
            .update_table(&doc, &second, Some("B2"), Some("| b2 |"))
            .unwrap();
        assert!(matches!(
            manager.update_table(&doc, &second, None, None).unwrap_err(),
            DocgenError::ValidationFailed(_)
        ));

        manager.delete_table(&doc, &first).unwrap();
        let chapter = manager.get_chapter(&doc, ch(1)).unwrap();
        assert_eq!(chapter.tables.len(), 1, "[{store}]");
        assert_eq!(chapter.tables[0].id, TableId::parse("table-1.1").unwrap());
        assert_eq!(chapter.tables[0].caption, "B2");
        assert_eq!(chapter.tables[0].content, "| b2 |");
        assert_eq!(chapter.tables[0].format, "markdown");
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn moving_the_last_chapter_first_renumbers_every_chapter() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Move Around");
        for title in ["A", "B", "C"] {
            let n = manager.add_chapter(&doc, title, None).unwrap();
            manager
                .add_section(&doc, n, &format!("{title} body"), title, 1)
                .unwrap();
        }
        manager
            .add_image(&doc, ch(3), AddImageOptions::new("c.png", "C figure"))
            .unwrap();

        manager.move_chapter(&doc, ch(3), ch(1)).unwrap();

        assert_eq!(chapter_titles(&manager, &doc), vec!["C", "A", "B"], "[{store}]");
        let first = manager.get_chapter(&doc, ch(1)).unwrap();
        assert_eq!(first.sections[0].number.to_string(), "1.1");
        assert_eq!(first.sections[0].content, "C");
        assert_eq!(first.figures[0].id.as_str(), "fig-1.1");
        let last = manager.get_chapter(&doc, ch(3)).unwrap();
        assert_eq!(last.title, "B");
        assert_eq!(last.sections[0].number.to_string(), "3.1");
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn moving_forward_and_noop_moves() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Move Forward");
        for title in ["A", "B", "C", "D"] {
            manager.add_chapter(&doc, title, None).unwrap();
        }
        manager.move_chapter(&doc, ch(1), ch(3)).unwrap();
        assert_eq!(
            chapter_titles(&manager, &doc),
            vec!["B", "C", "A", "D"],
            "[{store}]"
        );

        manager.move_chapter(&doc, ch(2), ch(2)).unwrap();
        assert_eq!(chapter_titles(&manager, &doc), vec!["B", "C", "A", "D"]);

        let err = manager.move_chapter(&doc, ch(1), ch(5)).unwrap_err();
        assert!(matches!(err, DocgenError::ValidationFailed(_)));
        assert_consistent(store, &manager, &doc);
    }
}

#[test]
fn deleting_a_chapter_shifts_later_chapters_down() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Delete Chapters");
        for title in ["A", "B", "C", "D"] {
            let n = manager.add_chapter(&doc, title, None).unwrap();
            manager.add_section(&doc, n, "S", title, 1).unwrap();
            manager.add_table(&doc, n, "T", "| x |").unwrap();
        }

        manager.delete_chapter(&doc, ch(2)).unwrap();

        assert_eq!(chapter_titles(&manager, &doc), vec!["A", "C", "D"], "[{store}]");
        let third = manager.get_chapter(&doc, ch(3)).unwrap();
        assert_eq!(third.title, "D");
        assert_eq!(third.sections[0].number.to_string(), "3.1");
        assert_eq!(third.sections[0].content, "D");
        assert_eq!(third.tables[0].id.as_str(), "table-3.1");
        assert!(matches!(
            manager.get_chapter(&doc, ch(4)).unwrap_err(),
            DocgenError::NotFound { .. }
        ));
        assert_consistent(store, &manager, &doc);

        let err = manager.delete_chapter(&doc, ch(7)).unwrap_err();
        assert!(matches!(err, DocgenError::NotFound { entity: "chapter", .. }));
    }
}

#[test]
fn rebuild_is_stable_and_becomes_the_chapter_body() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Rebuild");
        manager.add_chapter(&doc, "Empty Chapter", None).unwrap();
        assert_eq!(
            manager.rebuild_chapter(&doc, ch(1)).unwrap(),
            "# Chapter 1: Empty Chapter\n\n"
        );

        manager
            .add_section(&doc, ch(1), "Definition", "Defined here.", 1)
            .unwrap();
        manager
            .add_section(&doc, ch(1), "Detail", "More detail.", 2)
            .unwrap();
        let first = manager.rebuild_chapter(&doc, ch(1)).unwrap();
        let second = manager.rebuild_chapter(&doc, ch(1)).unwrap();
        assert_eq!(first, second, "[{store}]");
        assert!(first.contains("## 1.1 Definition\n\nDefined here.\n\n"));
        assert!(first.contains("### 1.1.1 Detail\n\nMore detail.\n\n"));
        assert_eq!(manager.get_chapter(&doc, ch(1)).unwrap().body, first);
    }
}

#[test]
fn rebuilt_body_follows_chapter_renumbering() {
    for (store, manager, _root) in managers() {
        let doc = new_doc(&manager, "Body Follows");
        manager.add_chapter(&doc, "Later", None).unwrap();
        manager.add_section(&doc, ch(1), "S", "text", 1).unwrap();
        manager.rebuild_chapter(&doc, ch(1)).unwrap();

        manager.add_chapter(&doc, "Sooner", Some(1)).unwrap();
        let body = manager.get_chapter(&doc, ch(2)).unwrap().body;
        assert!(body.starts_with("# Chapter 2: Later"), "[{store}] {body}");
        assert!(body.contains("## 2.1 S"));
    }
}

#[test]
fn export_writes_combined_markdown() {
    for (store, manager, root) in managers() {
        let doc = new_doc(&manager, "Export Me");
        manager.add_chapter(&doc, "First", None).unwrap();
        manager.add_chapter(&doc, "Second", None).unwrap();
        manager.add_section(&doc, ch(2), "Body", "Second text.", 1).unwrap();

        let path = manager.export_markdown(&doc, None).unwrap();
        assert_eq!(path, root.path().join("exports").join(format!("{doc}.md")));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("---\n"), "[{store}]");
        assert!(text.contains("# Chapter 1: First"));
        assert!(text.contains("## 2.1 Body\n\nSecond text."));

        let only_second = [ch(2)];
        let path = manager.export_markdown(&doc, Some(&only_second[..])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("# Chapter 1: First"));
    }
}

#[test]
fn document_lifecycle_and_limits() {
    let root = tempdir().unwrap();
    let mut config = DocgenConfig::new(root.path());
    config.max_documents = 1;
    let manager = DocumentManager::new(FilesystemStore::new(root.path()), config);

    let doc = manager
        .create_document("Only One", "Ada", DocumentType::Report)
        .unwrap();
    assert!(doc.as_str().starts_with("only-one-"));
    let err = manager
        .create_document("Second One", "Ada", DocumentType::Report)
        .unwrap_err();
    assert!(matches!(err, DocgenError::LimitExceeded { limit: 1 }));

    let listed = manager.list_documents().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].document.doc_type, DocumentType::Report);
    assert_eq!(manager.load_style(&doc).unwrap().font_family, "Times New Roman");
    assert_eq!(manager.load_pandoc_config(&doc).unwrap().toc_depth, 3);

    manager.delete_document(&doc).unwrap();
    assert!(manager.list_documents().unwrap().is_empty());
    assert!(matches!(
        manager.get_manifest(&doc).unwrap_err(),
        DocgenError::NotFound { entity: "document", .. }
    ));
}

#[test]
fn create_document_requires_title_and_author() {
    let manager = DocumentManager::new(InMemoryStore::new(), DocgenConfig::new("/unused"));
    assert!(matches!(
        manager
            .create_document(" ", "Ada", DocumentType::Book)
            .unwrap_err(),
        DocgenError::ValidationFailed(_)
    ));
    assert!(matches!(
        manager
            .create_document("Title", "", DocumentType::Book)
            .unwrap_err(),
        DocgenError::ValidationFailed(_)
    ));
}

#[test]
fn configure_document_replaces_style() {
    let manager = DocumentManager::new(InMemoryStore::new(), DocgenConfig::new("/unused"));
    let doc = manager
        .create_document("Styled", "Ada", DocumentType::Article)
        .unwrap();
    let mut style = manager.load_style(&doc).unwrap();
    style.font_size = "11pt".into();
    manager.configure_document(&doc, Some(&style), None).unwrap();
    assert_eq!(manager.load_style(&doc).unwrap().font_size, "11pt");
    assert_eq!(manager.load_pandoc_config(&doc).unwrap().pdf_engine, "pdflatex");
}

#[test]
fn global_scan_strategy_is_selectable() {
    let manager = DocumentManager::new(InMemoryStore::new(), DocgenConfig::new("/unused"))
        .with_numbering(SectionNumbering::GlobalScan);
    let doc = manager
        .create_document("Scan", "Ada", DocumentType::Book)
        .unwrap();
    manager.add_chapter(&doc, "One", None).unwrap();
    for (title, level) in [("A", 1), ("B", 1), ("B.1", 2), ("B.2", 2), ("C", 1)] {
        manager.add_section(&doc, ch(1), title, "x", level).unwrap();
    }
    let next = manager.add_section(&doc, ch(1), "?", "x", 2).unwrap();
    assert_eq!(next.to_string(), "1.3.3");
}

#[test]
fn missing_document_is_reported_for_every_operation() {
    let manager = DocumentManager::new(InMemoryStore::new(), DocgenConfig::new("/unused"));
    let ghost = DocumentId::parse("ghost").unwrap();
    for err in [
        manager.add_chapter(&ghost, "x", None).unwrap_err(),
        manager.delete_chapter(&ghost, ch(1)).unwrap_err(),
        manager.add_section(&ghost, ch(1), "t", "c", 1).unwrap_err(),
        manager.rebuild_all(&ghost).unwrap_err(),
    ] {
        assert!(
            matches!(err, DocgenError::NotFound { entity: "document", .. }),
            "{err}"
        );
    }
}
