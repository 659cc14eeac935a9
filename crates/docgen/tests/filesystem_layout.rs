use docgen::{
    ChapterNumber, DocgenConfig, DocumentManager, DocumentType, FilesystemStore, SectionNumber,
    StoragePaths,
};
use tempfile::tempdir;

fn ch(n: u32) -> ChapterNumber {
    ChapterNumber::new(n).unwrap()
}

#[test]
fn chapter_directories_follow_renumbering() {
    let root = tempdir().unwrap();
    let manager = DocumentManager::new(
        FilesystemStore::new(root.path()),
        DocgenConfig::new(root.path()),
    );
    let paths = StoragePaths::new(root.path());

    let doc = manager
        .create_document("Disk Layout", "Grace", DocumentType::Book)
        .unwrap();
    assert!(paths.manifest_file(&doc).is_file());
    assert!(paths.style_file(&doc).is_file());
    assert!(paths.pandoc_config_file(&doc).is_file());

    manager.add_chapter(&doc, "Alpha", None).unwrap();
    manager
        .add_section(&doc, ch(1), "Alpha body", "alpha", 1)
        .unwrap();
    assert!(paths.chapter_metadata_file(&doc, ch(1)).is_file());
    let alpha_file = paths.section_file(&doc, ch(1), &SectionNumber::parse("1.1").unwrap());
    assert_eq!(std::fs::read_to_string(&alpha_file).unwrap(), "alpha");

    manager.add_chapter(&doc, "Before", Some(1)).unwrap();

    let shifted = paths.section_file(&doc, ch(2), &SectionNumber::parse("2.1").unwrap());
    assert_eq!(std::fs::read_to_string(&shifted).unwrap(), "alpha");
    assert!(!paths.sections_dir(&doc, ch(1)).join("1.1.md").exists());
    assert!(paths.chapter_dir(&doc, ch(1)).ends_with("chapters/01"));
    assert!(paths.chapter_dir(&doc, ch(2)).is_dir());

    let metadata = std::fs::read_to_string(paths.chapter_metadata_file(&doc, ch(2))).unwrap();
    assert!(metadata.contains("title: Alpha"));
    assert!(!metadata.contains("alpha\n"), "content must not leak into metadata");
}

#[test]
fn deleted_sections_leave_no_orphan_files() {
    let root = tempdir().unwrap();
    let manager = DocumentManager::new(
        FilesystemStore::new(root.path()),
        DocgenConfig::new(root.path()),
    );
    let paths = StoragePaths::new(root.path());
    let doc = manager
        .create_document("Orphans", "Grace", DocumentType::Article)
        .unwrap();
    manager.add_chapter(&doc, "Only", None).unwrap();
    manager.add_section(&doc, ch(1), "A", "a", 1).unwrap();
    manager.add_section(&doc, ch(1), "A.1", "a1", 2).unwrap();
    manager.add_section(&doc, ch(1), "B", "b", 1).unwrap();

    manager
        .delete_section(&doc, ch(1), &SectionNumber::parse("1.1").unwrap())
        .unwrap();

    let mut files: Vec<_> = std::fs::read_dir(paths.sections_dir(&doc, ch(1)))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["1.1.md"]);
    let section = SectionNumber::parse("1.1").unwrap();
    assert_eq!(
        std::fs::read_to_string(paths.section_file(&doc, ch(1), &section)).unwrap(),
        "b"
    );
}

#[test]
fn listing_skips_directories_without_a_manifest() {
    let root = tempdir().unwrap();
    let manager = DocumentManager::new(
        FilesystemStore::new(root.path()),
        DocgenConfig::new(root.path()),
    );
    let doc = manager
        .create_document("Listed", "Grace", DocumentType::Letter)
        .unwrap();
    std::fs::create_dir_all(root.path().join("stray")).unwrap();
    manager.export_markdown(&doc, None).unwrap();

    let listed = manager.list_documents().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].document.id, doc);
}
