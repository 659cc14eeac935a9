use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{DocumentStore, metadata_only};
use crate::config::StoragePaths;
use crate::error::{DocgenError, Result};
use crate::model::{
    Chapter, ChapterNumber, DocumentId, Manifest, PandocConfig, SectionNumber, Style,
};

/// Stores each document as a directory tree of YAML metadata and markdown files.
pub struct FilesystemStore {
    paths: StoragePaths,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: StoragePaths::new(root),
        }
    }

    pub fn with_paths(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    fn ensure_document(&self, doc: &DocumentId) -> Result<()> {
        if self.paths.manifest_file(doc).is_file() {
            Ok(())
        } else {
            Err(DocgenError::not_found("document", doc))
        }
    }

    fn ensure_chapter(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<PathBuf> {
        self.ensure_document(doc)?;
        let dir = self.paths.chapter_dir(doc, chapter);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(DocgenError::not_found("chapter", chapter))
        }
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_yaml::to_string(value)?;
    write_file(path, &body)
}

fn read_yaml<T: DeserializeOwned>(
    path: &Path,
    entity: &'static str,
    key: impl std::fmt::Display,
) -> Result<T> {
    let raw = read_file(path, entity, key)?;
    serde_yaml::from_str(&raw)
        .map_err(|err| DocgenError::from(err).context(path.display()))
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, body)?;
    Ok(())
}

fn read_file(path: &Path, entity: &'static str, key: impl std::fmt::Display) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(raw),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(DocgenError::not_found(entity, key)),
        Err(err) => Err(err.into()),
    }
}

impl DocumentStore for FilesystemStore {
    fn create_document(&self, manifest: &Manifest) -> Result<()> {
        let doc = &manifest.document.id;
        let dir = self.paths.document_dir(doc);
        if dir.exists() {
            return Err(DocgenError::Storage(format!(
                "document directory {} already exists",
                dir.display()
            )));
        }
        fs::create_dir_all(self.paths.chapters_dir(doc))?;
        fs::create_dir_all(self.paths.assets_dir(doc))?;
        write_yaml(&self.paths.manifest_file(doc), manifest)
    }

    fn document_exists(&self, doc: &DocumentId) -> Result<bool> {
        Ok(self.paths.manifest_file(doc).is_file())
    }

    fn delete_document(&self, doc: &DocumentId) -> Result<()> {
        self.ensure_document(doc)?;
        fs::remove_dir_all(self.paths.document_dir(doc))?;
        Ok(())
    }

    fn list_documents(&self) -> Result<Vec<DocumentId>> {
        let root = self.paths.root();
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            // exports/ and stray folders have no manifest
            let Ok(id) = DocumentId::parse(name) else {
                continue;
            };
            if self.paths.manifest_file(&id).is_file() {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn create_chapter(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()> {
        self.ensure_document(doc)?;
        let dir = self.paths.chapter_dir(doc, chapter.number);
        if dir.exists() {
            return Err(DocgenError::Storage(format!(
                "chapter directory {} already exists",
                dir.display()
            )));
        }
        fs::create_dir_all(self.paths.sections_dir(doc, chapter.number))?;
        write_yaml(
            &self.paths.chapter_metadata_file(doc, chapter.number),
            &metadata_only(chapter),
        )?;
        write_file(
            &self.paths.chapter_content_file(doc, chapter.number),
            &chapter.body,
        )
    }

    fn chapter_exists(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<bool> {
        self.ensure_document(doc)?;
        Ok(self.paths.chapter_dir(doc, chapter).is_dir())
    }

    fn delete_chapter(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<()> {
        let dir = self.ensure_chapter(doc, chapter)?;
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    fn rename_chapter(
        &self,
        doc: &DocumentId,
        from: ChapterNumber,
        to: ChapterNumber,
    ) -> Result<()> {
        let source = self.ensure_chapter(doc, from)?;
        let target = self.paths.chapter_dir(doc, to);
        if target.exists() {
            return Err(DocgenError::Storage(format!(
                "cannot rename chapter {from} to {to}: {} exists",
                target.display()
            )));
        }
        fs::rename(&source, &target)
            .map_err(|err| DocgenError::Storage(format!("rename chapter {from} -> {to}: {err}")))
    }

    fn save_chapter_metadata(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()> {
        self.ensure_chapter(doc, chapter.number)?;
        write_yaml(
            &self.paths.chapter_metadata_file(doc, chapter.number),
            &metadata_only(chapter),
        )
    }

    fn load_chapter_metadata(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<Chapter> {
        self.ensure_document(doc)?;
        read_yaml(
            &self.paths.chapter_metadata_file(doc, chapter),
            "chapter",
            chapter,
        )
    }

    fn save_chapter_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        content: &str,
    ) -> Result<()> {
        self.ensure_chapter(doc, chapter)?;
        write_file(&self.paths.chapter_content_file(doc, chapter), content)
    }

    fn load_chapter_content(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<String> {
        self.ensure_chapter(doc, chapter)?;
        match read_file(&self.paths.chapter_content_file(doc, chapter), "chapter", chapter) {
            Err(DocgenError::NotFound { .. }) => Ok(String::new()),
            other => other,
        }
    }

    fn save_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
        content: &str,
    ) -> Result<()> {
        self.ensure_chapter(doc, chapter)?;
        write_file(&self.paths.section_file(doc, chapter, section), content)
    }

    fn load_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<String> {
        self.ensure_chapter(doc, chapter)?;
        read_file(
            &self.paths.section_file(doc, chapter, section),
            "section",
            section,
        )
    }

    fn delete_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<()> {
        self.ensure_chapter(doc, chapter)?;
        match fs::remove_file(self.paths.section_file(doc, chapter, section)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn rename_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        from: &SectionNumber,
        to: &SectionNumber,
    ) -> Result<()> {
        self.ensure_chapter(doc, chapter)?;
        let source = self.paths.section_file(doc, chapter, from);
        let target = self.paths.section_file(doc, chapter, to);
        if !source.is_file() {
            return Err(DocgenError::not_found("section", from));
        }
        if target.exists() {
            return Err(DocgenError::Storage(format!(
                "cannot rename section {from} to {to}: target exists"
            )));
        }
        fs::rename(&source, &target)
            .map_err(|err| DocgenError::Storage(format!("rename section {from} -> {to}: {err}")))
    }

    fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        let doc = &manifest.document.id;
        self.ensure_document(doc)?;
        write_yaml(&self.paths.manifest_file(doc), manifest)
    }

    fn load_manifest(&self, doc: &DocumentId) -> Result<Manifest> {
        read_yaml(&self.paths.manifest_file(doc), "document", doc)
    }

    fn save_style(&self, doc: &DocumentId, style: &Style) -> Result<()> {
        self.ensure_document(doc)?;
        write_yaml(&self.paths.style_file(doc), style)
    }

    fn load_style(&self, doc: &DocumentId) -> Result<Style> {
        self.ensure_document(doc)?;
        read_yaml(&self.paths.style_file(doc), "style for document", doc)
    }

    fn save_pandoc_config(&self, doc: &DocumentId, config: &PandocConfig) -> Result<()> {
        self.ensure_document(doc)?;
        write_yaml(&self.paths.pandoc_config_file(doc), config)
    }

    fn load_pandoc_config(&self, doc: &DocumentId) -> Result<PandocConfig> {
        self.ensure_document(doc)?;
        read_yaml(
            &self.paths.pandoc_config_file(doc),
            "pandoc config for document",
            doc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentInfo, DocumentType};
    use chrono::Utc;
    use tempfile::tempdir;

    fn manifest(id: &str) -> Manifest {
        let now = Utc::now();
        Manifest::new(DocumentInfo {
            id: DocumentId::parse(id).unwrap(),
            title: "Guide".into(),
            author: "Ada".into(),
            doc_type: DocumentType::Book,
            created_at: now,
            updated_at: now,
        })
    }

    fn ch(n: u32) -> ChapterNumber {
        ChapterNumber::new(n).unwrap()
    }

    #[test]
    fn create_document_lays_out_directories() {
        let temp = tempdir().unwrap();
        let store = FilesystemStore::new(temp.path());
        let m = manifest("guide");
        store.create_document(&m).unwrap();

        let root = temp.path().join("guide");
        assert!(root.join("manifest.yaml").is_file());
        assert!(root.join("chapters").is_dir());
        assert!(root.join("assets").join("images").is_dir());
        assert_eq!(store.load_manifest(&m.document.id).unwrap(), m);
        assert!(store.create_document(&m).is_err());
    }

    #[test]
    fn chapter_files_use_padded_directories() {
        let temp = tempdir().unwrap();
        let store = FilesystemStore::new(temp.path());
        let m = manifest("guide");
        let doc = m.document.id.clone();
        store.create_document(&m).unwrap();

        let mut chapter = Chapter::new(ch(3), "Three", Utc::now());
        chapter.body = "# Chapter 3: Three\n\n".into();
        store.create_chapter(&doc, &chapter).unwrap();

        let dir = temp.path().join("guide").join("chapters").join("03");
        assert!(dir.join("metadata.yaml").is_file());
        assert!(dir.join("sections").is_dir());
        assert_eq!(
            fs::read_to_string(dir.join("chapter.md")).unwrap(),
            "# Chapter 3: Three\n\n"
        );
        let metadata = fs::read_to_string(dir.join("metadata.yaml")).unwrap();
        assert!(!metadata.contains("# Chapter"));
    }

    #[test]
    fn rename_chapter_moves_the_whole_directory() {
        let temp = tempdir().unwrap();
        let store = FilesystemStore::new(temp.path());
        let m = manifest("guide");
        let doc = m.document.id.clone();
        store.create_document(&m).unwrap();
        store
            .create_chapter(&doc, &Chapter::new(ch(1), "One", Utc::now()))
            .unwrap();
        let section = SectionNumber::parse("1.1").unwrap();
        store
            .save_section_content(&doc, ch(1), &section, "text")
            .unwrap();

        store.rename_chapter(&doc, ch(1), ch(2)).unwrap();
        assert!(!store.chapter_exists(&doc, ch(1)).unwrap());
        assert_eq!(
            store.load_section_content(&doc, ch(2), &section).unwrap(),
            "text"
        );

        store
            .create_chapter(&doc, &Chapter::new(ch(1), "New", Utc::now()))
            .unwrap();
        let err = store.rename_chapter(&doc, ch(1), ch(2)).unwrap_err();
        assert!(matches!(err, DocgenError::Storage(_)));
    }

    #[test]
    fn list_documents_skips_exports_and_stray_folders() {
        let temp = tempdir().unwrap();
        let store = FilesystemStore::new(temp.path());
        store.create_document(&manifest("beta")).unwrap();
        store.create_document(&manifest("alpha")).unwrap();
        fs::create_dir_all(temp.path().join("exports")).unwrap();
        fs::create_dir_all(temp.path().join("not a doc")).unwrap();

        let ids: Vec<_> = store
            .list_documents()
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
    }

    #[test]
    fn missing_files_map_to_not_found() {
        let temp = tempdir().unwrap();
        let store = FilesystemStore::new(temp.path());
        let m = manifest("guide");
        let doc = m.document.id.clone();
        assert!(matches!(
            store.load_manifest(&doc).unwrap_err(),
            DocgenError::NotFound { entity: "document", .. }
        ));
        store.create_document(&m).unwrap();
        assert!(matches!(
            store.load_chapter_metadata(&doc, ch(9)).unwrap_err(),
            DocgenError::NotFound { entity: "chapter", .. }
        ));
        assert!(matches!(
            store.load_style(&doc).unwrap_err(),
            DocgenError::NotFound { .. }
        ));
    }

    #[test]
    fn style_and_pandoc_config_round_trip_as_yaml() {
        let temp = tempdir().unwrap();
        let store = FilesystemStore::new(temp.path());
        let m = manifest("guide");
        let doc = m.document.id.clone();
        store.create_document(&m).unwrap();

        let mut style = Style::default();
        style.font_size = "11pt".into();
        store.save_style(&doc, &style).unwrap();
        store
            .save_pandoc_config(&doc, &PandocConfig::default())
            .unwrap();

        assert_eq!(store.load_style(&doc).unwrap(), style);
        assert_eq!(
            store.load_pandoc_config(&doc).unwrap(),
            PandocConfig::default()
        );
        assert!(temp.path().join("guide").join("pandoc-config.yaml").is_file());
    }
}
