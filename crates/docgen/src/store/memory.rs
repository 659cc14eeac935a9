use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{DocumentStore, metadata_only};
use crate::error::{DocgenError, Result};
use crate::model::{
    Chapter, ChapterNumber, DocumentId, Manifest, PandocConfig, SectionNumber, Style,
};

#[derive(Clone)]
struct StoredChapter {
    metadata: Chapter,
    body: String,
    sections: BTreeMap<SectionNumber, String>,
}

#[derive(Clone)]
struct StoredDocument {
    manifest: Manifest,
    style: Option<Style>,
    pandoc: Option<PandocConfig>,
    chapters: BTreeMap<ChapterNumber, StoredChapter>,
}

/// Map-backed store for tests and embedding; nothing touches the filesystem.
#[derive(Default)]
pub struct InMemoryStore {
    documents: Mutex<BTreeMap<DocumentId, StoredDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_document<T>(
        &self,
        doc: &DocumentId,
        f: impl FnOnce(&mut StoredDocument) -> Result<T>,
    ) -> Result<T> {
        let mut documents = self.documents.lock();
        let stored = documents
            .get_mut(doc)
            .ok_or_else(|| DocgenError::not_found("document", doc))?;
        f(stored)
    }

    fn with_chapter<T>(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        f: impl FnOnce(&mut StoredChapter) -> Result<T>,
    ) -> Result<T> {
        self.with_document(doc, |stored| {
            let entry = stored
                .chapters
                .get_mut(&chapter)
                .ok_or_else(|| DocgenError::not_found("chapter", chapter))?;
            f(entry)
        })
    }
}

impl DocumentStore for InMemoryStore {
    fn create_document(&self, manifest: &Manifest) -> Result<()> {
        let mut documents = self.documents.lock();
        let id = &manifest.document.id;
        if documents.contains_key(id) {
            return Err(DocgenError::Storage(format!("document {id} already exists")));
        }
        documents.insert(
            id.clone(),
            StoredDocument {
                manifest: manifest.clone(),
                style: None,
                pandoc: None,
                chapters: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn document_exists(&self, doc: &DocumentId) -> Result<bool> {
        Ok(self.documents.lock().contains_key(doc))
    }

    fn delete_document(&self, doc: &DocumentId) -> Result<()> {
        self.documents
            .lock()
            .remove(doc)
            .map(|_| ())
            .ok_or_else(|| DocgenError::not_found("document", doc))
    }

    fn list_documents(&self) -> Result<Vec<DocumentId>> {
        Ok(self.documents.lock().keys().cloned().collect())
    }

    fn create_chapter(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()> {
        self.with_document(doc, |stored| {
            if stored.chapters.contains_key(&chapter.number) {
                return Err(DocgenError::Storage(format!(
                    "chapter {} already exists",
                    chapter.number
                )));
            }
            stored.chapters.insert(
                chapter.number,
                StoredChapter {
                    metadata: metadata_only(chapter),
                    body: String::new(),
                    sections: BTreeMap::new(),
                },
            );
            Ok(())
        })
    }

    fn chapter_exists(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<bool> {
        self.with_document(doc, |stored| Ok(stored.chapters.contains_key(&chapter)))
    }

    fn delete_chapter(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<()> {
        self.with_document(doc, |stored| {
            stored
                .chapters
                .remove(&chapter)
                .map(|_| ())
                .ok_or_else(|| DocgenError::not_found("chapter", chapter))
        })
    }

    fn rename_chapter(
        &self,
        doc: &DocumentId,
        from: ChapterNumber,
        to: ChapterNumber,
    ) -> Result<()> {
        self.with_document(doc, |stored| {
            if stored.chapters.contains_key(&to) {
                return Err(DocgenError::Storage(format!(
                    "cannot rename chapter {from} to {to}: target exists"
                )));
            }
            let moved = stored
                .chapters
                .remove(&from)
                .ok_or_else(|| DocgenError::not_found("chapter", from))?;
            stored.chapters.insert(to, moved);
            Ok(())
        })
    }

    fn save_chapter_metadata(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()> {
        self.with_chapter(doc, chapter.number, |stored| {
            stored.metadata = metadata_only(chapter);
            Ok(())
        })
    }

    fn load_chapter_metadata(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<Chapter> {
        self.with_chapter(doc, chapter, |stored| Ok(stored.metadata.clone()))
    }

    fn save_chapter_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        content: &str,
    ) -> Result<()> {
        self.with_chapter(doc, chapter, |stored| {
            stored.body = content.to_string();
            Ok(())
        })
    }

    fn load_chapter_content(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<String> {
        self.with_chapter(doc, chapter, |stored| Ok(stored.body.clone()))
    }

    fn save_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
        content: &str,
    ) -> Result<()> {
        self.with_chapter(doc, chapter, |stored| {
            stored.sections.insert(section.clone(), content.to_string());
            Ok(())
        })
    }

    fn load_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<String> {
        self.with_chapter(doc, chapter, |stored| {
            stored
                .sections
                .get(section)
                .cloned()
                .ok_or_else(|| DocgenError::not_found("section", section))
        })
    }

    fn delete_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<()> {
        self.with_chapter(doc, chapter, |stored| {
            stored.sections.remove(section);
            Ok(())
        })
    }

    fn rename_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        from: &SectionNumber,
        to: &SectionNumber,
    ) -> Result<()> {
        self.with_chapter(doc, chapter, |stored| {
            if stored.sections.contains_key(to) {
                return Err(DocgenError::Storage(format!(
                    "cannot rename section {from} to {to}: target exists"
                )));
            }
            let content = stored
                .sections
                .remove(from)
                .ok_or_else(|| DocgenError::not_found("section", from))?;
            stored.sections.insert(to.clone(), content);
            Ok(())
        })
    }

    fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.with_document(&manifest.document.id, |stored| {
            stored.manifest = manifest.clone();
            Ok(())
        })
    }

    fn load_manifest(&self, doc: &DocumentId) -> Result<Manifest> {
        self.with_document(doc, |stored| Ok(stored.manifest.clone()))
    }

    fn save_style(&self, doc: &DocumentId, style: &Style) -> Result<()> {
        self.with_document(doc, |stored| {
            stored.style = Some(style.clone());
            Ok(())
        })
    }

    fn load_style(&self, doc: &DocumentId) -> Result<Style> {
        self.with_document(doc, |stored| {
            stored
                .style
                .clone()
                .ok_or_else(|| DocgenError::not_found("style for document", doc))
        })
    }

    fn save_pandoc_config(&self, doc: &DocumentId, config: &PandocConfig) -> Result<()> {
        self.with_document(doc, |stored| {
            stored.pandoc = Some(config.clone());
            Ok(())
        })
    }

    fn load_pandoc_config(&self, doc: &DocumentId) -> Result<PandocConfig> {
        self.with_document(doc, |stored| {
            stored
                .pandoc
                .clone()
                .ok_or_else(|| DocgenError::not_found("pandoc config for document", doc))
        })
    }
}
