//! Persistence port for documents and the adapters that implement it.
//!
//! The mutator only ever talks to [`DocumentStore`]; the filesystem layout and
//! the in-memory maps are interchangeable behind it. Renaming a chapter is a
//! single call so the mutator can sequence multi-step shifts itself.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    Chapter, ChapterNumber, DocumentId, Manifest, PandocConfig, SectionNumber, Style,
};

mod filesystem;
mod memory;

pub use filesystem::FilesystemStore;
pub use memory::InMemoryStore;

pub trait DocumentStore: Send + Sync {
    /// Creates the document's storage and writes its initial manifest.
    fn create_document(&self, manifest: &Manifest) -> Result<()>;
    fn document_exists(&self, doc: &DocumentId) -> Result<bool>;
    fn delete_document(&self, doc: &DocumentId) -> Result<()>;
    fn list_documents(&self) -> Result<Vec<DocumentId>>;

    fn create_chapter(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()>;
    fn chapter_exists(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<bool>;
    fn delete_chapter(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<()>;
    /// Moves every stored artifact of `from` to `to`. Fails if `to` is occupied.
    fn rename_chapter(&self, doc: &DocumentId, from: ChapterNumber, to: ChapterNumber)
    -> Result<()>;

    /// Persists chapter metadata. Body and section content are stored separately.
    fn save_chapter_metadata(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()>;
    fn load_chapter_metadata(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<Chapter>;
    fn save_chapter_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        content: &str,
    ) -> Result<()>;
    /// Returns an empty string when no body has been written yet.
    fn load_chapter_content(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<String>;

    fn save_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
        content: &str,
    ) -> Result<()>;
    fn load_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<String>;
    /// Removing content that does not exist is not an error.
    fn delete_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<()>;
    fn rename_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        from: &SectionNumber,
        to: &SectionNumber,
    ) -> Result<()>;

    fn save_manifest(&self, manifest: &Manifest) -> Result<()>;
    fn load_manifest(&self, doc: &DocumentId) -> Result<Manifest>;

    fn save_style(&self, doc: &DocumentId, style: &Style) -> Result<()>;
    fn load_style(&self, doc: &DocumentId) -> Result<Style>;
    fn save_pandoc_config(&self, doc: &DocumentId, config: &PandocConfig) -> Result<()>;
    fn load_pandoc_config(&self, doc: &DocumentId) -> Result<PandocConfig>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn create_document(&self, manifest: &Manifest) -> Result<()> {
        (**self).create_document(manifest)
    }

    fn document_exists(&self, doc: &DocumentId) -> Result<bool> {
        (**self).document_exists(doc)
    }

    fn delete_document(&self, doc: &DocumentId) -> Result<()> {
        (**self).delete_document(doc)
    }

    fn list_documents(&self) -> Result<Vec<DocumentId>> {
        (**self).list_documents()
    }

    fn create_chapter(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()> {
        (**self).create_chapter(doc, chapter)
    }

    fn chapter_exists(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<bool> {
        (**self).chapter_exists(doc, chapter)
    }

    fn delete_chapter(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<()> {
        (**self).delete_chapter(doc, chapter)
    }

    fn rename_chapter(
        &self,
        doc: &DocumentId,
        from: ChapterNumber,
        to: ChapterNumber,
    ) -> Result<()> {
        (**self).rename_chapter(doc, from, to)
    }

    fn save_chapter_metadata(&self, doc: &DocumentId, chapter: &Chapter) -> Result<()> {
        (**self).save_chapter_metadata(doc, chapter)
    }

    fn load_chapter_metadata(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<Chapter> {
        (**self).load_chapter_metadata(doc, chapter)
    }

    fn save_chapter_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        content: &str,
    ) -> Result<()> {
        (**self).save_chapter_content(doc, chapter, content)
    }

    fn load_chapter_content(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<String> {
        (**self).load_chapter_content(doc, chapter)
    }

    fn save_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
        content: &str,
    ) -> Result<()> {
        (**self).save_section_content(doc, chapter, section, content)
    }

    fn load_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<String> {
        (**self).load_section_content(doc, chapter, section)
    }

    fn delete_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> Result<()> {
        (**self).delete_section_content(doc, chapter, section)
    }

    fn rename_section_content(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        from: &SectionNumber,
        to: &SectionNumber,
    ) -> Result<()> {
        (**self).rename_section_content(doc, chapter, from, to)
    }

    fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        (**self).save_manifest(manifest)
    }

    fn load_manifest(&self, doc: &DocumentId) -> Result<Manifest> {
        (**self).load_manifest(doc)
    }

    fn save_style(&self, doc: &DocumentId, style: &Style) -> Result<()> {
        (**self).save_style(doc, style)
    }

    fn load_style(&self, doc: &DocumentId) -> Result<Style> {
        (**self).load_style(doc)
    }

    fn save_pandoc_config(&self, doc: &DocumentId, config: &PandocConfig) -> Result<()> {
        (**self).save_pandoc_config(doc, config)
    }

    fn load_pandoc_config(&self, doc: &DocumentId) -> Result<PandocConfig> {
        (**self).load_pandoc_config(doc)
    }
}

/// Copy of `chapter` without the body and section content that live outside metadata.
pub(crate) fn metadata_only(chapter: &Chapter) -> Chapter {
    let mut stored = chapter.clone();
    stored.body.clear();
    for section in &mut stored.sections {
        section.content.clear();
    }
    stored
}
