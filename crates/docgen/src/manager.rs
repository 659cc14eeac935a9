use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::assemble::MarkdownAssembler;
use crate::config::DocgenConfig;
use crate::error::{DocgenError, Result};
use crate::model::{
    Chapter, ChapterNumber, Document, DocumentId, DocumentInfo, DocumentType, Figure, FigureId,
    ImageAlignment, ImagePosition, Manifest, PandocConfig, Section, SectionNumber, Style, Table,
    TableId,
};
use crate::numbering::{
    ChapterRenamePlan, SectionNumbering, compact_figures, compact_tables, next_sequence,
    renumber_after_section_delete, validate_level,
};
use crate::outline::Outline;
use crate::rebuild::render_chapter;
use crate::store::DocumentStore;
use crate::validation::{ValidationReport, validate_document};

/// Inputs for [`DocumentManager::add_image`].
#[derive(Clone, Debug, PartialEq)]
pub struct AddImageOptions {
    pub image_path: String,
    pub caption: String,
    pub position: ImagePosition,
    pub alignment: ImageAlignment,
    pub width: Option<String>,
}

impl AddImageOptions {
    pub fn new(image_path: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            caption: caption.into(),
            position: ImagePosition::default(),
            alignment: ImageAlignment::default(),
            width: None,
        }
    }

    pub fn position(mut self, position: ImagePosition) -> Self {
        self.position = position;
        self
    }

    pub fn alignment(mut self, alignment: ImageAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }
}

/// Applies structural edits to documents held in a [`DocumentStore`].
///
/// Every operation validates its input before touching storage, derives new
/// numbers from the numbering engine, persists the affected chapter, and
/// keeps the manifest's per-chapter counts in step with the chapters.
pub struct DocumentManager<S: DocumentStore> {
    store: S,
    config: DocgenConfig,
    numbering: SectionNumbering,
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocgenError::validation(format!("{what} is required")));
    }
    Ok(())
}

impl<S: DocumentStore> DocumentManager<S> {
    pub fn new(store: S, config: DocgenConfig) -> Self {
        Self {
            store,
            config,
            numbering: SectionNumbering::default(),
        }
    }

    pub fn with_numbering(mut self, numbering: SectionNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DocgenConfig {
        &self.config
    }

    fn check_size(&self, what: &str, content: &str) -> Result<()> {
        if content.len() as u64 > self.config.max_file_size {
            return Err(DocgenError::validation(format!(
                "{what} exceeds the maximum size of {} bytes",
                self.config.max_file_size
            )));
        }
        Ok(())
    }

    fn ensure_document(&self, doc: &DocumentId) -> Result<()> {
        if self.store.document_exists(doc)? {
            Ok(())
        } else {
            Err(DocgenError::not_found("document", doc))
        }
    }

    fn ensure_chapter(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<()> {
        self.ensure_document(doc)?;
        if self.store.chapter_exists(doc, chapter)? {
            Ok(())
        } else {
            Err(DocgenError::not_found("chapter", chapter))
        }
    }

    fn load_metadata(&self, doc: &DocumentId, chapter: ChapterNumber) -> Result<Chapter> {
        self.ensure_chapter(doc, chapter)?;
        self.store.load_chapter_metadata(doc, chapter)
    }

    /// Loads metadata plus the chapter body and every section's content.
    fn load_chapter_full(&self, doc: &DocumentId, number: ChapterNumber) -> Result<Chapter> {
        let mut chapter = self.load_metadata(doc, number)?;
        chapter.body = self.store.load_chapter_content(doc, number)?;
        for section in &mut chapter.sections {
            section.content = self
                .store
                .load_section_content(doc, number, &section.number)?;
        }
        Ok(chapter)
    }

    /// Saves chapter metadata and brings the manifest entry up to date.
    fn commit_chapter(&self, doc: &DocumentId, chapter: &Chapter, now: DateTime<Utc>) -> Result<()> {
        self.store.save_chapter_metadata(doc, chapter)?;
        let mut manifest = self.store.load_manifest(doc)?;
        manifest.refresh_entry(chapter);
        manifest.touch(now);
        self.store.save_manifest(&manifest)
    }

    fn load_default_style(&self) -> Result<Style> {
        match &self.config.default_style_path {
            Some(path) => {
                let raw = fs::read_to_string(path)?;
                serde_yaml::from_str(&raw)
                    .map_err(|err| DocgenError::from(err).context(path.display()))
            }
            None => Ok(Style::default()),
        }
    }

    // ----- documents -----

    pub fn create_document(
        &self,
        title: &str,
        author: &str,
        doc_type: DocumentType,
    ) -> Result<DocumentId> {
        require(title, "document title")?;
        require(author, "document author")?;

        let now = Utc::now();
        let id = DocumentId::from_title(title, now.timestamp())?;

        let existing = self.store.list_documents()?;
        if existing.len() >= self.config.max_documents {
            return Err(DocgenError::LimitExceeded {
                limit: self.config.max_documents,
            });
        }
        if self.store.document_exists(&id)? {
            return Err(DocgenError::validation(format!(
                "document with ID {id} already exists"
            )));
        }

        let style = self.load_default_style()?;
        let manifest = Manifest::new(DocumentInfo {
            id: id.clone(),
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            doc_type,
            created_at: now,
            updated_at: now,
        });
        self.store.create_document(&manifest)?;
        self.store.save_style(&id, &style)?;
        self.store.save_pandoc_config(&id, &PandocConfig::default())?;

        info!(document = %id, doc_type = %doc_type, "created document");
        Ok(id)
    }

    /// Manifests of every stored document, ordered by identifier.
    pub fn list_documents(&self) -> Result<Vec<Manifest>> {
        self.store
            .list_documents()?
            .iter()
            .map(|id| self.store.load_manifest(id))
            .collect()
    }

    pub fn get_manifest(&self, doc: &DocumentId) -> Result<Manifest> {
        self.ensure_document(doc)?;
        self.store.load_manifest(doc)
    }

    pub fn load_document(&self, doc: &DocumentId) -> Result<Document> {
        let manifest = self.get_manifest(doc)?;
        let chapters = manifest
            .chapters
            .iter()
            .map(|entry| self.load_chapter_full(doc, entry.number))
            .collect::<Result<Vec<_>>>()?;
        Ok(Document {
            info: manifest.document,
            chapters,
        })
    }

    pub fn delete_document(&self, doc: &DocumentId) -> Result<()> {
        self.ensure_document(doc)?;
        self.store.delete_document(doc)?;
        info!(document = %doc, "deleted document");
        Ok(())
    }

    pub fn configure_document(
        &self,
        doc: &DocumentId,
        style: Option<&Style>,
        pandoc: Option<&PandocConfig>,
    ) -> Result<()> {
        self.ensure_document(doc)?;
        if let Some(style) = style {
            self.store.save_style(doc, style)?;
        }
        if let Some(pandoc) = pandoc {
            self.store.save_pandoc_config(doc, pandoc)?;
        }
        info!(
            document = %doc,
            style = style.is_some(),
            pandoc = pandoc.is_some(),
            "configured document"
        );
        Ok(())
    }

    pub fn load_style(&self, doc: &DocumentId) -> Result<Style> {
        self.ensure_document(doc)?;
        self.store.load_style(doc)
    }

    pub fn load_pandoc_config(&self, doc: &DocumentId) -> Result<PandocConfig> {
        self.ensure_document(doc)?;
        self.store.load_pandoc_config(doc)
    }

    // ----- chapters -----

    /// Adds a chapter at the end, or at `position` after shifting later chapters up.
    pub fn add_chapter(
        &self,
        doc: &DocumentId,
        title: &str,
        position: Option<u32>,
    ) -> Result<ChapterNumber> {
        require(title, "chapter title")?;
        let mut manifest = self.get_manifest(doc)?;
        let count = manifest.chapter_count();

        let number = match position {
            None => ChapterNumber::from_index(count),
            Some(p) if p >= 1 && p as usize <= count + 1 => ChapterNumber::new(p)?,
            Some(p) => {
                return Err(DocgenError::validation(format!(
                    "invalid position {p}: document has {count} chapters"
                )));
            }
        };

        let existing = manifest.chapter_numbers();
        let plan = ChapterRenamePlan::shift_up(&existing, number)?;
        plan.validate(&existing)?;
        self.apply_plan(doc, &plan, &mut manifest)?;

        let now = Utc::now();
        let chapter = Chapter::new(number, title.trim(), now);
        self.store.create_chapter(doc, &chapter)?;
        manifest.refresh_entry(&chapter);
        manifest.touch(now);
        self.store.save_manifest(&manifest)?;

        info!(document = %doc, chapter = %number, shifted = plan.steps().len(), "added chapter");
        Ok(number)
    }

    pub fn get_chapter(&self, doc: &DocumentId, number: ChapterNumber) -> Result<Chapter> {
        self.load_chapter_full(doc, number)
    }

    pub fn update_chapter_title(
        &self,
        doc: &DocumentId,
        number: ChapterNumber,
        title: &str,
    ) -> Result<()> {
        require(title, "chapter title")?;
        let now = Utc::now();
        let mut chapter = self.load_metadata(doc, number)?;
        chapter.title = title.trim().to_string();
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;
        info!(document = %doc, chapter = %number, "renamed chapter");
        Ok(())
    }

    /// Removes a chapter and shifts every later chapter down by one.
    pub fn delete_chapter(&self, doc: &DocumentId, number: ChapterNumber) -> Result<()> {
        let mut manifest = self.get_manifest(doc)?;
        if manifest.entry(number).is_none() {
            return Err(DocgenError::not_found("chapter", number));
        }

        let mut remaining = manifest.chapter_numbers();
        remaining.retain(|n| *n != number);
        let plan = ChapterRenamePlan::shift_down(&remaining, number)?;
        plan.validate(&remaining)?;

        self.store.delete_chapter(doc, number)?;
        manifest.remove_entry(number);
        self.apply_plan(doc, &plan, &mut manifest)?;
        manifest.touch(Utc::now());
        self.store.save_manifest(&manifest)?;

        info!(document = %doc, chapter = %number, shifted = plan.steps().len(), "deleted chapter");
        Ok(())
    }

    /// Moves chapter `from` to position `to` and renumbers the whole document.
    pub fn move_chapter(
        &self,
        doc: &DocumentId,
        from: ChapterNumber,
        to: ChapterNumber,
    ) -> Result<()> {
        let mut manifest = self.get_manifest(doc)?;
        let count = manifest.chapter_count();
        for position in [from, to] {
            if position.index() >= count {
                return Err(DocgenError::validation(format!(
                    "invalid position {position}: document has {count} chapters"
                )));
            }
        }
        if from == to {
            return Ok(());
        }

        let existing = manifest.chapter_numbers();
        let mut order = existing.clone();
        let moved = order.remove(from.index());
        order.insert(to.index(), moved);

        let plan = ChapterRenamePlan::reorder(&order)?;
        plan.validate(&existing)?;
        self.apply_plan(doc, &plan, &mut manifest)?;
        manifest.touch(Utc::now());
        self.store.save_manifest(&manifest)?;

        info!(document = %doc, from = %from, to = %to, steps = plan.steps().len(), "moved chapter");
        Ok(())
    }

    fn apply_plan(
        &self,
        doc: &DocumentId,
        plan: &ChapterRenamePlan,
        manifest: &mut Manifest,
    ) -> Result<()> {
        for step in plan.steps() {
            debug!(document = %doc, from = %step.from, to = %step.to, "renaming chapter");
            let chapter = self.relocate_chapter(doc, step.from, step.to).map_err(|err| {
                error!(
                    document = %doc,
                    from = %step.from,
                    to = %step.to,
                    error = %err,
                    "chapter rename step failed"
                );
                err.context(format!("chapter {} -> {}", step.from, step.to))
            })?;
            manifest.remove_entry(step.from);
            manifest.refresh_entry(&chapter);
        }
        Ok(())
    }

    /// Renames one chapter in storage and rewrites every key derived from its number.
    fn relocate_chapter(
        &self,
        doc: &DocumentId,
        from: ChapterNumber,
        to: ChapterNumber,
    ) -> Result<Chapter> {
        self.store.rename_chapter(doc, from, to)?;
        let mut chapter = self.store.load_chapter_metadata(doc, to)?;
        let previous: Vec<SectionNumber> =
            chapter.sections.iter().map(|s| s.number.clone()).collect();
        chapter.relabel(to);

        for (old, section) in previous.iter().zip(&chapter.sections) {
            self.store
                .rename_section_content(doc, to, old, &section.number)?;
        }
        self.store.save_chapter_metadata(doc, &chapter)?;

        if !self.store.load_chapter_content(doc, to)?.is_empty() {
            self.rebuild_chapter(doc, to)?;
        }
        Ok(chapter)
    }

    // ----- sections -----

    pub fn add_section(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        title: &str,
        content: &str,
        level: usize,
    ) -> Result<SectionNumber> {
        require(title, "section title")?;
        require(content, "section content")?;
        validate_level(level)?;
        self.check_size("section content", content)?;

        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let number = self.numbering.next(chapter_number, &chapter.sections, level)?;
        if chapter.section(&number).is_some() {
            return Err(DocgenError::validation(format!(
                "section {number} already exists in chapter {chapter_number}"
            )));
        }

        let now = Utc::now();
        self.store
            .save_section_content(doc, chapter_number, &number, content)?;
        chapter.sections.push(Section {
            number: number.clone(),
            title: title.trim().to_string(),
            content: String::new(),
            level,
            created_at: now,
            updated_at: now,
        });
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;

        info!(document = %doc, chapter = %chapter_number, section = %number, "added section");
        Ok(number)
    }

    pub fn get_section(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        number: &SectionNumber,
    ) -> Result<Section> {
        let chapter = self.load_metadata(doc, chapter_number)?;
        let mut section = chapter
            .section(number)
            .cloned()
            .ok_or_else(|| section_not_found(number, chapter_number))?;
        section.content = self
            .store
            .load_section_content(doc, chapter_number, number)?;
        Ok(section)
    }

    /// Replaces a section's content, located by exact number.
    pub fn update_section(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        number: &SectionNumber,
        content: &str,
    ) -> Result<()> {
        require(content, "section content")?;
        self.check_size("section content", content)?;

        let now = Utc::now();
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let section = chapter
            .section_mut(number)
            .ok_or_else(|| section_not_found(number, chapter_number))?;
        section.updated_at = now;
        chapter.updated_at = now;

        self.store
            .save_section_content(doc, chapter_number, number, content)?;
        self.commit_chapter(doc, &chapter, now)?;
        info!(document = %doc, chapter = %chapter_number, section = %number, "updated section");
        Ok(())
    }

    pub fn update_section_title(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        number: &SectionNumber,
        title: &str,
    ) -> Result<()> {
        require(title, "section title")?;
        let now = Utc::now();
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let section = chapter
            .section_mut(number)
            .ok_or_else(|| section_not_found(number, chapter_number))?;
        section.title = title.trim().to_string();
        section.updated_at = now;
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)
    }

    /// Deletes a section together with its nested sections, then closes the
    /// numbering gap among later siblings. Returns every removed number.
    pub fn delete_section(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        number: &SectionNumber,
    ) -> Result<Vec<SectionNumber>> {
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        if chapter.section(number).is_none() {
            return Err(section_not_found(number, chapter_number));
        }

        let outline = Outline::build(chapter_number, chapter.sections.iter().map(|s| &s.number));
        let mut removed = vec![number.clone()];
        removed.extend(outline.descendants(number));

        chapter.sections.retain(|s| !removed.contains(&s.number));
        for gone in &removed {
            self.store
                .delete_section_content(doc, chapter_number, gone)?;
        }

        let changes = renumber_after_section_delete(&mut chapter.sections, number);
        for (old, new) in &changes {
            debug!(document = %doc, chapter = %chapter_number, from = %old, to = %new, "renumbering section");
            self.store
                .rename_section_content(doc, chapter_number, old, new)
                .map_err(|err| {
                    error!(
                        document = %doc,
                        chapter = %chapter_number,
                        from = %old,
                        to = %new,
                        error = %err,
                        "section rename step failed"
                    );
                    err.context(format!("section {old} -> {new}"))
                })?;
        }

        let now = Utc::now();
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;
        info!(
            document = %doc,
            chapter = %chapter_number,
            section = %number,
            removed = removed.len(),
            renumbered = changes.len(),
            "deleted section"
        );
        Ok(removed)
    }

    // ----- figures -----

    pub fn add_image(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        options: AddImageOptions,
    ) -> Result<FigureId> {
        require(&options.image_path, "image path")?;
        require(&options.caption, "caption")?;

        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let sequence = next_sequence(chapter.figures.iter().map(|f| f.sequence));
        let id = FigureId::generate(chapter_number, sequence);
        let now = Utc::now();
        chapter.figures.push(Figure {
            id: id.clone(),
            chapter: chapter_number,
            sequence,
            caption: options.caption,
            image_path: options.image_path,
            position: options.position,
            width: options.width,
            alignment: options.alignment,
            created_at: now,
            updated_at: now,
        });
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;

        info!(document = %doc, figure = %id, "added figure");
        Ok(id)
    }

    pub fn update_image_caption(
        &self,
        doc: &DocumentId,
        figure: &FigureId,
        caption: &str,
    ) -> Result<()> {
        require(caption, "caption")?;
        let (chapter_number, _) = figure.parts()?;
        let now = Utc::now();
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let entry = chapter
            .figures
            .iter_mut()
            .find(|f| &f.id == figure)
            .ok_or_else(|| DocgenError::not_found("figure", figure))?;
        entry.caption = caption.to_string();
        entry.updated_at = now;
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)
    }

    /// Removes a figure and closes the sequence gap it leaves in its chapter.
    pub fn delete_image(&self, doc: &DocumentId, figure: &FigureId) -> Result<()> {
        let (chapter_number, _) = figure.parts()?;
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let idx = chapter
            .figures
            .iter()
            .position(|f| &f.id == figure)
            .ok_or_else(|| DocgenError::not_found("figure", figure))?;
        let removed = chapter.figures.remove(idx);
        let renumbered = compact_figures(&mut chapter.figures, removed.sequence);

        let now = Utc::now();
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;
        info!(document = %doc, figure = %figure, renumbered = renumbered.len(), "deleted figure");
        Ok(())
    }

    // ----- tables -----

    pub fn add_table(
        &self,
        doc: &DocumentId,
        chapter_number: ChapterNumber,
        caption: &str,
        content: &str,
    ) -> Result<TableId> {
        require(caption, "caption")?;
        require(content, "table content")?;
        self.check_size("table content", content)?;

        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let sequence = next_sequence(chapter.tables.iter().map(|t| t.sequence));
        let id = TableId::generate(chapter_number, sequence);
        let now = Utc::now();
        chapter.tables.push(Table {
            id: id.clone(),
            chapter: chapter_number,
            sequence,
            caption: caption.to_string(),
            content: content.to_string(),
            format: "markdown".to_string(),
            created_at: now,
            updated_at: now,
        });
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;

        info!(document = %doc, table = %id, "added table");
        Ok(id)
    }

    pub fn update_table(
        &self,
        doc: &DocumentId,
        table: &TableId,
        caption: Option<&str>,
        content: Option<&str>,
    ) -> Result<()> {
        if caption.is_none() && content.is_none() {
            return Err(DocgenError::validation(
                "table update needs a caption or content",
            ));
        }
        if let Some(caption) = caption {
            require(caption, "caption")?;
        }
        if let Some(content) = content {
            require(content, "table content")?;
            self.check_size("table content", content)?;
        }

        let (chapter_number, _) = table.parts()?;
        let now = Utc::now();
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let entry = chapter
            .tables
            .iter_mut()
            .find(|t| &t.id == table)
            .ok_or_else(|| DocgenError::not_found("table", table))?;
        if let Some(caption) = caption {
            entry.caption = caption.to_string();
        }
        if let Some(content) = content {
            entry.content = content.to_string();
        }
        entry.updated_at = now;
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)
    }

    pub fn delete_table(&self, doc: &DocumentId, table: &TableId) -> Result<()> {
        let (chapter_number, _) = table.parts()?;
        let mut chapter = self.load_metadata(doc, chapter_number)?;
        let idx = chapter
            .tables
            .iter()
            .position(|t| &t.id == table)
            .ok_or_else(|| DocgenError::not_found("table", table))?;
        let removed = chapter.tables.remove(idx);
        let renumbered = compact_tables(&mut chapter.tables, removed.sequence);

        let now = Utc::now();
        chapter.updated_at = now;
        self.commit_chapter(doc, &chapter, now)?;
        info!(document = %doc, table = %table, renumbered = renumbered.len(), "deleted table");
        Ok(())
    }

    // ----- markdown -----

    /// Regenerates a chapter's markdown from its sections and stores it as the body.
    pub fn rebuild_chapter(&self, doc: &DocumentId, number: ChapterNumber) -> Result<String> {
        let chapter = self.load_chapter_full(doc, number)?;
        let markdown = render_chapter(&chapter);
        self.store.save_chapter_content(doc, number, &markdown)?;
        debug!(document = %doc, chapter = %number, bytes = markdown.len(), "rebuilt chapter");
        Ok(markdown)
    }

    pub fn rebuild_all(&self, doc: &DocumentId) -> Result<()> {
        let manifest = self.get_manifest(doc)?;
        for entry in &manifest.chapters {
            self.rebuild_chapter(doc, entry.number)?;
        }
        Ok(())
    }

    /// Writes the combined markdown to `{root}/exports/{doc}.md` and returns the path.
    pub fn export_markdown(
        &self,
        doc: &DocumentId,
        chapters: Option<&[ChapterNumber]>,
    ) -> Result<PathBuf> {
        self.export_markdown_with(doc, chapters, MarkdownAssembler::new())
    }

    pub fn export_markdown_with(
        &self,
        doc: &DocumentId,
        chapters: Option<&[ChapterNumber]>,
        assembler: MarkdownAssembler,
    ) -> Result<PathBuf> {
        self.rebuild_all(doc)?;
        let document = self.load_document(doc)?;
        let style = self.store.load_style(doc)?;
        let markdown = assembler.assemble(&document, &style, chapters)?;

        let paths = self.config.paths();
        let target = paths.export_file(doc);
        fs::create_dir_all(paths.exports_dir())?;
        fs::write(&target, markdown)?;
        info!(document = %doc, path = %target.display(), "exported markdown");
        Ok(target)
    }

    pub fn validate(&self, doc: &DocumentId) -> Result<ValidationReport> {
        let manifest = self.get_manifest(doc)?;
        let mut chapters = Vec::with_capacity(manifest.chapters.len());
        let mut missing = Vec::new();
        for entry in &manifest.chapters {
            match self.load_chapter_full(doc, entry.number) {
                Ok(chapter) => chapters.push(chapter),
                Err(DocgenError::NotFound { entity, key }) => {
                    missing.push(format!(
                        "chapter {}: {entity} {key} is missing from storage",
                        entry.number
                    ));
                }
                Err(err) => return Err(err),
            }
        }
        let mut report = validate_document(&manifest, &chapters);
        report.errors.extend(missing);
        report.valid = report.errors.is_empty();
        Ok(report)
    }
}

fn section_not_found(number: &SectionNumber, chapter: ChapterNumber) -> DocgenError {
    DocgenError::not_found("section", format!("{number} in chapter {chapter}"))
}
