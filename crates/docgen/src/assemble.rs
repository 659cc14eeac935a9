use serde::Serialize;

use crate::error::{DocgenError, Result};
use crate::model::{ChapterNumber, Document, DocumentType, Style};
use crate::rebuild::render_chapter;

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    author: &'a str,
    date: String,
    documentclass: &'static str,
    fontfamily: &'a str,
    fontsize: &'a str,
    linestretch: &'a str,
    geometry: String,
}

fn document_class(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::Book => "book",
        DocumentType::Report => "report",
        DocumentType::Article | DocumentType::Letter => "article",
    }
}

/// Combines chapters into the single markdown file an external converter consumes.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownAssembler {
    page_breaks: bool,
}

impl Default for MarkdownAssembler {
    fn default() -> Self {
        Self { page_breaks: true }
    }
}

impl MarkdownAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omits the `\newpage` marker emitted before each chapter.
    pub fn without_page_breaks(mut self) -> Self {
        self.page_breaks = false;
        self
    }

    /// Renders the metadata block and the selected chapters, in document order
    /// unless `chapters` names an explicit order.
    pub fn assemble(
        &self,
        document: &Document,
        style: &Style,
        chapters: Option<&[ChapterNumber]>,
    ) -> Result<String> {
        let info = &document.info;
        let margins = &style.margins;
        let front = FrontMatter {
            title: &info.title,
            author: &info.author,
            date: info.updated_at.format("%Y-%m-%d").to_string(),
            documentclass: document_class(info.doc_type),
            fontfamily: &style.font_family,
            fontsize: &style.font_size,
            linestretch: &style.line_spacing,
            geometry: format!(
                "top={},bottom={},left={},right={}",
                margins.top, margins.bottom, margins.left, margins.right
            ),
        };

        let mut out = String::from("---\n");
        out.push_str(&serde_yaml::to_string(&front)?);
        out.push_str("---\n\n");

        let selected: Vec<_> = match chapters {
            Some(numbers) => numbers
                .iter()
                .map(|n| {
                    document
                        .chapter(*n)
                        .ok_or_else(|| DocgenError::not_found("chapter", n))
                })
                .collect::<Result<_>>()?,
            None => document.chapters.iter().collect(),
        };

        for chapter in selected {
            if self.page_breaks {
                out.push_str("\\newpage\n\n");
            }
            out.push_str(&render_chapter(chapter));
            out.push('\n');
        }
        Ok(out)
    }
}
