use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Chapter, ChapterNumber, Manifest};

/// Outcome of a structural check over one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when `errors` is empty. Warnings never fail a document.
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.valid = self.errors.is_empty();
        self
    }
}

/// Checks numbering and manifest consistency across a document's chapters.
///
/// `chapters` is the authoritative chapter data, with bodies loaded when
/// available; the manifest is compared against it.
pub fn validate_document(manifest: &Manifest, chapters: &[Chapter]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Err(err) = manifest.check_dense() {
        report.errors.push(err.to_string());
    }
    for (idx, chapter) in chapters.iter().enumerate() {
        let expected = ChapterNumber::from_index(idx);
        if chapter.number != expected {
            report.errors.push(format!(
                "chapter at position {} is numbered {}",
                expected, chapter.number
            ));
        }
        check_chapter(chapter, &mut report);
    }

    if manifest.chapters.len() != chapters.len() {
        report.errors.push(format!(
            "manifest lists {} chapters but {} are stored",
            manifest.chapters.len(),
            chapters.len()
        ));
    }
    for chapter in chapters {
        match manifest.entry(chapter.number) {
            None => report
                .errors
                .push(format!("chapter {} missing from manifest", chapter.number)),
            Some(entry) if entry.counts != chapter.counts() => {
                report.errors.push(format!(
                    "manifest counts for chapter {} are stale: recorded {:?}, actual {:?}",
                    chapter.number,
                    entry.counts,
                    chapter.counts()
                ));
            }
            Some(entry) if entry.title != chapter.title => {
                report.warnings.push(format!(
                    "manifest title for chapter {} differs from chapter metadata",
                    chapter.number
                ));
            }
            Some(_) => {}
        }
    }

    report.finish()
}

fn check_chapter(chapter: &Chapter, report: &mut ValidationReport) {
    let number = chapter.number;

    let mut seen = BTreeSet::new();
    for section in &chapter.sections {
        if !seen.insert(&section.number) {
            report.errors.push(format!(
                "chapter {number}: duplicate section number {}",
                section.number
            ));
        }
        if section.number.chapter() != number.get() {
            report.errors.push(format!(
                "chapter {number}: section {} belongs to another chapter",
                section.number
            ));
        }
        if section.level != section.number.level() {
            report.errors.push(format!(
                "chapter {number}: section {} records level {}",
                section.number, section.level
            ));
        }
    }

    let mut sequences = BTreeSet::new();
    for figure in &chapter.figures {
        match figure.id.parts() {
            Ok((owner, sequence)) if owner == number && sequence == figure.sequence => {}
            _ => report.errors.push(format!(
                "chapter {number}: figure {} does not match chapter {number} sequence {}",
                figure.id, figure.sequence
            )),
        }
        if figure.chapter != number {
            report.errors.push(format!(
                "chapter {number}: figure {} records chapter {}",
                figure.id, figure.chapter
            ));
        }
        if !sequences.insert(figure.sequence) {
            report.errors.push(format!(
                "chapter {number}: duplicate figure sequence {}",
                figure.sequence
            ));
        }
    }

    let mut sequences = BTreeSet::new();
    for table in &chapter.tables {
        match table.id.parts() {
            Ok((owner, sequence)) if owner == number && sequence == table.sequence => {}
            _ => report.errors.push(format!(
                "chapter {number}: table {} does not match chapter {number} sequence {}",
                table.id, table.sequence
            )),
        }
        if table.chapter != number {
            report.errors.push(format!(
                "chapter {number}: table {} records chapter {}",
                table.id, table.chapter
            ));
        }
        if !sequences.insert(table.sequence) {
            report.errors.push(format!(
                "chapter {number}: duplicate table sequence {}",
                table.sequence
            ));
        }
    }

    if chapter.sections.is_empty() && chapter.body.trim().is_empty() {
        report
            .warnings
            .push(format!("chapter {number} has no content"));
    }
}
