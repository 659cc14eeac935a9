use clap::{Arg, value_parser};
use docgen::{PandocConfig, Style, ValidationReport};
use serde::Serialize;

use crate::error::ExitStatus;

pub mod chapter;
pub mod doc;
pub mod figure;
pub mod section;
pub mod table;

fn document_arg() -> Arg {
    Arg::new("document")
        .value_name("DOCUMENT")
        .required(true)
        .help("Document identifier")
}

fn chapter_arg(id: &'static str) -> Arg {
    Arg::new(id)
        .value_name("CHAPTER")
        .required(true)
        .value_parser(value_parser!(u32).range(1..))
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    DocumentCreated {
        summary: doc::DocumentSummary,
        path: String,
    },
    DocumentList {
        documents: Vec<doc::DocumentSummary>,
    },
    DocumentShown {
        summary: doc::DocumentSummary,
        chapters: Vec<chapter::ChapterSummary>,
    },
    DocumentDeleted {
        document: String,
    },
    DocumentConfigured {
        document: String,
        style: Style,
        pandoc: PandocConfig,
    },
    Validation {
        document: String,
        report: ValidationReport,
    },
    Exported {
        document: String,
        path: String,
    },
    ChapterAdded {
        document: String,
        chapter: chapter::ChapterSummary,
    },
    ChapterDeleted {
        document: String,
        number: u32,
    },
    ChapterMoved {
        document: String,
        from: u32,
        to: u32,
    },
    ChapterRenamed {
        document: String,
        number: u32,
        title: String,
    },
    ChapterShown {
        document: String,
        chapter: chapter::ChapterDetail,
    },
    ChaptersRebuilt {
        document: String,
        chapters: Vec<u32>,
    },
    SectionAdded {
        document: String,
        section: section::SectionSummary,
    },
    SectionUpdated {
        document: String,
        section: section::SectionSummary,
    },
    SectionDeleted {
        document: String,
        removed: Vec<String>,
    },
    SectionShown {
        document: String,
        section: section::SectionSummary,
        content: String,
    },
    AssetChanged {
        document: String,
        kind: AssetKind,
        action: AssetAction,
        id: String,
    },
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Figure,
    Table,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Figure => "figure",
            AssetKind::Table => "table",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetAction {
    Added,
    Updated,
    Deleted,
}

impl AssetAction {
    pub fn label(self) -> &'static str {
        match self {
            AssetAction::Added => "Added",
            AssetAction::Updated => "Updated",
            AssetAction::Deleted => "Deleted",
        }
    }
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Validation { report, .. } => {
                if report.valid {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}
