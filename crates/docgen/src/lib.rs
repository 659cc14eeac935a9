pub mod assemble;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod numbering;
pub mod outline;
pub mod rebuild;
pub mod store;
pub mod validation;

pub use assemble::MarkdownAssembler;
pub use config::{DocgenConfig, StoragePaths};
pub use error::{DocgenError, Result};
pub use manager::{AddImageOptions, DocumentManager};
pub use model::{
    Chapter, ChapterCount, ChapterEntry, ChapterNumber, Document, DocumentId, DocumentInfo,
    DocumentType, Figure, FigureId, HeaderFooter, ImageAlignment, ImagePosition,
    MAX_SECTION_LEVEL, Manifest, Margins, NumberingStyle, PandocConfig, Section, SectionNumber,
    Style, Table, TableId,
};
pub use numbering::{
    ChapterRenamePlan, RenameStep, SectionNumbering, next_section_number,
    next_section_number_by_scan, next_sequence,
};
pub use outline::Outline;
pub use rebuild::render_chapter;
pub use store::{DocumentStore, FilesystemStore, InMemoryStore};
pub use validation::{ValidationReport, validate_document};
