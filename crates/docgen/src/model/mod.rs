pub mod document;
pub mod ids;
pub mod style;

pub use document::{
    Chapter, ChapterCount, ChapterEntry, Document, DocumentInfo, DocumentType, Figure,
    ImageAlignment, ImagePosition, Manifest, Section, Table,
};
pub use ids::{ChapterNumber, DocumentId, FigureId, MAX_SECTION_LEVEL, SectionNumber, TableId};
pub use style::{HeaderFooter, Margins, NumberingStyle, PandocConfig, Style};
