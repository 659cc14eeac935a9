use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ChapterNumber, DocumentId, FigureId, SectionNumber, TableId};
use crate::error::{DocgenError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Book,
    Report,
    Article,
    Letter,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Report => "report",
            Self::Article => "article",
            Self::Letter => "letter",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "book" => Ok(Self::Book),
            "report" => Ok(Self::Report),
            "article" => Ok(Self::Article),
            "letter" => Ok(Self::Letter),
            other => Err(DocgenError::validation(format!(
                "invalid document type: {other} (must be one of: book, report, article, letter)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Here,
    Top,
    Bottom,
    Page,
    Float,
}

impl ImagePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Here => "here",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Page => "page",
            Self::Float => "float",
        }
    }
}

impl FromStr for ImagePosition {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "here" => Ok(Self::Here),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "page" => Ok(Self::Page),
            "float" => Ok(Self::Float),
            other => Err(DocgenError::validation(format!(
                "invalid position: {other} (must be one of: here, top, bottom, page, float)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for ImageAlignment {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(DocgenError::validation(format!(
                "invalid alignment: {other} (must be one of: left, center, right)"
            ))),
        }
    }
}

/// Document-level identity and timestamps, shared by the manifest and the aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub title: String,
    pub author: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully assembled document: identity plus every chapter in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub info: DocumentInfo,
    pub chapters: Vec<Chapter>,
}

impl Document {
    pub fn chapter(&self, number: ChapterNumber) -> Option<&Chapter> {
        self.chapters.iter().find(|ch| ch.number == number)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: ChapterNumber,
    pub title: String,
    /// Free-text body stored beside the metadata (`chapter.md`), never inside it.
    #[serde(skip)]
    pub body: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub figures: Vec<Figure>,
    #[serde(default)]
    pub tables: Vec<Table>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(number: ChapterNumber, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            number,
            title: title.into(),
            body: String::new(),
            sections: Vec::new(),
            figures: Vec::new(),
            tables: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn counts(&self) -> ChapterCount {
        ChapterCount {
            sections: self.sections.len(),
            figures: self.figures.len(),
            tables: self.tables.len(),
        }
    }

    pub fn section(&self, number: &SectionNumber) -> Option<&Section> {
        self.sections.iter().find(|s| &s.number == number)
    }

    pub fn section_mut(&mut self, number: &SectionNumber) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.number == number)
    }

    /// Moves the chapter to a new number, rewriting every key that embeds it.
    pub fn relabel(&mut self, number: ChapterNumber) {
        self.number = number;
        for section in &mut self.sections {
            section.number = section.number.with_chapter(number);
        }
        for figure in &mut self.figures {
            figure.chapter = number;
            figure.id = FigureId::generate(number, figure.sequence);
        }
        for table in &mut self.tables {
            table.chapter = number;
            table.id = TableId::generate(number, table.sequence);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub number: SectionNumber,
    pub title: String,
    /// Persisted as its own file keyed by the dotted number.
    #[serde(skip)]
    pub content: String,
    pub level: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub id: FigureId,
    pub chapter: ChapterNumber,
    pub sequence: u32,
    pub caption: String,
    pub image_path: String,
    pub position: ImagePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default)]
    pub alignment: ImageAlignment,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub chapter: ChapterNumber,
    pub sequence: u32,
    pub caption: String,
    /// Markdown table source.
    pub content: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterCount {
    pub sections: usize,
    pub figures: usize,
    pub tables: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub number: ChapterNumber,
    pub title: String,
    #[serde(default)]
    pub counts: ChapterCount,
}

/// Denormalized structural summary, kept in numeric chapter order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub document: DocumentInfo,
    #[serde(default)]
    pub chapters: Vec<ChapterEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    pub fn new(document: DocumentInfo) -> Self {
        Self {
            created_at: document.created_at,
            updated_at: document.updated_at,
            document,
            chapters: Vec::new(),
        }
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn entry(&self, number: ChapterNumber) -> Option<&ChapterEntry> {
        self.chapters.iter().find(|e| e.number == number)
    }

    /// Inserts or replaces the entry for `chapter`, keeping numeric order.
    pub fn refresh_entry(&mut self, chapter: &Chapter) {
        let entry = ChapterEntry {
            number: chapter.number,
            title: chapter.title.clone(),
            counts: chapter.counts(),
        };
        match self
            .chapters
            .binary_search_by_key(&chapter.number, |e| e.number)
        {
            Ok(idx) => self.chapters[idx] = entry,
            Err(idx) => self.chapters.insert(idx, entry),
        }
    }

    pub fn remove_entry(&mut self, number: ChapterNumber) -> Option<ChapterEntry> {
        let idx = self.chapters.iter().position(|e| e.number == number)?;
        Some(self.chapters.remove(idx))
    }

    pub fn chapter_numbers(&self) -> Vec<ChapterNumber> {
        self.chapters.iter().map(|e| e.number).collect()
    }

    /// Rebuilds the chapter list from authoritative chapter data.
    pub fn rebuild_entries<'a>(&mut self, chapters: impl IntoIterator<Item = &'a Chapter>) {
        self.chapters.clear();
        for chapter in chapters {
            self.refresh_entry(chapter);
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.document.updated_at = now;
    }

    pub fn total_sections(&self) -> usize {
        self.chapters.iter().map(|e| e.counts.sections).sum()
    }

    pub fn total_figures(&self) -> usize {
        self.chapters.iter().map(|e| e.counts.figures).sum()
    }

    pub fn total_tables(&self) -> usize {
        self.chapters.iter().map(|e| e.counts.tables).sum()
    }

    /// Confirms chapter numbers run 1..=N without gaps.
    pub fn check_dense(&self) -> Result<()> {
        for (idx, entry) in self.chapters.iter().enumerate() {
            let expected = ChapterNumber::from_index(idx);
            if entry.number != expected {
                return Err(DocgenError::validation(format!(
                    "chapter numbering is not dense: expected {expected}, found {}",
                    entry.number
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: u32) -> ChapterNumber {
        ChapterNumber::new(n).unwrap()
    }

    fn info() -> DocumentInfo {
        let now = Utc::now();
        DocumentInfo {
            id: DocumentId::parse("doc").unwrap(),
            title: "Doc".into(),
            author: "Ada".into(),
            doc_type: DocumentType::Book,
            created_at: now,
            updated_at: now,
        }
    }

    fn section(number: &str) -> Section {
        let number = SectionNumber::parse(number).unwrap();
        Section {
            level: number.level(),
            number,
            title: "t".into(),
            content: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn relabel_rewrites_sections_figures_and_tables() {
        let now = Utc::now();
        let mut chapter = Chapter::new(ch(2), "Two", now);
        chapter.sections.push(section("2.1"));
        chapter.sections.push(section("2.1.3"));
        chapter.figures.push(Figure {
            id: FigureId::generate(ch(2), 4),
            chapter: ch(2),
            sequence: 4,
            caption: "c".into(),
            image_path: "a.png".into(),
            position: ImagePosition::Here,
            width: None,
            alignment: ImageAlignment::Center,
            created_at: now,
            updated_at: now,
        });
        chapter.tables.push(Table {
            id: TableId::generate(ch(2), 1),
            chapter: ch(2),
            sequence: 1,
            caption: "t".into(),
            content: "| a |".into(),
            format: "markdown".into(),
            created_at: now,
            updated_at: now,
        });

        chapter.relabel(ch(5));

        assert_eq!(chapter.number, ch(5));
        assert_eq!(chapter.sections[0].number.to_string(), "5.1");
        assert_eq!(chapter.sections[1].number.to_string(), "5.1.3");
        assert_eq!(chapter.figures[0].id.as_str(), "fig-5.4");
        assert_eq!(chapter.figures[0].chapter, ch(5));
        assert_eq!(chapter.tables[0].id.as_str(), "table-5.1");
    }

    #[test]
    fn manifest_entries_stay_sorted_and_dense_check_detects_gaps() {
        let now = Utc::now();
        let mut manifest = Manifest::new(info());
        manifest.refresh_entry(&Chapter::new(ch(2), "Two", now));
        manifest.refresh_entry(&Chapter::new(ch(1), "One", now));
        assert_eq!(
            manifest.chapters.iter().map(|e| e.number.get()).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(manifest.check_dense().is_ok());

        manifest.refresh_entry(&Chapter::new(ch(4), "Four", now));
        assert!(manifest.check_dense().is_err());
    }

    #[test]
    fn manifest_totals_sum_chapter_counts() {
        let now = Utc::now();
        let mut manifest = Manifest::new(info());
        let mut one = Chapter::new(ch(1), "One", now);
        one.sections.push(section("1.1"));
        one.sections.push(section("1.2"));
        let mut two = Chapter::new(ch(2), "Two", now);
        two.sections.push(section("2.1"));
        manifest.rebuild_entries([&one, &two]);
        assert_eq!(manifest.total_sections(), 3);
        assert_eq!(manifest.total_figures(), 0);
        assert_eq!(manifest.entry(ch(1)).unwrap().counts.sections, 2);
    }

    #[test]
    fn chapter_metadata_yaml_omits_body_and_section_content() {
        let mut chapter = Chapter::new(ch(1), "One", Utc::now());
        chapter.body = "body text".into();
        let mut s = section("1.1");
        s.content = "section text".into();
        chapter.sections.push(s);

        let yaml = serde_yaml::to_string(&chapter).unwrap();
        assert!(!yaml.contains("body text"));
        assert!(!yaml.contains("section text"));

        let back: Chapter = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.sections[0].number.to_string(), "1.1");
        assert!(back.body.is_empty());
    }

    #[test]
    fn enums_parse_lowercase_names() {
        assert_eq!("report".parse::<DocumentType>().unwrap(), DocumentType::Report);
        assert!("novel".parse::<DocumentType>().is_err());
        assert_eq!("float".parse::<ImagePosition>().unwrap(), ImagePosition::Float);
        assert!("middle".parse::<ImagePosition>().is_err());
        assert_eq!("left".parse::<ImageAlignment>().unwrap(), ImageAlignment::Left);
    }
}
