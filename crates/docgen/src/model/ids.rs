use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{DocgenError, Result};

/// Deepest supported section level (`1.1.1.1.1.1.1`).
pub const MAX_SECTION_LEVEL: usize = 6;

/// Stable slug identifying a document on disk and in every API call.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub const MAX_LEN: usize = 50;
    const SLUG_LEN: usize = 30;

    /// Validates `value` against `[A-Za-z0-9_-]{1,50}`.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(DocgenError::invalid("document ID", value, "cannot be empty"));
        }
        if value.len() > Self::MAX_LEN {
            return Err(DocgenError::invalid(
                "document ID",
                value,
                format!("too long (max {} characters)", Self::MAX_LEN),
            ));
        }
        if !value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(DocgenError::invalid(
                "document ID",
                value,
                "use only letters, numbers, hyphens, and underscores",
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Derives an identifier from a document title plus a creation timestamp.
    pub fn from_title(title: &str, unix_seconds: i64) -> Result<Self> {
        let mut slug = slugify(title);
        slug.truncate(Self::SLUG_LEN);
        let slug = slug.trim_end_matches('-');
        let id = if slug.is_empty() {
            format!("document-{unix_seconds}")
        } else {
            format!("{slug}-{unix_seconds}")
        };
        Self::parse(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn slugify(title: &str) -> String {
    let normalized = title.nfkd().collect::<String>().to_lowercase();
    let mut slug = String::new();
    let mut prev_hyphen = false;
    for ch in normalized.chars() {
        let mapped = if ch.is_whitespace() { '-' } else { ch };
        if mapped == '-' {
            if !prev_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            prev_hyphen = true;
        } else if mapped.is_ascii_lowercase() || mapped.is_ascii_digit() {
            slug.push(mapped);
            prev_hyphen = false;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// One-based chapter position within a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChapterNumber(u32);

impl ChapterNumber {
    pub fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(DocgenError::invalid(
                "chapter number",
                "0",
                "chapter numbers start at 1",
            ));
        }
        Ok(Self(value))
    }

    /// Chapter number for a zero-based position in the ordered chapter list.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Storage directory name, zero padded to two digits.
    pub fn dir_name(self) -> String {
        format!("{:02}", self.0)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }

    pub(crate) fn offset(self, delta: i64) -> Result<Self> {
        let shifted = i64::from(self.0) + delta;
        u32::try_from(shifted)
            .map_err(|_| {
                DocgenError::invalid("chapter number", shifted.to_string(), "out of range")
            })
            .and_then(Self::new)
    }
}

impl TryFrom<u32> for ChapterNumber {
    type Error = DocgenError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ChapterNumber> for u32 {
    fn from(value: ChapterNumber) -> Self {
        value.0
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChapterNumber {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        let value = parse_positive(s)
            .ok_or_else(|| DocgenError::invalid("chapter number", s, "expected a positive integer"))?;
        Self::new(value)
    }
}

/// Hierarchical section number; the first component is always the chapter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct SectionNumber(Vec<u32>);

impl SectionNumber {
    pub fn new(components: Vec<u32>) -> Result<Self> {
        let render = || {
            components
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        };
        if components.len() < 2 {
            return Err(DocgenError::invalid(
                "section number",
                render(),
                "expected at least two components (chapter.section)",
            ));
        }
        if components.len() > MAX_SECTION_LEVEL + 1 {
            return Err(DocgenError::invalid(
                "section number",
                render(),
                format!("sections nest at most {MAX_SECTION_LEVEL} levels deep"),
            ));
        }
        if components.contains(&0) {
            return Err(DocgenError::invalid(
                "section number",
                render(),
                "components must be positive integers",
            ));
        }
        Ok(Self(components))
    }

    /// Parses the dotted representation (`1.2.1`).
    pub fn parse(value: &str) -> Result<Self> {
        let mut components = Vec::new();
        for part in value.split('.') {
            let parsed = parse_positive(part).ok_or_else(|| {
                DocgenError::invalid(
                    "section number",
                    value,
                    "expected dot-separated positive integers",
                )
            })?;
            components.push(parsed);
        }
        Self::new(components)
    }

    pub fn chapter(&self) -> u32 {
        self.0[0]
    }

    /// Nesting depth: 1 for `1.1`, 2 for `1.1.1`.
    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    pub fn parent(&self) -> Option<SectionNumber> {
        if self.level() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn with_chapter(&self, chapter: ChapterNumber) -> SectionNumber {
        let mut components = self.0.clone();
        components[0] = chapter.get();
        Self(components)
    }

    pub(crate) fn from_components_unchecked(components: Vec<u32>) -> Self {
        debug_assert!(components.len() >= 2);
        Self(components)
    }

    pub(crate) fn components_mut(&mut self) -> &mut [u32] {
        &mut self.0
    }
}

impl TryFrom<Vec<u32>> for SectionNumber {
    type Error = DocgenError;

    fn try_from(value: Vec<u32>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SectionNumber> for Vec<u32> {
    fn from(value: SectionNumber) -> Self {
        value.0
    }
}

impl fmt::Display for SectionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for SectionNumber {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Canonical decimal `[1-9][0-9]*` that fits in a `u32`.
fn parse_positive(part: &str) -> Option<u32> {
    if part.is_empty() || part.starts_with('0') || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn asset_regex(kind: AssetKind) -> &'static Regex {
    static FIGURE: OnceLock<Regex> = OnceLock::new();
    static TABLE: OnceLock<Regex> = OnceLock::new();
    match kind {
        AssetKind::Figure => FIGURE.get_or_init(|| {
            Regex::new(r"^fig-([1-9][0-9]*)\.([1-9][0-9]*)$").expect("Invalid regex")
        }),
        AssetKind::Table => TABLE.get_or_init(|| {
            Regex::new(r"^table-([1-9][0-9]*)\.([1-9][0-9]*)$").expect("Invalid regex")
        }),
    }
}

#[derive(Clone, Copy)]
enum AssetKind {
    Figure,
    Table,
}

impl AssetKind {
    fn label(self) -> &'static str {
        match self {
            AssetKind::Figure => "figure ID",
            AssetKind::Table => "table ID",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            AssetKind::Figure => "expected fig-{chapter}.{sequence}",
            AssetKind::Table => "expected table-{chapter}.{sequence}",
        }
    }
}

fn parse_asset_id(kind: AssetKind, value: &str) -> Result<(ChapterNumber, u32)> {
    let caps = asset_regex(kind)
        .captures(value)
        .ok_or_else(|| DocgenError::invalid(kind.label(), value, kind.expected()))?;
    let chapter = caps[1]
        .parse::<u32>()
        .map_err(|_| DocgenError::invalid(kind.label(), value, "chapter out of range"))?;
    let sequence = caps[2]
        .parse::<u32>()
        .map_err(|_| DocgenError::invalid(kind.label(), value, "sequence out of range"))?;
    let chapter = ChapterNumber::new(chapter)
        .map_err(|_| DocgenError::invalid(kind.label(), value, "chapter numbers start at 1"))?;
    Ok((chapter, sequence))
}

/// `fig-{chapter}.{sequence}`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FigureId(String);

impl FigureId {
    pub fn generate(chapter: ChapterNumber, sequence: u32) -> Self {
        Self(format!("fig-{chapter}.{sequence}"))
    }

    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref();
        parse_asset_id(AssetKind::Figure, value)?;
        Ok(Self(value.to_string()))
    }

    /// Chapter and sequence embedded in the identifier.
    pub fn parts(&self) -> Result<(ChapterNumber, u32)> {
        parse_asset_id(AssetKind::Figure, &self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FigureId {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `table-{chapter}.{sequence}`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn generate(chapter: ChapterNumber, sequence: u32) -> Self {
        Self(format!("table-{chapter}.{sequence}"))
    }

    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref();
        parse_asset_id(AssetKind::Table, value)?;
        Ok(Self(value.to_string()))
    }

    pub fn parts(&self) -> Result<(ChapterNumber, u32)> {
        parse_asset_id(AssetKind::Table, &self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableId {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
