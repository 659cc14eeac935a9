use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DocgenError, Result};
use crate::model::{ChapterNumber, DocumentId, SectionNumber};

pub const ROOT_DIR_VAR: &str = "DOCGEN_ROOT_DIR";
pub const MAX_DOCUMENTS_VAR: &str = "DOCGEN_MAX_DOCUMENTS";
pub const MAX_FILE_SIZE_VAR: &str = "DOCGEN_MAX_FILE_SIZE";
pub const EXPORT_TIMEOUT_VAR: &str = "DOCGEN_EXPORT_TIMEOUT";
pub const PANDOC_PATH_VAR: &str = "PANDOC_PATH";
pub const DEFAULT_STYLE_VAR: &str = "DOCGEN_DEFAULT_STYLE";

/// Runtime limits and locations for a document store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocgenConfig {
    pub root_dir: PathBuf,
    pub max_documents: usize,
    pub max_file_size: u64,
    pub export_timeout: Duration,
    pub pandoc_path: String,
    pub default_style_path: Option<PathBuf>,
}

impl DocgenConfig {
    pub const DEFAULT_MAX_DOCUMENTS: usize = 100;
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Defaults rooted at `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            max_documents: Self::DEFAULT_MAX_DOCUMENTS,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            export_timeout: Self::DEFAULT_EXPORT_TIMEOUT,
            pandoc_path: "pandoc".to_string(),
            default_style_path: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let root_dir = value(ROOT_DIR_VAR).ok_or_else(|| {
            DocgenError::Config(format!("{ROOT_DIR_VAR} environment variable is required"))
        })?;
        let mut config = Self::new(root_dir);

        if let Some(path) = value(PANDOC_PATH_VAR) {
            config.pandoc_path = path;
        }
        if let Some(path) = value(DEFAULT_STYLE_VAR) {
            config.default_style_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = value(MAX_DOCUMENTS_VAR) {
            config.max_documents = parse_positive(MAX_DOCUMENTS_VAR, &raw)?;
        }
        if let Some(raw) = value(MAX_FILE_SIZE_VAR) {
            config.max_file_size = parse_positive(MAX_FILE_SIZE_VAR, &raw)?;
        }
        if let Some(raw) = value(EXPORT_TIMEOUT_VAR) {
            config.export_timeout = Duration::from_secs(parse_positive(EXPORT_TIMEOUT_VAR, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(DocgenError::Config("root directory is required".into()));
        }
        if self.pandoc_path.is_empty() {
            return Err(DocgenError::Config("pandoc path is required".into()));
        }
        if self.max_documents == 0 {
            return Err(DocgenError::Config("max documents must be positive".into()));
        }
        if self.max_file_size == 0 {
            return Err(DocgenError::Config("max file size must be positive".into()));
        }
        if self.export_timeout.is_zero() {
            return Err(DocgenError::Config("export timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn paths(&self) -> StoragePaths {
        StoragePaths::new(self.root_dir.clone())
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    let parsed = raw
        .trim()
        .parse::<T>()
        .map_err(|_| DocgenError::Config(format!("invalid {key} value: {raw}")))?;
    if parsed <= T::default() {
        return Err(DocgenError::Config(format!("{key} must be positive")));
    }
    Ok(parsed)
}

/// Every on-disk location derived from the storage root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/exports`
    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    pub fn export_file(&self, doc: &DocumentId) -> PathBuf {
        self.exports_dir().join(format!("{doc}.md"))
    }

    pub fn document_dir(&self, doc: &DocumentId) -> PathBuf {
        self.root.join(doc.as_str())
    }

    pub fn manifest_file(&self, doc: &DocumentId) -> PathBuf {
        self.document_dir(doc).join("manifest.yaml")
    }

    pub fn style_file(&self, doc: &DocumentId) -> PathBuf {
        self.document_dir(doc).join("style.yaml")
    }

    pub fn pandoc_config_file(&self, doc: &DocumentId) -> PathBuf {
        self.document_dir(doc).join("pandoc-config.yaml")
    }

    /// `{doc}/assets/images`
    pub fn assets_dir(&self, doc: &DocumentId) -> PathBuf {
        self.document_dir(doc).join("assets").join("images")
    }

    pub fn chapters_dir(&self, doc: &DocumentId) -> PathBuf {
        self.document_dir(doc).join("chapters")
    }

    /// `{doc}/chapters/{NN}`
    pub fn chapter_dir(&self, doc: &DocumentId, chapter: ChapterNumber) -> PathBuf {
        self.chapters_dir(doc).join(chapter.dir_name())
    }

    pub fn chapter_metadata_file(&self, doc: &DocumentId, chapter: ChapterNumber) -> PathBuf {
        self.chapter_dir(doc, chapter).join("metadata.yaml")
    }

    pub fn chapter_content_file(&self, doc: &DocumentId, chapter: ChapterNumber) -> PathBuf {
        self.chapter_dir(doc, chapter).join("chapter.md")
    }

    pub fn sections_dir(&self, doc: &DocumentId, chapter: ChapterNumber) -> PathBuf {
        self.chapter_dir(doc, chapter).join("sections")
    }

    pub fn section_file(
        &self,
        doc: &DocumentId,
        chapter: ChapterNumber,
        section: &SectionNumber,
    ) -> PathBuf {
        self.sections_dir(doc, chapter).join(format!("{section}.md"))
    }
}
