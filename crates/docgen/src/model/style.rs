use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Formatting preferences handed to the external exporter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub font_family: String,
    pub font_size: String,
    pub margins: Margins,
    pub line_spacing: String,
    #[serde(default)]
    pub header_footer: HeaderFooter,
    #[serde(default)]
    pub numbering_style: NumberingStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            font_size: "12pt".to_string(),
            margins: Margins::default(),
            line_spacing: "1.5".to_string(),
            header_footer: HeaderFooter::default(),
            numbering_style: NumberingStyle::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: "1in".to_string(),
            bottom: "1in".to_string(),
            left: "1in".to_string(),
            right: "1in".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooter {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub footer: String,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            header: String::new(),
            footer: "Page \\thepage".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingStyle {
    pub chapters: bool,
    pub sections: bool,
    pub figures: bool,
    pub tables: bool,
}

impl Default for NumberingStyle {
    fn default() -> Self {
        Self {
            chapters: true,
            sections: true,
            figures: true,
            tables: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PandocConfig {
    pub pdf_engine: String,
    pub toc: bool,
    pub toc_depth: u8,
    pub citation_style: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Default for PandocConfig {
    fn default() -> Self {
        Self {
            pdf_engine: "pdflatex".to_string(),
            toc: true,
            toc_depth: 3,
            citation_style: "apa".to_string(),
            args: Vec::new(),
            variables: BTreeMap::new(),
        }
    }
}
