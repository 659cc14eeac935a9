use std::fs;

use clap::ArgMatches;
use docgen::{ChapterNumber, DocumentId, FigureId, SectionNumber, TableId};

use crate::error::CliError;

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

pub fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String, CliError> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| CliError::usage(format!("{id} is required")))
}

pub fn document_id(matches: &ArgMatches) -> Result<DocumentId, CliError> {
    Ok(DocumentId::parse(required(matches, "document")?)?)
}

pub fn chapter_number(matches: &ArgMatches, id: &str) -> Result<ChapterNumber, CliError> {
    let value = matches
        .get_one::<u32>(id)
        .copied()
        .ok_or_else(|| CliError::usage(format!("{id} is required")))?;
    Ok(ChapterNumber::new(value)?)
}

pub fn section_number(matches: &ArgMatches) -> Result<SectionNumber, CliError> {
    Ok(SectionNumber::parse(required(matches, "section")?)?)
}

pub fn figure_id(matches: &ArgMatches) -> Result<FigureId, CliError> {
    Ok(FigureId::parse(required(matches, "figure")?)?)
}

pub fn table_id(matches: &ArgMatches) -> Result<TableId, CliError> {
    Ok(TableId::parse(required(matches, "table")?)?)
}

/// Reads `--content` or the file named by `--content-file`, whichever was given.
pub fn content(matches: &ArgMatches) -> Result<Option<String>, CliError> {
    if let Some(inline) = matches.get_one::<String>("content") {
        return Ok(Some(inline.clone()));
    }
    match matches.get_one::<String>("content-file") {
        Some(path) => Ok(Some(fs::read_to_string(path)?)),
        None => Ok(None),
    }
}

pub fn required_content(matches: &ArgMatches) -> Result<String, CliError> {
    content(matches)?.ok_or_else(|| CliError::usage("--content or --content-file is required"))
}
