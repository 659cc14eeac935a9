use clap::{Arg, ArgMatches, Command, value_parser};
use docgen::{Chapter, ChapterEntry, DocgenError};
use serde::Serialize;

use crate::commands::{CommandResult, chapter_arg, document_arg};
use crate::commands::section::SectionSummary;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

#[derive(Clone, Debug, Serialize)]
pub struct ChapterSummary {
    pub number: u32,
    pub title: String,
    pub sections: usize,
    pub figures: usize,
    pub tables: usize,
}

impl From<&ChapterEntry> for ChapterSummary {
    fn from(entry: &ChapterEntry) -> Self {
        Self {
            number: entry.number.get(),
            title: entry.title.clone(),
            sections: entry.counts.sections,
            figures: entry.counts.figures,
            tables: entry.counts.tables,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AssetSummary {
    pub id: String,
    pub caption: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChapterDetail {
    pub number: u32,
    pub title: String,
    pub sections: Vec<SectionSummary>,
    pub figures: Vec<AssetSummary>,
    pub tables: Vec<AssetSummary>,
}

impl From<&Chapter> for ChapterDetail {
    fn from(chapter: &Chapter) -> Self {
        Self {
            number: chapter.number.get(),
            title: chapter.title.clone(),
            sections: chapter.sections.iter().map(SectionSummary::from).collect(),
            figures: chapter
                .figures
                .iter()
                .map(|f| AssetSummary {
                    id: f.id.to_string(),
                    caption: f.caption.clone(),
                })
                .collect(),
            tables: chapter
                .tables
                .iter()
                .map(|t| AssetSummary {
                    id: t.id.to_string(),
                    caption: t.caption.clone(),
                })
                .collect(),
        }
    }
}

pub fn command() -> Command {
    Command::new("chapter")
        .about("Add, remove, reorder, and render chapters")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Append a chapter, or insert it at a position")
                .arg(document_arg())
                .arg(Arg::new("title").long("title").required(true))
                .arg(
                    Arg::new("position")
                        .long("position")
                        .value_name("N")
                        .value_parser(value_parser!(u32))
                        .help("Insert at N, shifting chapters N.. up by one"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a chapter and renumber the ones after it")
                .arg(document_arg())
                .arg(chapter_arg("chapter")),
        )
        .subcommand(
            Command::new("move")
                .about("Move a chapter to another position")
                .arg(document_arg())
                .arg(chapter_arg("from"))
                .arg(chapter_arg("to")),
        )
        .subcommand(
            Command::new("rename")
                .about("Change a chapter's title")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(Arg::new("title").value_name("TITLE").required(true)),
        )
        .subcommand(
            Command::new("show")
                .about("Show a chapter's sections, figures, and tables")
                .arg(document_arg())
                .arg(chapter_arg("chapter")),
        )
        .subcommand(
            Command::new("rebuild")
                .about("Regenerate chapter markdown from its sections")
                .arg(document_arg())
                .arg(
                    Arg::new("chapter")
                        .value_name("CHAPTER")
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Rebuild only this chapter; defaults to every chapter"),
                ),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("add", sub)) => add_chapter(session, sub),
        Some(("delete", sub)) => delete_chapter(session, sub),
        Some(("move", sub)) => move_chapter(session, sub),
        Some(("rename", sub)) => rename_chapter(session, sub),
        Some(("show", sub)) => show_chapter(session, sub),
        Some(("rebuild", sub)) => rebuild_chapters(session, sub),
        _ => Err(CliError::usage("unsupported chapter command")),
    }
}

fn add_chapter(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let title = util::required(matches, "title")?;
    let position = matches.get_one::<u32>("position").copied();

    let number = session.manager.add_chapter(&id, title, position)?;
    let manifest = session.manager.get_manifest(&id)?;
    let entry = manifest
        .entry(number)
        .ok_or_else(|| CliError::from(DocgenError::not_found("chapter", number)))?;
    Ok(CommandResult::ChapterAdded {
        document: id.to_string(),
        chapter: ChapterSummary::from(entry),
    })
}

fn delete_chapter(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let number = util::chapter_number(matches, "chapter")?;
    session.manager.delete_chapter(&id, number)?;
    Ok(CommandResult::ChapterDeleted {
        document: id.to_string(),
        number: number.get(),
    })
}

fn move_chapter(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let from = util::chapter_number(matches, "from")?;
    let to = util::chapter_number(matches, "to")?;
    session.manager.move_chapter(&id, from, to)?;
    Ok(CommandResult::ChapterMoved {
        document: id.to_string(),
        from: from.get(),
        to: to.get(),
    })
}

fn rename_chapter(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let number = util::chapter_number(matches, "chapter")?;
    let title = util::required(matches, "title")?;
    session.manager.update_chapter_title(&id, number, title)?;
    Ok(CommandResult::ChapterRenamed {
        document: id.to_string(),
        number: number.get(),
        title: title.trim().to_string(),
    })
}

fn show_chapter(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let number = util::chapter_number(matches, "chapter")?;
    let chapter = session.manager.get_chapter(&id, number)?;
    Ok(CommandResult::ChapterShown {
        document: id.to_string(),
        chapter: ChapterDetail::from(&chapter),
    })
}

fn rebuild_chapters(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapters = if matches.contains_id("chapter") {
        let number = util::chapter_number(matches, "chapter")?;
        session.manager.rebuild_chapter(&id, number)?;
        vec![number.get()]
    } else {
        session.manager.rebuild_all(&id)?;
        session
            .manager
            .get_manifest(&id)?
            .chapter_numbers()
            .into_iter()
            .map(|n| n.get())
            .collect()
    };
    Ok(CommandResult::ChaptersRebuilt {
        document: id.to_string(),
        chapters,
    })
}
