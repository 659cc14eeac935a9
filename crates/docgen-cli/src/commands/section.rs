use clap::{Arg, ArgGroup, ArgMatches, Command, value_parser};
use docgen::{MAX_SECTION_LEVEL, Section};
use serde::Serialize;

use crate::commands::{CommandResult, chapter_arg, document_arg};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

#[derive(Clone, Debug, Serialize)]
pub struct SectionSummary {
    pub number: String,
    pub title: String,
    pub level: usize,
}

impl From<&Section> for SectionSummary {
    fn from(section: &Section) -> Self {
        Self {
            number: section.number.to_string(),
            title: section.title.clone(),
            level: section.level,
        }
    }
}

fn section_arg() -> Arg {
    Arg::new("section")
        .value_name("SECTION")
        .required(true)
        .help("Dotted section number, e.g. 2.1.3")
}

fn content_args(command: Command, required: bool) -> Command {
    command
        .arg(
            Arg::new("content")
                .long("content")
                .value_name("TEXT")
                .help("Markdown content"),
        )
        .arg(
            Arg::new("content-file")
                .long("content-file")
                .value_name("PATH")
                .help("Read markdown content from a file"),
        )
        .group(
            ArgGroup::new("body")
                .args(["content", "content-file"])
                .required(required),
        )
}

pub fn command() -> Command {
    Command::new("section")
        .about("Manage numbered sections within a chapter")
        .subcommand_required(true)
        .subcommand(content_args(
            Command::new("add")
                .about("Add a section at the given nesting level")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(Arg::new("title").long("title").required(true))
                .arg(
                    Arg::new("level")
                        .long("level")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help(format!("Nesting level, 1 to {MAX_SECTION_LEVEL}")),
                ),
            true,
        ))
        .subcommand(content_args(
            Command::new("update")
                .about("Replace a section's content or title")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(section_arg())
                .arg(Arg::new("title").long("title")),
            false,
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete a section with its subsections")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(section_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Print a section's content")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(section_arg()),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("add", sub)) => add_section(session, sub),
        Some(("update", sub)) => update_section(session, sub),
        Some(("delete", sub)) => delete_section(session, sub),
        Some(("show", sub)) => show_section(session, sub),
        _ => Err(CliError::usage("unsupported section command")),
    }
}

fn add_section(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapter = util::chapter_number(matches, "chapter")?;
    let title = util::required(matches, "title")?;
    let level = matches.get_one::<usize>("level").copied().unwrap_or(1);
    let content = util::required_content(matches)?;

    let number = session
        .manager
        .add_section(&id, chapter, title, &content, level)?;
    let section = session.manager.get_section(&id, chapter, &number)?;
    Ok(CommandResult::SectionAdded {
        document: id.to_string(),
        section: SectionSummary::from(&section),
    })
}

fn update_section(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapter = util::chapter_number(matches, "chapter")?;
    let number = util::section_number(matches)?;
    let content = util::content(matches)?;
    let title = matches.get_one::<String>("title");
    if content.is_none() && title.is_none() {
        return Err(CliError::usage(
            "section update needs --content, --content-file, or --title",
        ));
    }

    if let Some(content) = &content {
        session
            .manager
            .update_section(&id, chapter, &number, content)?;
    }
    if let Some(title) = title {
        session
            .manager
            .update_section_title(&id, chapter, &number, title)?;
    }
    let section = session.manager.get_section(&id, chapter, &number)?;
    Ok(CommandResult::SectionUpdated {
        document: id.to_string(),
        section: SectionSummary::from(&section),
    })
}

fn delete_section(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapter = util::chapter_number(matches, "chapter")?;
    let number = util::section_number(matches)?;
    let removed = session
        .manager
        .delete_section(&id, chapter, &number)?
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(CommandResult::SectionDeleted {
        document: id.to_string(),
        removed,
    })
}

fn show_section(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapter = util::chapter_number(matches, "chapter")?;
    let number = util::section_number(matches)?;
    let section = session.manager.get_section(&id, chapter, &number)?;
    Ok(CommandResult::SectionShown {
        document: id.to_string(),
        section: SectionSummary::from(&section),
        content: section.content.clone(),
    })
}
