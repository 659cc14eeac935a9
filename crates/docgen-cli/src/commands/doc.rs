use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use docgen::{ChapterNumber, DocumentType, Manifest, MarkdownAssembler};
use serde::Serialize;

use crate::commands::{CommandResult, document_arg};
use crate::commands::chapter::ChapterSummary;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

#[derive(Clone, Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub doc_type: DocumentType,
    pub chapters: usize,
    pub sections: usize,
    pub figures: usize,
    pub tables: usize,
}

impl From<&Manifest> for DocumentSummary {
    fn from(manifest: &Manifest) -> Self {
        Self {
            id: manifest.document.id.to_string(),
            title: manifest.document.title.clone(),
            author: manifest.document.author.clone(),
            doc_type: manifest.document.doc_type,
            chapters: manifest.chapter_count(),
            sections: manifest.total_sections(),
            figures: manifest.total_figures(),
            tables: manifest.total_tables(),
        }
    }
}

pub fn command() -> Command {
    Command::new("doc")
        .about("Create, inspect, and export documents")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a new document")
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("author").long("author").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TYPE")
                        .default_value("book")
                        .value_parser(|s: &str| s.parse::<DocumentType>())
                        .help("book, report, article, or letter"),
                ),
        )
        .subcommand(Command::new("ls").about("List stored documents"))
        .subcommand(
            Command::new("show")
                .about("Show a document's chapters")
                .arg(document_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a document and everything in it")
                .arg(document_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check numbering and manifest consistency")
                .arg(document_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Write the combined markdown to the exports directory")
                .arg(document_arg())
                .arg(
                    Arg::new("chapter")
                        .long("chapter")
                        .value_name("N")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Export only these chapters, in the order given"),
                )
                .arg(
                    Arg::new("no-page-breaks")
                        .long("no-page-breaks")
                        .action(ArgAction::SetTrue)
                        .help("Omit the page break emitted before each chapter"),
                ),
        )
        .subcommand(
            Command::new("configure")
                .about("Update a document's style and converter settings")
                .arg(document_arg())
                .arg(Arg::new("font-family").long("font-family"))
                .arg(Arg::new("font-size").long("font-size"))
                .arg(Arg::new("line-spacing").long("line-spacing"))
                .arg(Arg::new("pdf-engine").long("pdf-engine"))
                .arg(
                    Arg::new("toc-depth")
                        .long("toc-depth")
                        .value_parser(value_parser!(u8).range(1..=6)),
                )
                .arg(
                    Arg::new("no-toc")
                        .long("no-toc")
                        .action(ArgAction::SetTrue)
                        .help("Disable the table of contents"),
                ),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("create", sub)) => create_document(session, sub),
        Some(("ls", _)) => list_documents(session),
        Some(("show", sub)) => show_document(session, sub),
        Some(("delete", sub)) => delete_document(session, sub),
        Some(("validate", sub)) => validate_document(session, sub),
        Some(("export", sub)) => export_document(session, sub),
        Some(("configure", sub)) => configure_document(session, sub),
        _ => Err(CliError::usage("unsupported doc command")),
    }
}

fn create_document(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let title = util::required(matches, "title")?;
    let author = util::required(matches, "author")?;
    let doc_type = matches
        .get_one::<DocumentType>("type")
        .copied()
        .unwrap_or(DocumentType::Book);

    let id = session.manager.create_document(title, author, doc_type)?;
    let manifest = session.manager.get_manifest(&id)?;
    Ok(CommandResult::DocumentCreated {
        summary: DocumentSummary::from(&manifest),
        path: session.paths.document_dir(&id).display().to_string(),
    })
}

fn list_documents(session: &CliSession) -> Result<CommandResult, CliError> {
    let documents = session
        .manager
        .list_documents()?
        .iter()
        .map(DocumentSummary::from)
        .collect();
    Ok(CommandResult::DocumentList { documents })
}

fn show_document(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let manifest = session.manager.get_manifest(&id)?;
    let chapters = manifest.chapters.iter().map(ChapterSummary::from).collect();
    Ok(CommandResult::DocumentShown {
        summary: DocumentSummary::from(&manifest),
        chapters,
    })
}

fn delete_document(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    session.manager.delete_document(&id)?;
    Ok(CommandResult::DocumentDeleted {
        document: id.to_string(),
    })
}

fn validate_document(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let report = session.manager.validate(&id)?;
    Ok(CommandResult::Validation {
        document: id.to_string(),
        report,
    })
}

fn export_document(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapters = matches
        .get_many::<u32>("chapter")
        .map(|values| {
            values
                .map(|n| ChapterNumber::new(*n))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let mut assembler = MarkdownAssembler::new();
    if matches.get_flag("no-page-breaks") {
        assembler = assembler.without_page_breaks();
    }

    let path = session
        .manager
        .export_markdown_with(&id, chapters.as_deref(), assembler)?;
    Ok(CommandResult::Exported {
        document: id.to_string(),
        path: path.display().to_string(),
    })
}

fn configure_document(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let mut style = session.manager.load_style(&id)?;
    let mut pandoc = session.manager.load_pandoc_config(&id)?;

    if let Some(value) = matches.get_one::<String>("font-family") {
        style.font_family = value.clone();
    }
    if let Some(value) = matches.get_one::<String>("font-size") {
        style.font_size = value.clone();
    }
    if let Some(value) = matches.get_one::<String>("line-spacing") {
        style.line_spacing = value.clone();
    }
    if let Some(value) = matches.get_one::<String>("pdf-engine") {
        pandoc.pdf_engine = value.clone();
    }
    if let Some(depth) = matches.get_one::<u8>("toc-depth") {
        pandoc.toc_depth = *depth;
    }
    if matches.get_flag("no-toc") {
        pandoc.toc = false;
    }

    session
        .manager
        .configure_document(&id, Some(&style), Some(&pandoc))?;
    Ok(CommandResult::DocumentConfigured {
        document: id.to_string(),
        style,
        pandoc,
    })
}
