use clap::{Arg, ArgGroup, ArgMatches, Command};

use crate::commands::{AssetAction, AssetKind, CommandResult, chapter_arg, document_arg};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

fn table_arg() -> Arg {
    Arg::new("table")
        .value_name("TABLE")
        .required(true)
        .help("Table identifier, e.g. table-2.1")
}

fn body_args(command: Command) -> Command {
    command
        .arg(Arg::new("content").long("content").value_name("MARKDOWN"))
        .arg(Arg::new("content-file").long("content-file").value_name("PATH"))
        .group(ArgGroup::new("body").args(["content", "content-file"]))
}

pub fn command() -> Command {
    Command::new("table")
        .about("Manage chapter tables")
        .subcommand_required(true)
        .subcommand(body_args(
            Command::new("add")
                .about("Add a markdown table to a chapter")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(Arg::new("caption").long("caption").required(true)),
        ))
        .subcommand(body_args(
            Command::new("update")
                .about("Replace a table's caption or content")
                .arg(document_arg())
                .arg(table_arg())
                .arg(Arg::new("caption").long("caption")),
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete a table and renumber the rest of its chapter")
                .arg(document_arg())
                .arg(table_arg()),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("add", sub)) => add_table(session, sub),
        Some(("update", sub)) => update_table(session, sub),
        Some(("delete", sub)) => delete_table(session, sub),
        _ => Err(CliError::usage("unsupported table command")),
    }
}

fn add_table(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapter = util::chapter_number(matches, "chapter")?;
    let caption = util::required(matches, "caption")?;
    let content = util::required_content(matches)?;
    let table = session.manager.add_table(&id, chapter, caption, &content)?;
    Ok(CommandResult::AssetChanged {
        document: id.to_string(),
        kind: AssetKind::Table,
        action: AssetAction::Added,
        id: table.to_string(),
    })
}

fn update_table(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let table = util::table_id(matches)?;
    let caption = matches.get_one::<String>("caption").map(String::as_str);
    let content = util::content(matches)?;
    session
        .manager
        .update_table(&id, &table, caption, content.as_deref())?;
    Ok(CommandResult::AssetChanged {
        document: id.to_string(),
        kind: AssetKind::Table,
        action: AssetAction::Updated,
        id: table.to_string(),
    })
}

fn delete_table(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let table = util::table_id(matches)?;
    session.manager.delete_table(&id, &table)?;
    Ok(CommandResult::AssetChanged {
        document: id.to_string(),
        kind: AssetKind::Table,
        action: AssetAction::Deleted,
        id: table.to_string(),
    })
}
