use clap::{Arg, ArgMatches, Command};
use docgen::{AddImageOptions, ImageAlignment, ImagePosition};

use crate::commands::{AssetAction, AssetKind, CommandResult, chapter_arg, document_arg};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

fn figure_arg() -> Arg {
    Arg::new("figure")
        .value_name("FIGURE")
        .required(true)
        .help("Figure identifier, e.g. fig-2.1")
}

pub fn command() -> Command {
    Command::new("figure")
        .about("Manage chapter figures")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add an image to a chapter")
                .arg(document_arg())
                .arg(chapter_arg("chapter"))
                .arg(Arg::new("path").long("path").value_name("PATH").required(true))
                .arg(Arg::new("caption").long("caption").required(true))
                .arg(
                    Arg::new("position")
                        .long("position")
                        .value_parser(|s: &str| s.parse::<ImagePosition>())
                        .help("here, top, bottom, page, or float"),
                )
                .arg(
                    Arg::new("alignment")
                        .long("alignment")
                        .value_parser(|s: &str| s.parse::<ImageAlignment>())
                        .help("left, center, or right"),
                )
                .arg(Arg::new("width").long("width").help("LaTeX width, e.g. 0.8\\textwidth")),
        )
        .subcommand(
            Command::new("caption")
                .about("Replace a figure's caption")
                .arg(document_arg())
                .arg(figure_arg())
                .arg(Arg::new("caption").value_name("CAPTION").required(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a figure and renumber the rest of its chapter")
                .arg(document_arg())
                .arg(figure_arg()),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("add", sub)) => add_figure(session, sub),
        Some(("caption", sub)) => caption_figure(session, sub),
        Some(("delete", sub)) => delete_figure(session, sub),
        _ => Err(CliError::usage("unsupported figure command")),
    }
}

fn add_figure(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let chapter = util::chapter_number(matches, "chapter")?;
    let mut options = AddImageOptions::new(
        util::required(matches, "path")?,
        util::required(matches, "caption")?,
    );
    if let Some(position) = matches.get_one::<ImagePosition>("position") {
        options = options.position(*position);
    }
    if let Some(alignment) = matches.get_one::<ImageAlignment>("alignment") {
        options = options.alignment(*alignment);
    }
    if let Some(width) = matches.get_one::<String>("width") {
        options = options.width(width);
    }

    let figure = session.manager.add_image(&id, chapter, options)?;
    Ok(CommandResult::AssetChanged {
        document: id.to_string(),
        kind: AssetKind::Figure,
        action: AssetAction::Added,
        id: figure.to_string(),
    })
}

fn caption_figure(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let figure = util::figure_id(matches)?;
    let caption = util::required(matches, "caption")?;
    session.manager.update_image_caption(&id, &figure, caption)?;
    Ok(CommandResult::AssetChanged {
        document: id.to_string(),
        kind: AssetKind::Figure,
        action: AssetAction::Updated,
        id: figure.to_string(),
    })
}

fn delete_figure(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let id = util::document_id(matches)?;
    let figure = util::figure_id(matches)?;
    session.manager.delete_image(&id, &figure)?;
    Ok(CommandResult::AssetChanged {
        document: id.to_string(),
        kind: AssetKind::Figure,
        action: AssetAction::Deleted,
        id: figure.to_string(),
    })
}
