use std::process::ExitCode;

use crate::commands::CommandResult;
use crate::commands::doc::DocumentSummary;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Prints a `CommandResult` as text or a single JSON line and maps it to an exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::DocumentCreated { summary, path } => {
            println!("Created document '{}' at {}", summary.id, path);
        }
        CommandResult::DocumentList { documents } => {
            println!("Documents ({}):", documents.len());
            for doc in documents {
                println!("  - {}", describe_document(doc));
            }
        }
        CommandResult::DocumentShown { summary, chapters } => {
            println!("{}", describe_document(summary));
            for chapter in chapters {
                println!(
                    "  {:>3}. {} (sections: {}, figures: {}, tables: {})",
                    chapter.number, chapter.title, chapter.sections, chapter.figures, chapter.tables
                );
            }
        }
        CommandResult::DocumentDeleted { document } => {
            println!("Deleted document '{document}'");
        }
        CommandResult::DocumentConfigured {
            document,
            style,
            pandoc,
        } => {
            println!("Configured document '{document}'");
            println!(
                "  Style: {} {}, line spacing {}",
                style.font_family, style.font_size, style.line_spacing
            );
            println!(
                "  Converter: {} (toc: {}, depth {})",
                pandoc.pdf_engine, pandoc.toc, pandoc.toc_depth
            );
        }
        CommandResult::Validation { document, report } => {
            if report.valid {
                println!("Document '{document}': OK");
            } else {
                println!(
                    "Document '{document}': FAIL ({} errors)",
                    report.errors.len()
                );
            }
            for error in &report.errors {
                println!("  [ERR] {error}");
            }
            for warning in &report.warnings {
                println!("  [WARN] {warning}");
            }
        }
        CommandResult::Exported { document, path } => {
            println!("Exported '{document}' to {path}");
        }
        CommandResult::ChapterAdded { document, chapter } => {
            println!(
                "Added chapter {}: {} to '{document}'",
                chapter.number, chapter.title
            );
        }
        CommandResult::ChapterDeleted { document, number } => {
            println!("Deleted chapter {number} from '{document}'");
        }
        CommandResult::ChapterMoved { document, from, to } => {
            println!("Moved chapter {from} to position {to} in '{document}'");
        }
        CommandResult::ChapterRenamed {
            document,
            number,
            title,
        } => {
            println!("Renamed chapter {number} of '{document}' to '{title}'");
        }
        CommandResult::ChapterShown { document, chapter } => {
            println!("Chapter {}: {} ('{document}')", chapter.number, chapter.title);
            for section in &chapter.sections {
                let indent = "  ".repeat(section.level);
                println!("{indent}{} {}", section.number, section.title);
            }
            for figure in &chapter.figures {
                println!("  [{}] {}", figure.id, figure.caption);
            }
            for table in &chapter.tables {
                println!("  [{}] {}", table.id, table.caption);
            }
        }
        CommandResult::ChaptersRebuilt { document, chapters } => {
            let list: Vec<_> = chapters.iter().map(u32::to_string).collect();
            println!(
                "Rebuilt {} chapter(s) of '{document}': {}",
                chapters.len(),
                list.join(", ")
            );
        }
        CommandResult::SectionAdded { document, section } => {
            println!(
                "Added section {} {} to '{document}'",
                section.number, section.title
            );
        }
        CommandResult::SectionUpdated { document, section } => {
            println!(
                "Updated section {} {} in '{document}'",
                section.number, section.title
            );
        }
        CommandResult::SectionDeleted { document, removed } => {
            println!(
                "Deleted section(s) {} from '{document}'",
                removed.join(", ")
            );
        }
        CommandResult::SectionShown {
            section, content, ..
        } => {
            println!("{} {}", section.number, section.title);
            println!();
            println!("{content}");
        }
        CommandResult::AssetChanged {
            document,
            kind,
            action,
            id,
        } => {
            println!("{} {} {id} in '{document}'", action.label(), kind.label());
        }
    }
}

fn describe_document(doc: &DocumentSummary) -> String {
    format!(
        "{} \"{}\" by {} ({}, {} chapters)",
        doc.id, doc.title, doc.author, doc.doc_type, doc.chapters
    )
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = serde_json::to_string(result)?;
    println!("{payload}");
    Ok(())
}
