use crate::model::Chapter;

/// Renders a chapter's markdown from its title and sections in stored order.
///
/// Section content must already be loaded onto each section. Output is a pure
/// function of the chapter, so unchanged input yields byte-identical output.
pub fn render_chapter(chapter: &Chapter) -> String {
    let mut out = format!("# Chapter {}: {}\n\n", chapter.number, chapter.title);
    for section in &chapter.sections {
        let hashes = "#".repeat(section.number.level() + 1);
        out.push_str(&format!(
            "{hashes} {} {}\n\n{}\n\n",
            section.number, section.title, section.content
        ));
    }
    out
}
