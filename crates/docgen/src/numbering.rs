use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DocgenError, Result};
use crate::model::{
    ChapterNumber, Figure, FigureId, MAX_SECTION_LEVEL, Section, SectionNumber, Table, TableId,
};
use crate::outline::Outline;

/// Strategy used to pick the number of a newly added section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionNumbering {
    /// Nest under the structurally last ancestor at each depth.
    #[default]
    Outline,
    /// Per-position maxima across every deep-enough section in the chapter.
    GlobalScan,
}

impl SectionNumbering {
    pub fn next(
        self,
        chapter: ChapterNumber,
        sections: &[Section],
        level: usize,
    ) -> Result<SectionNumber> {
        match self {
            SectionNumbering::Outline => next_section_number(chapter, sections, level),
            SectionNumbering::GlobalScan => next_section_number_by_scan(chapter, sections, level),
        }
    }
}

pub fn validate_level(level: usize) -> Result<()> {
    if !(1..=MAX_SECTION_LEVEL).contains(&level) {
        return Err(DocgenError::validation(format!(
            "section level must be between 1 and {MAX_SECTION_LEVEL}, got {level}"
        )));
    }
    Ok(())
}

/// Next number at `level`, following the last branch of the chapter outline.
pub fn next_section_number(
    chapter: ChapterNumber,
    sections: &[Section],
    level: usize,
) -> Result<SectionNumber> {
    validate_level(level)?;
    let outline = Outline::build(chapter, sections.iter().map(|s| &s.number));

    let mut components = Vec::with_capacity(level + 1);
    components.push(chapter.get());
    let mut node = Some(outline.root());
    for _ in 1..level {
        match node.and_then(|n| outline.last_child(n)) {
            Some(child) => {
                components.push(outline.value(child));
                node = Some(child);
            }
            None => {
                components.push(1);
                node = None;
            }
        }
    }
    let next = node
        .and_then(|n| outline.last_child(n))
        .map_or(1, |child| outline.value(child) + 1);
    components.push(next);

    Ok(SectionNumber::from_components_unchecked(components))
}

/// Next number at `level` using independent per-position maxima.
pub fn next_section_number_by_scan(
    chapter: ChapterNumber,
    sections: &[Section],
    level: usize,
) -> Result<SectionNumber> {
    validate_level(level)?;

    let mut maxima = vec![0u32; level + 1];
    for section in sections {
        let components = section.number.components();
        if components[0] != chapter.get() || components.len() < level {
            continue;
        }
        for (pos, max) in maxima.iter_mut().enumerate().skip(1) {
            if let Some(&value) = components.get(pos) {
                *max = (*max).max(value);
            }
        }
    }

    let mut components = Vec::with_capacity(level + 1);
    components.push(chapter.get());
    for &max in &maxima[1..level] {
        components.push(max.max(1));
    }
    components.push(maxima[level] + 1);

    Ok(SectionNumber::from_components_unchecked(components))
}

/// `max + 1`, or `1` when nothing exists yet. Gaps are never reused.
pub fn next_sequence(existing: impl IntoIterator<Item = u32>) -> u32 {
    existing.into_iter().max().unwrap_or(0) + 1
}

/// Closes the gap left by `deleted` among its later siblings and their subtrees.
///
/// The deleted section (and its subtree) must already be removed. Returns the
/// `(old, new)` pairs that changed, lowest old number first, which is also a
/// collision-free order for renaming keyed storage.
pub fn renumber_after_section_delete(
    sections: &mut [Section],
    deleted: &SectionNumber,
) -> Vec<(SectionNumber, SectionNumber)> {
    let level = deleted.level();
    let prefix = &deleted.components()[..level];
    let removed_value = deleted.components()[level];

    let mut changes = Vec::new();
    for section in sections.iter_mut() {
        let components = section.number.components();
        if components.len() <= level
            || &components[..level] != prefix
            || components[level] <= removed_value
        {
            continue;
        }
        let old = section.number.clone();
        section.number.components_mut()[level] -= 1;
        changes.push((old, section.number.clone()));
    }
    changes.sort_by(|a, b| a.0.cmp(&b.0));
    changes
}

/// Shifts figures after `deleted_sequence` down by one and regenerates their IDs.
pub fn compact_figures(figures: &mut [Figure], deleted_sequence: u32) -> Vec<(FigureId, FigureId)> {
    let mut changes = Vec::new();
    for figure in figures.iter_mut().filter(|f| f.sequence > deleted_sequence) {
        let old = figure.id.clone();
        figure.sequence -= 1;
        figure.id = FigureId::generate(figure.chapter, figure.sequence);
        changes.push((old, figure.id.clone()));
    }
    changes
}

pub fn compact_tables(tables: &mut [Table], deleted_sequence: u32) -> Vec<(TableId, TableId)> {
    let mut changes = Vec::new();
    for table in tables.iter_mut().filter(|t| t.sequence > deleted_sequence) {
        let old = table.id.clone();
        table.sequence -= 1;
        table.id = TableId::generate(table.chapter, table.sequence);
        changes.push((old, table.id.clone()));
    }
    changes
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RenameStep {
    pub from: ChapterNumber,
    pub to: ChapterNumber,
}

/// Ordered chapter renames, computed and validated before storage is touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChapterRenamePlan {
    steps: Vec<RenameStep>,
}

impl ChapterRenamePlan {
    /// Moves every chapter `>= from` up by one, highest number first.
    pub fn shift_up(numbers: &[ChapterNumber], from: ChapterNumber) -> Result<Self> {
        let mut affected: Vec<_> = numbers.iter().copied().filter(|n| *n >= from).collect();
        affected.sort_unstable_by(|a, b| b.cmp(a));
        let steps = affected
            .into_iter()
            .map(|n| n.offset(1).map(|to| RenameStep { from: n, to }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// Moves every chapter `> after` down by one, lowest number first.
    pub fn shift_down(numbers: &[ChapterNumber], after: ChapterNumber) -> Result<Self> {
        let mut affected: Vec<_> = numbers.iter().copied().filter(|n| *n > after).collect();
        affected.sort_unstable();
        let steps = affected
            .into_iter()
            .map(|n| n.offset(-1).map(|to| RenameStep { from: n, to }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// Renumbers a whole document so the chapter at index `i` of
    /// `current_order` ends up as chapter `i + 1`.
    ///
    /// Chapters that change are first staged above the live range
    /// (`old -> old + N`) and then moved into place (`old + N -> new`).
    /// Chapters already at their final number get no steps, which leaves the
    /// same result as renaming every chapter.
    pub fn reorder(current_order: &[ChapterNumber]) -> Result<Self> {
        let total = current_order.len() as i64;
        let moves: Vec<_> = current_order
            .iter()
            .enumerate()
            .map(|(idx, old)| (*old, ChapterNumber::from_index(idx)))
            .filter(|(old, new)| old != new)
            .collect();

        let mut steps = Vec::with_capacity(moves.len() * 2);
        for (old, _) in &moves {
            steps.push(RenameStep {
                from: *old,
                to: old.offset(total)?,
            });
        }
        for (old, new) in &moves {
            steps.push(RenameStep {
                from: old.offset(total)?,
                to: *new,
            });
        }
        Ok(Self { steps })
    }

    /// Simulates the plan against the chapters that currently exist.
    pub fn validate(&self, occupied: &[ChapterNumber]) -> Result<()> {
        let mut sources = BTreeSet::new();
        let mut targets = BTreeSet::new();
        for step in &self.steps {
            if !sources.insert(step.from) {
                return Err(DocgenError::validation(format!(
                    "rename plan moves chapter {} twice",
                    step.from
                )));
            }
            if !targets.insert(step.to) {
                return Err(DocgenError::validation(format!(
                    "rename plan targets chapter {} twice",
                    step.to
                )));
            }
        }

        let mut live: BTreeSet<_> = occupied.iter().copied().collect();
        for step in &self.steps {
            if !live.remove(&step.from) {
                return Err(DocgenError::validation(format!(
                    "rename {} -> {}: source chapter does not exist",
                    step.from, step.to
                )));
            }
            if !live.insert(step.to) {
                return Err(DocgenError::validation(format!(
                    "rename {} -> {}: target chapter is occupied",
                    step.from, step.to
                )));
            }
        }
        Ok(())
    }

    pub fn steps(&self) -> &[RenameStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
