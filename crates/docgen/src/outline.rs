//! Tree view over a chapter's flat section list.
//!
//! Sections are persisted as a flat list of dotted numbers. The outline arranges
//! them into an arena of nodes so that structural questions ("what is the last
//! child of 1.2?", "which sections live under 1.3?") are answered by walking
//! parent/child links instead of comparing number prefixes by hand.
//!
//! Missing ancestors (for example `1.2.1` stored without `1.2`) are represented
//! by placeholder nodes that carry a value but no section number.

use crate::model::{ChapterNumber, SectionNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    value: u32,
    number: Option<SectionNumber>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct Outline {
    chapter: ChapterNumber,
    nodes: Vec<Node>,
}

impl Outline {
    /// Builds the outline rooted at `chapter`. Numbers whose first component
    /// names another chapter are ignored.
    pub fn build<'a>(
        chapter: ChapterNumber,
        numbers: impl IntoIterator<Item = &'a SectionNumber>,
    ) -> Self {
        let mut outline = Self {
            chapter,
            nodes: vec![Node {
                value: chapter.get(),
                number: None,
                children: Vec::new(),
            }],
        };
        for number in numbers {
            if number.chapter() != chapter.get() {
                continue;
            }
            outline.insert(number);
        }
        outline
    }

    fn insert(&mut self, number: &SectionNumber) {
        let mut current = self.root();
        for &value in &number.components()[1..] {
            current = match self.child_with_value(current, value) {
                Some(existing) => existing,
                None => self.push_child(current, value),
            };
        }
        self.nodes[current.0].number = Some(number.clone());
    }

    fn push_child(&mut self, parent: NodeId, value: u32) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            number: None,
            children: Vec::new(),
        });
        let nodes = &self.nodes;
        let siblings = &self.nodes[parent.0].children;
        let at = siblings.partition_point(|child| nodes[child.0].value < value);
        self.nodes[parent.0].children.insert(at, id);
        id
    }

    fn child_with_value(&self, parent: NodeId, value: u32) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.value(*child) == value)
    }

    pub fn chapter(&self) -> ChapterNumber {
        self.chapter
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Children ordered by ascending value.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    pub fn value(&self, node: NodeId) -> u32 {
        self.nodes[node.0].value
    }

    /// Section number stored at `node`; `None` for the root and placeholders.
    pub fn number(&self, node: NodeId) -> Option<&SectionNumber> {
        self.nodes[node.0].number.as_ref()
    }

    pub fn find(&self, number: &SectionNumber) -> Option<NodeId> {
        if number.chapter() != self.chapter.get() {
            return None;
        }
        let mut current = self.root();
        for &value in &number.components()[1..] {
            current = self.child_with_value(current, value)?;
        }
        Some(current)
    }

    /// Stored section numbers strictly below `number`, in structural order.
    pub fn descendants(&self, number: &SectionNumber) -> Vec<SectionNumber> {
        let Some(node) = self.find(number) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for child in self.children(node) {
            self.collect(*child, &mut out);
        }
        out
    }

    /// Every stored section number in depth-first (document) order.
    pub fn depth_first(&self) -> Vec<SectionNumber> {
        let mut out = Vec::new();
        for child in self.children(self.root()) {
            self.collect(*child, &mut out);
        }
        out
    }

    fn collect(&self, node: NodeId, out: &mut Vec<SectionNumber>) {
        if let Some(number) = self.number(node) {
            out.push(number.clone());
        }
        for child in self.children(node) {
            self.collect(*child, out);
        }
    }
}
