//! The ordered collection of marks produced by one scan.

use crate::mark::Mark;
use serde::{Deserialize, Serialize};

/// Marks in scanner output order.
///
/// Append-only while a scan runs. After the scan completes the list is
/// ordered by start position; marks with equal starts keep the order in
/// which the scanner discovered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkList {
    marks: Vec<Mark>,
}

impl MarkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Mark> {
        self.marks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.marks.iter()
    }

    pub fn as_slice(&self) -> &[Mark] {
        &self.marks
    }

    /// A new list ordered by start position (stable for equal starts).
    pub fn sorted(&self) -> MarkList {
        let mut marks = self.marks.clone();
        marks.sort_by_key(|m| m.start);
        MarkList { marks }
    }

    /// Whether start positions never decrease.
    pub fn is_sorted(&self) -> bool {
        self.marks.windows(2).all(|w| w[0].start <= w[1].start)
    }

    /// Marks whose kind has the given [`name`](crate::MarkKind::name).
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Mark> + 'a {
        self.marks.iter().filter(move |m| m.name() == name)
    }

    /// Apply `f` to every mark in place.
    ///
    /// Used by the reference resolution pass, which fills in link targets
    /// after the scan without moving any mark.
    pub fn update_each(&mut self, f: impl FnMut(&mut Mark)) {
        self.marks.iter_mut().for_each(f);
    }

    pub fn into_vec(self) -> Vec<Mark> {
        self.marks
    }
}

impl From<Vec<Mark>> for MarkList {
    fn from(marks: Vec<Mark>) -> Self {
        Self { marks }
    }
}

impl FromIterator<Mark> for MarkList {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        Self {
            marks: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MarkList {
    type Item = Mark;
    type IntoIter = std::vec::IntoIter<Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.into_iter()
    }
}

impl<'a> IntoIterator for &'a MarkList {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.iter()
    }
}

impl std::ops::Index<usize> for MarkList {
    type Output = Mark;

    fn index(&self, index: usize) -> &Mark {
        &self.marks[index]
    }
}
