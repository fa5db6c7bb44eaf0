//! Sheet map snapshot and coordinate resolution

use crate::slug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of one group's tracking sheet layout.
///
/// `solved` is keyed by row index serialized as a string (the endpoint emits
/// it that way) and is only used for "already solved" hints, never for
/// delivery correctness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetMap {
    /// Canonical problem slug -> column index.
    pub problems: HashMap<String, u32>,
    /// Student display name -> row index.
    pub students: HashMap<String, u32>,
    /// Row index (string key) -> columns already marked solved.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub solved: HashMap<String, Vec<u32>>,
}

impl SheetMap {
    /// Row for a student: exact name match first, then a case-folded scan.
    pub fn row_for_student(&self, name: &str) -> Option<u32> {
        let key = name.trim();
        if let Some(row) = self.students.get(key) {
            return Some(*row);
        }
        let lower = key.to_lowercase();
        self.students
            .iter()
            .find(|(k, _)| k.to_lowercase() == lower)
            .map(|(_, row)| *row)
    }

    /// Column for a problem URL: slug lookup first, then the squished
    /// (alphanumeric-only) variant to tolerate header formatting drift.
    pub fn col_for_problem(&self, problem_url: &str) -> Option<u32> {
        let url_slug = slug::generate_slug(problem_url);
        if let Some(col) = self.problems.get(&url_slug) {
            return Some(*col);
        }
        self.problems.get(&slug::squash(&url_slug)).copied()
    }

    /// Whether the given cell is already marked solved in this snapshot.
    pub fn is_solved(&self, cell: CellRef) -> bool {
        self.solved
            .get(&cell.row.to_string())
            .map(|cols| cols.contains(&cell.col))
            .unwrap_or(false)
    }
}

/// A resolved spreadsheet coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

/// Resolve a student/problem pair against a map snapshot.
///
/// All-or-nothing: a record is bound only when both row and column resolve.
/// A partial match is treated as fully unresolved so we never write to a
/// wrong cell pair.
pub fn resolve_coordinates(map: &SheetMap, student_name: &str, problem_url: &str) -> Option<CellRef> {
    let row = map.row_for_student(student_name)?;
    let col = map.col_for_problem(problem_url)?;
    Some(CellRef { row, col })
}
