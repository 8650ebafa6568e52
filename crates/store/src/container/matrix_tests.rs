// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[derive(Debug, Clone, PartialEq)]
struct Reading {
    row: u64,
    col: String,
    value: i32,
}

impl CellEntry for Reading {
    type Row = u64;
    type Col = String;

    fn row(&self) -> u64 {
        self.row
    }

    fn col(&self) -> String {
        self.col.clone()
    }
}

fn reading(row: u64, col: &str, value: i32) -> Reading {
    Reading {
        row,
        col: col.to_string(),
        value,
    }
}

fn sample() -> Matrix<Reading> {
    let mut matrix = Matrix::default();
    matrix.overwrite(reading(1, "x", 10), 0);
    matrix.overwrite(reading(1, "y", 11), 1);
    matrix.overwrite(reading(2, "x", 20), 2);
    matrix
}

#[test]
fn get_and_try_get() {
    let matrix = sample();
    assert_eq!(matrix.get(&1, &"y".to_string()).unwrap().value, 11);
    assert!(matrix.try_get(&2, &"x".to_string()).exists());
    assert!(matches!(
        matrix.get(&2, &"y".to_string()).unwrap_err(),
        StoreError::CellNotFound { .. }
    ));
    assert!(!matrix.try_get(&9, &"x".to_string()).exists());
}

#[parameterized(
    present = { 1, "x", true },
    absent_row = { 9, "x", false },
    absent_col = { 1, "z", false },
)]
fn exists_lookup(row: u64, col: &str, expected: bool) {
    let matrix = sample();
    assert_eq!(matrix.exists(&row, &col.to_string()), expected);
}

#[test]
fn replacing_a_cell_updates_every_view() {
    let mut matrix = sample();
    matrix.overwrite(reading(1, "x", 99), 3);

    assert_eq!(matrix.get(&1, &"x".to_string()).unwrap().value, 99);
    let by_row = matrix.row(&1).unwrap();
    assert_eq!(by_row.get(&"x".to_string()).unwrap().value, 99);
    let by_col = matrix.col(&"x".to_string()).unwrap();
    assert_eq!(by_col.get(&1).unwrap().value, 99);
    // Replacement, not growth.
    assert_eq!(matrix.len(), 3);
}

#[test]
fn axis_views_fail_subscript_on_absent_keys() {
    let matrix = sample();
    assert!(matches!(
        matrix.row(&9).unwrap_err(),
        StoreError::Subscript(_)
    ));
    assert!(matches!(
        matrix.col(&"z".to_string()).unwrap_err(),
        StoreError::Subscript(_)
    ));
    let row = matrix.row(&1).unwrap();
    assert!(matches!(
        row.get(&"z".to_string()).unwrap_err(),
        StoreError::Subscript(_)
    ));
}

#[test]
fn forward_and_transposed_agree() {
    let matrix = sample();

    let mut via_rows: Vec<Reading> = matrix
        .rows()
        .flat_map(|(_, cells)| cells.iter().map(|(_, entry)| entry.clone()))
        .collect();
    let mut via_cols: Vec<Reading> = matrix
        .cols()
        .flat_map(|(_, cells)| cells.iter().map(|(_, entry)| entry.clone()))
        .collect();
    via_rows.sort_by_key(|entry| (entry.row, entry.col.clone()));
    via_cols.sort_by_key(|entry| (entry.row, entry.col.clone()));
    assert_eq!(via_rows, via_cols);

    let row_view = matrix.row(&1).unwrap();
    assert_eq!(row_view.len(), 2);
    assert!(!row_view.is_empty());
}

#[test]
fn apply_requires_strictly_greater_index() {
    let mut matrix = Matrix::default();
    matrix.apply(reading(1, "x", 1), 4);
    matrix.apply(reading(1, "x", 2), 4);
    assert_eq!(matrix.get(&1, &"x".to_string()).unwrap().value, 1);
    matrix.apply(reading(1, "x", 3), 2);
    assert_eq!(matrix.get(&1, &"x".to_string()).unwrap().value, 1);
    matrix.apply(reading(1, "x", 4), 6);
    assert_eq!(matrix.get(&1, &"x".to_string()).unwrap().value, 4);
}

#[test]
fn replay_after_eager_update_is_a_no_op() {
    let mut matrix = Matrix::default();
    matrix.overwrite(reading(1, "x", 7), 9);
    matrix.apply(reading(1, "x", 0), 9);
    assert_eq!(matrix.get(&1, &"x".to_string()).unwrap().value, 7);
}
