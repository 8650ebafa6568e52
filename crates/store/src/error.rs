// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure kinds surfaced to store callers

use std::fmt::Debug;
use thiserror::Error;

/// Errors raised by container reads and writes, or by the store lifecycle.
///
/// Key payloads are carried as their `Debug` rendering so the error type
/// stays uniform across entry families.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("key already exists: {0}")]
    KeyAlreadyExists(String),
    #[error("cell not found: ({row}, {col})")]
    CellNotFound { row: String, col: String },
    #[error("cell already exists: ({row}, {col})")]
    CellAlreadyExists { row: String, col: String },
    #[error("no such row or column: {0}")]
    Subscript(String),
    #[error("absent entry accessed")]
    AbsentEntry,
    #[error("store terminated")]
    Terminated,
}

impl StoreError {
    pub(crate) fn key_not_found(key: &impl Debug) -> Self {
        Self::KeyNotFound(format!("{key:?}"))
    }

    pub(crate) fn key_already_exists(key: &impl Debug) -> Self {
        Self::KeyAlreadyExists(format!("{key:?}"))
    }

    pub(crate) fn cell_not_found(row: &impl Debug, col: &impl Debug) -> Self {
        Self::CellNotFound {
            row: format!("{row:?}"),
            col: format!("{col:?}"),
        }
    }

    pub(crate) fn cell_already_exists(row: &impl Debug, col: &impl Debug) -> Self {
        Self::CellAlreadyExists {
            row: format!("{row:?}"),
            col: format!("{col:?}"),
        }
    }

    pub(crate) fn subscript(key: &impl Debug) -> Self {
        Self::Subscript(format!("{key:?}"))
    }
}
