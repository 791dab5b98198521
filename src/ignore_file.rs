// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Ignore marker handling.
//!
//! The injected build phase produces a timestamp file next to the descriptor
//! at build time. That file is noise to version control, so an install run
//! makes sure the ignore file excludes it. The marker is appended at most
//! once: a run that finds the marker already present, either as an exact line
//! or covered by an existing pattern, leaves the file byte-for-byte alone.
//!
//! # Pattern Matching
//!
//! Presence is decided with real gitignore semantics rather than a substring
//! scan. A sheet containing `project_sort_*` already excludes the timestamp
//! file, so appending a literal line would be redundant. Lines that are not
//! valid gitignore patterns are skipped during matching.

use ignore::gitignore::GitignoreBuilder;
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// One version-control ignore file, edited in memory.
///
/// # Invariant
///
/// - Content is preserved verbatim; edits only ever append.
/// - [`IgnoreSheet::save`] touches the disk only when an edit changed
///   something.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoreSheet {
    path: PathBuf,
    content: String,
    changed: bool,
}

impl IgnoreSheet {
    /// Load an existing ignore file.
    ///
    /// # Errors
    ///
    /// - Return [`Error::ReadIgnoreFile`] if the file cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = read_to_string(&path).map_err(|err| Error::ReadIgnoreFile {
            source: err,
            path: path.clone(),
        })?;

        Ok(Self {
            path,
            content,
            changed: false,
        })
    }

    /// Start an empty sheet for an ignore file that does not exist yet.
    ///
    /// Nothing is written until [`IgnoreSheet::save`] runs after an edit.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
            changed: false,
        }
    }

    /// Check whether the sheet already excludes a file name.
    ///
    /// Matches with gitignore semantics against every line of the sheet, so
    /// both an exact marker line and a broader pattern count as present.
    pub fn contains_marker(&self, file_name: &str) -> bool {
        let root = self.path.parent().unwrap_or(Path::new("."));
        let mut builder = GitignoreBuilder::new(root);
        for line in self.content.lines() {
            // INVARIANT: A malformed line never poisons the whole sheet.
            let _ = builder.add_line(None, line);
        }

        let Ok(matcher) = builder.build() else {
            return false;
        };

        matcher.matched(Path::new(file_name), false).is_ignore()
    }

    /// Append the marker line unless the sheet already excludes it.
    ///
    /// Returns whether the sheet changed.
    pub fn ensure_marker(&mut self, file_name: &str) -> bool {
        if self.contains_marker(file_name) {
            return false;
        }

        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
        self.content.push_str(file_name);
        self.content.push('\n');
        self.changed = true;

        true
    }

    /// Write the sheet back to disk if an edit changed it.
    ///
    /// # Errors
    ///
    /// - Return [`Error::WriteIgnoreFile`] if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        write(&self.path, self.content.as_bytes()).map_err(|err| Error::WriteIgnoreFile {
            source: err,
            path: self.path.clone(),
        })?;

        Ok(())
    }
}

/// Ignore marker error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Ignore file cannot be read from.
    #[error("failed to read ignore file at {:?}", path.display())]
    ReadIgnoreFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Ignore file cannot be written to.
    #[error("failed to write ignore file at {:?}", path.display())]
    WriteIgnoreFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
