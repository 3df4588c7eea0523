use crate::domain::{ComputeArtifact, ComputeResult, TunnelError};
use serde::Serialize;
use std::fmt::Debug;
use std::fs;
use std::path::Path;

/// A record type that can be collected into a [`ResultTable`] and written as CSV.
pub trait TableRow: Serialize {
    /// Header line, in serialization order.
    const COLUMNS: &'static [&'static str];

    type Key: PartialEq + Debug;

    /// Parameter combination that must be unique within a table.
    fn key(&self) -> Self::Key;

    fn check_invariants(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<R> {
    rows: Vec<R>,
}

impl<R> Default for ResultTable<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: TableRow> ResultTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: R) -> ComputeResult<()> {
        row.check_invariants().map_err(|reason| {
            TunnelError::computation(
                "RUN.TABLE_ROW_INVARIANT",
                format!("row {:?} violates a table invariant: {}", row.key(), reason),
            )
        })?;

        let key = row.key();
        if self.rows.iter().any(|existing| existing.key() == key) {
            return Err(TunnelError::computation(
                "RUN.TABLE_DUPLICATE_KEY",
                format!("duplicate table key {:?}", key),
            ));
        }

        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Writes `table` as CSV at `path`, creating parent directories. The header is
/// always written, so an empty table still yields a well-formed file.
pub fn write_csv_table<R: TableRow>(
    path: &Path,
    table: &ResultTable<R>,
) -> ComputeResult<ComputeArtifact> {
    ensure_parent_dir(path)?;

    // record encoding failures are bugs in the row type, not the filesystem
    let write_error = |source: csv::Error| {
        let message = format!("failed to write table '{}': {}", path.display(), source);
        if source.is_io_error() {
            TunnelError::io_system("IO.TABLE_WRITE", message)
        } else {
            TunnelError::internal("INTERNAL.TABLE_ENCODE", message)
        }
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_error)?;
    writer.write_record(R::COLUMNS).map_err(write_error)?;
    for row in table.rows() {
        writer.serialize(row).map_err(write_error)?;
    }
    writer.flush().map_err(|source| {
        TunnelError::io_system(
            "IO.TABLE_WRITE",
            format!("failed to flush table '{}': {}", path.display(), source),
        )
    })?;

    Ok(ComputeArtifact::new(path, table.len()))
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> ComputeResult<()> {
    ensure_parent_dir(path)?;
    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        TunnelError::io_system(
            "IO.TEXT_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}

fn ensure_parent_dir(path: &Path) -> ComputeResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| {
                TunnelError::io_system(
                    "IO.OUTPUT_DIRECTORY",
                    format!(
                        "failed to create output directory '{}': {}",
                        parent.display(),
                        source
                    ),
                )
            })
        }
        _ => Ok(()),
    }
}
