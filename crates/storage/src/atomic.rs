// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON document I/O shared by every document this crate persists:
//! session snapshots, recovery memory, release evidence, and lock payloads.
//!
//! Every write goes through write-to-`.tmp`-then-`rename` with an `fsync`
//! on the temp file before the rename, so a crash mid-write never leaves a
//! half-written document in place. Every read of a document that fails to
//! parse is quarantined to a rotating `.bak` file rather than treated as a
//! fatal error, so one corrupt document doesn't take down a whole listing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::StorageError;

/// Serialize `value` to `path` atomically: write to `path.tmp`, `fsync`,
/// then rename over the destination.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load and parse `path` if it exists.
///
/// Returns `Ok(None)` if the file is missing. Corrupt JSON is rotated to a
/// `.bak` file and reported via `Ok(None)` rather than propagated, so a
/// listing of sibling documents can continue.
pub fn read_json_quarantine_on_corrupt<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match serde_json::from_reader(reader) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let bak_path = rotate_bak_path(path);
            warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "corrupt document, quarantining to .bak",
            );
            fs::rename(path, &bak_path)?;
            Ok(None)
        }
    }
}

/// Load and parse `path`, propagating a parse error instead of quarantining.
///
/// Used where the caller needs to distinguish "missing" from "corrupt"
/// (e.g. the session archive, where a corrupt finalized snapshot must be
/// reported to the operator rather than silently discarded).
pub fn read_json_strict<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)?;
    Ok(Some(value))
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
