// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto schema {check|migrate}`: verify and upgrade on-disk session
//! snapshots against [`ac_core::session::CURRENT_SCHEMA_VERSION`].
//!
//! [`ac_storage::MigrationRegistry`] keys snapshots by a bare `"v"` field;
//! this domain's envelopes carry the same version under `schema_version`
//! instead, so `migrate` bridges the two field names around the registry
//! call rather than changing the registry's convention.

use std::path::PathBuf;

use ac_core::SessionKind;
use ac_storage::{MigrationRegistry, SessionArchive};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};

const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// Report any on-disk snapshot whose schema_version lags the current one.
    Check(SchemaArgs),
    /// Upgrade lagging snapshots in place to the current schema version.
    Migrate(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct SchemaDrift {
    kind: String,
    session_id: String,
    schema_version: u32,
}

#[derive(Debug, Serialize)]
struct SchemaReport {
    current_schema_version: u32,
    drift: Vec<SchemaDrift>,
    migrated: usize,
}

pub fn run(command: SchemaCommand, format: OutputFormat) -> Result<(), CliError> {
    match command {
        SchemaCommand::Check(args) => check(args, format),
        SchemaCommand::Migrate(args) => migrate(args, format),
    }
}

fn drift_across_archive(archive: &SessionArchive) -> Result<Vec<SchemaDrift>, CliError> {
    let mut drift = Vec::new();
    for kind in SessionKind::ALL {
        for envelope in archive.list(kind)? {
            if envelope.schema_version < CURRENT_SCHEMA_VERSION {
                drift.push(SchemaDrift {
                    kind: kind.dir_name().to_string(),
                    session_id: envelope.session_id.as_str().to_string(),
                    schema_version: envelope.schema_version,
                });
            }
        }
    }
    Ok(drift)
}

fn check(args: SchemaArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let drift = drift_across_archive(&archive)?;

    let report = SchemaReport {
        current_schema_version: CURRENT_SCHEMA_VERSION,
        migrated: 0,
        drift,
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            if report.drift.is_empty() {
                println!("all snapshots at schema v{CURRENT_SCHEMA_VERSION}");
            } else {
                for d in &report.drift {
                    println!("{}/{}: v{}", d.kind, d.session_id, d.schema_version);
                }
            }
        }
    }

    if !report.drift.is_empty() {
        return Err(CliError::PolicyViolation(format!(
            "{} snapshot(s) behind current schema",
            report.drift.len()
        )));
    }
    Ok(())
}

/// Bridge `schema_version` <-> `v` around one [`MigrationRegistry`] call.
fn migrate_value(registry: &MigrationRegistry, mut value: Value) -> Result<Value, CliError> {
    let schema_version = value
        .get("schema_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(1);
    if let Some(obj) = value.as_object_mut() {
        obj.insert("v".to_string(), schema_version.into());
    }
    let mut migrated = registry
        .migrate_to(value, CURRENT_SCHEMA_VERSION)
        .map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(obj) = migrated.as_object_mut() {
        let v = obj.remove("v").unwrap_or_else(|| CURRENT_SCHEMA_VERSION.into());
        obj.insert("schema_version".to_string(), v);
    }
    Ok(migrated)
}

fn migrate(args: SchemaArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let registry = MigrationRegistry::new();

    let mut migrated = 0;
    for kind in SessionKind::ALL {
        for envelope in archive.list(kind)? {
            if envelope.schema_version >= CURRENT_SCHEMA_VERSION {
                continue;
            }
            // Finalized snapshots are immutable through the normal
            // create/append_event/finalize API (§4.1); a schema upgrade is
            // a one-time maintenance rewrite that predates that invariant,
            // so it writes the file directly instead.
            let value = serde_json::to_value(&envelope)?;
            let upgraded = migrate_value(&registry, value)?;
            let path = archive
                .root()
                .join("sessions")
                .join(kind.dir_name())
                .join(format!("{}.json", envelope.session_id.as_str()));
            ac_storage::write_json(&path, &upgraded)?;
            migrated += 1;
        }
    }

    let report = SchemaReport {
        current_schema_version: CURRENT_SCHEMA_VERSION,
        drift: Vec::new(),
        migrated,
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => println!("migrated {migrated} snapshot(s) to v{CURRENT_SCHEMA_VERSION}"),
    }
    Ok(())
}
