// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto` - Autonomous Close-Loop Delivery Engine CLI (§6).
//!
//! Parsers here decode arguments and call into `ac-engine`/`ac-control`/
//! `ac-storage`/`ac-specs`; no core logic lives in this crate.

mod color;
mod commands;
mod config;
mod error;
mod output;
mod ports;

use clap::{Parser, Subcommand};

use ac_core::SessionKind;
use commands::{
    close_loop, close_loop_batch, close_loop_controller, close_loop_program, close_loop_recover,
    governance, handoff, kpi, observability, recovery_memory, schema, session,
};
use error::CliError;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "auto",
    version,
    about = "Decomposes goals into specs and drives them to completion under governed resource limits."
)]
struct Cli {
    /// Output format.
    #[arg(long = "json", global = true)]
    json: bool,

    /// Report what a mutating command would do, without doing it.
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose one goal and drive it through the close-loop state machine.
    CloseLoop(close_loop::CloseLoopArgs),
    /// Run a batch of goals under a shared agent budget.
    CloseLoopBatch(close_loop_batch::CloseLoopBatchArgs),
    /// Decompose a broad program goal into a batch and gate the result.
    CloseLoopProgram(close_loop_program::CloseLoopProgramArgs),
    /// Drain a goal queue under a lease, one close-loop-program run per goal.
    CloseLoopController(close_loop_controller::CloseLoopControllerArgs),
    /// Select and try a remediation action for a failed run, via recovery memory.
    CloseLoopRecover(close_loop_recover::CloseLoopRecoverArgs),
    /// Close-loop session retention and telemetry.
    Session {
        #[command(subcommand)]
        command: session::SessionCommand,
    },
    /// Spec-artifact session retention and telemetry.
    SpecSession {
        #[command(subcommand)]
        command: session::SessionCommand,
    },
    /// Batch session retention and telemetry.
    BatchSession {
        #[command(subcommand)]
        command: session::SessionCommand,
    },
    /// Controller session retention and telemetry.
    ControllerSession {
        #[command(subcommand)]
        command: session::SessionCommand,
    },
    /// Cross-archive health assessment and the bounded maintain loop.
    Governance {
        #[command(subcommand)]
        command: governance::GovernanceCommand,
    },
    /// Direct recovery-memory inspection and retention.
    RecoveryMemory {
        #[command(subcommand)]
        command: recovery_memory::RecoveryMemoryCommand,
    },
    /// Success-rate trend reporting.
    Kpi {
        #[command(subcommand)]
        command: kpi::KpiCommand,
    },
    /// Point-in-time cross-archive dashboard snapshot.
    Observability {
        #[command(subcommand)]
        command: observability::ObservabilityCommand,
    },
    /// Session-snapshot schema drift check and migration.
    Schema {
        #[command(subcommand)]
        command: schema::SchemaCommand,
    },
    /// Release Gate Evaluator surface.
    Handoff {
        #[command(subcommand)]
        command: handoff::HandoffCommand,
    },
}

/// Mutating commands honor `--dry-run` by reporting intent and returning
/// before any write happens, rather than threading a flag through every
/// storage call (§6: "all commands accept `--dry-run` where state changes
/// are possible").
fn dry_run_notice(what: &str) {
    println!("dry-run: would {what}");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Text };

    let result = dispatch(cli.command, format, cli.dry_run).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn dispatch(command: Commands, format: OutputFormat, dry_run: bool) -> Result<(), CliError> {
    match command {
        Commands::CloseLoop(args) => close_loop::run(args, format).await,
        Commands::CloseLoopBatch(args) => close_loop_batch::run(args, format).await,
        Commands::CloseLoopProgram(args) => close_loop_program::run(args, format).await,
        Commands::CloseLoopController(args) => close_loop_controller::run(args, format).await,
        Commands::CloseLoopRecover(args) => {
            if dry_run {
                dry_run_notice("select and run a remediation action");
                return Ok(());
            }
            close_loop_recover::run(args, format).await
        }
        Commands::Session { command } => dispatch_session(SessionKind::CloseLoop, command, format, dry_run).await,
        Commands::SpecSession { command } => {
            dispatch_session(SessionKind::SpecArtifact, command, format, dry_run).await
        }
        Commands::BatchSession { command } => dispatch_session(SessionKind::Batch, command, format, dry_run).await,
        Commands::ControllerSession { command } => {
            dispatch_session(SessionKind::Controller, command, format, dry_run).await
        }
        Commands::Governance { command } => {
            if dry_run && matches!(command, governance::GovernanceCommand::Maintain(_) | governance::GovernanceCommand::CloseLoop(_)) {
                dry_run_notice("apply the governance plan");
                return Ok(());
            }
            governance::run(command, format)
        }
        Commands::RecoveryMemory { command } => {
            if dry_run
                && matches!(
                    command,
                    recovery_memory::RecoveryMemoryCommand::Prune(_) | recovery_memory::RecoveryMemoryCommand::Clear(_)
                )
            {
                dry_run_notice("remove recovery-memory entries");
                return Ok(());
            }
            recovery_memory::run(command, format)
        }
        Commands::Kpi { command } => kpi::run(command, format),
        Commands::Observability { command } => observability::run(command, format),
        Commands::Schema { command } => {
            if dry_run && matches!(command, schema::SchemaCommand::Migrate(_)) {
                dry_run_notice("migrate lagging session snapshots");
                return Ok(());
            }
            schema::run(command, format)
        }
        Commands::Handoff { command } => {
            if dry_run && matches!(command, handoff::HandoffCommand::Run(_)) {
                dry_run_notice("evaluate the release gate and record evidence");
                return Ok(());
            }
            handoff::run(command, format)
        }
    }
}

async fn dispatch_session(
    kind: SessionKind,
    command: session::SessionCommand,
    format: OutputFormat,
    dry_run: bool,
) -> Result<(), CliError> {
    if dry_run && matches!(command, session::SessionCommand::Prune(_)) {
        dry_run_notice(&format!("prune {kind} sessions"));
        return Ok(());
    }
    session::run(kind, command, format).await
}
