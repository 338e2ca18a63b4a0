// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration, loaded from `<project-root>/.auto/config.toml`
//! (§9: "dynamic-typing config" is replaced by an enumerated option table;
//! unknown keys are refused rather than silently ignored).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ac_control::batch::{BatchConfig, RetryMode, ScheduleStrategy};
use ac_control::release_gate::RiskLevel;
use ac_engine::governor::RateLimitProfile;
use ac_engine::orchestrator::OrchestratorConfig;
use ac_engine::runner::ReplanStrategy;

use crate::error::CliError;

/// Which [`ReplanStrategy`] variant `.auto/config.toml`'s
/// `replan_attempts`/`replan_no_progress_window` fields build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplanStrategyMode {
    Fixed,
    Adaptive,
}

impl Default for ReplanStrategyMode {
    fn default() -> Self {
        ReplanStrategyMode::Adaptive
    }
}

fn default_adapter_command() -> String {
    "claude".to_string()
}

fn default_tests_command() -> String {
    "cargo test".to_string()
}

fn default_state_dir() -> String {
    ".auto".to_string()
}

fn default_timeout_secs() -> u64 {
    900
}

fn default_max_parallel() -> usize {
    4
}

fn default_agent_budget() -> usize {
    8
}

fn default_max_retries() -> u32 {
    3
}

fn default_sub_count_min() -> u8 {
    2
}

fn default_sub_count_max() -> u8 {
    5
}

fn default_min_success_rate() -> f64 {
    0.8
}

fn default_max_success_rate_drop() -> f64 {
    0.2
}

fn default_success_rate_baseline_window() -> usize {
    5
}

fn default_replan_attempts() -> u32 {
    3
}

fn default_replan_no_progress_window() -> u32 {
    2
}

/// `.auto/config.toml` schema. `#[serde(deny_unknown_fields)]` makes an
/// unrecognized key a load error instead of a silently-dropped typo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    /// Subprocess command used to invoke one sub-agent attempt.
    pub adapter_command: String,
    pub adapter_args: Vec<String>,
    /// Environment variable expected to carry the adapter's API key; only
    /// checked for presence, never read or logged.
    pub api_key_env_var: Option<String>,
    /// Shell command run as the tests gate (§4.6 GATE).
    pub tests_command: String,
    pub tests_timeout_secs: u64,
    /// Directory (relative to the project root) holding durable state.
    pub state_dir: String,
    pub adapter_timeout_secs: u64,
    pub max_parallel: usize,
    pub agent_budget: usize,
    pub max_retries: u32,
    pub rate_limit_profile: RateLimitProfile,
    pub schedule_strategy: ScheduleStrategy,
    pub retry_mode: RetryMode,
    pub batch_retry_max_rounds: u32,
    pub continue_on_error: bool,
    pub sustained_pressure_threshold: u32,
    pub sub_count_min: u8,
    pub sub_count_max: u8,
    pub min_decomposition_quality: f64,
    /// DoD gate (§4.6 GATE): minimum fraction of specs that must succeed
    /// in a cycle.
    pub min_success_rate: f64,
    /// DoD gate: observed risk level for the cycle (derived from its
    /// failure count) must not exceed this.
    pub max_risk_level: RiskLevel,
    /// DoD gate: success rate must not have dropped by more than this
    /// much versus the baseline over the last `success_rate_baseline_window`
    /// completed close-loop sessions.
    pub max_success_rate_drop: f64,
    pub success_rate_baseline_window: usize,
    pub replan_strategy_mode: ReplanStrategyMode,
    pub replan_attempts: u32,
    pub replan_no_progress_window: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            adapter_command: default_adapter_command(),
            adapter_args: Vec::new(),
            api_key_env_var: Some("ANTHROPIC_API_KEY".to_string()),
            tests_command: default_tests_command(),
            tests_timeout_secs: default_timeout_secs(),
            state_dir: default_state_dir(),
            adapter_timeout_secs: default_timeout_secs(),
            max_parallel: default_max_parallel(),
            agent_budget: default_agent_budget(),
            max_retries: default_max_retries(),
            rate_limit_profile: RateLimitProfile::Balanced,
            schedule_strategy: ScheduleStrategy::default(),
            retry_mode: RetryMode::None,
            batch_retry_max_rounds: 2,
            continue_on_error: true,
            sustained_pressure_threshold: 3,
            sub_count_min: default_sub_count_min(),
            sub_count_max: default_sub_count_max(),
            min_decomposition_quality: 0.6,
            min_success_rate: default_min_success_rate(),
            max_risk_level: RiskLevel::Medium,
            max_success_rate_drop: default_max_success_rate_drop(),
            success_rate_baseline_window: default_success_rate_baseline_window(),
            replan_strategy_mode: ReplanStrategyMode::default(),
            replan_attempts: default_replan_attempts(),
            replan_no_progress_window: default_replan_no_progress_window(),
        }
    }
}

impl AppConfig {
    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(".auto").join("config.toml")
    }

    /// Loads from `project-root/.auto/config.toml`, falling back to
    /// `Default` if the file doesn't exist. A malformed file is a
    /// configuration error (exit 1).
    pub fn load(project_root: &Path) -> Result<Self, CliError> {
        let path = Self::config_path(project_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
    }

    pub fn state_dir_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.state_dir)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_parallel: self.max_parallel,
            agent_budget: self.agent_budget,
            timeout: Duration::from_secs(self.adapter_timeout_secs),
            max_retries: self.max_retries,
            rate_limit_profile: self.rate_limit_profile,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            batch_parallel: self.max_parallel,
            batch_agent_budget: self.agent_budget,
            strategy: self.schedule_strategy,
            aging_factor: 1.0,
            retry_mode: self.retry_mode,
            batch_retry_max_rounds: self.batch_retry_max_rounds,
            continue_on_error: self.continue_on_error,
            sustained_pressure_threshold: self.sustained_pressure_threshold,
        }
    }

    pub fn replan_strategy(&self) -> ReplanStrategy {
        match self.replan_strategy_mode {
            ReplanStrategyMode::Fixed => ReplanStrategy::Fixed {
                replan_attempts: self.replan_attempts,
            },
            ReplanStrategyMode::Adaptive => ReplanStrategy::Adaptive {
                replan_attempts: self.replan_attempts,
                no_progress_window: self.replan_no_progress_window,
            },
        }
    }
}
