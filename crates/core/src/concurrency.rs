//! Concurrency planning module for mediabatch
//!
//! Derives how many conversions may be in flight from core count and configuration.

use crate::config::Config;

/// Logical cores budgeted per in-flight conversion when deriving automatically
const CORES_PER_CONVERSION: u32 = 4;

/// Concurrency plan derived from configuration and system resources
#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrencyPlan {
    /// Total logical CPU cores available
    pub total_cores: u32,
    /// Maximum number of conversions in flight at once
    pub max_concurrent_jobs: u32,
}

impl ConcurrencyPlan {
    /// Derive a concurrency plan from configuration
    ///
    /// Uses the following rules:
    /// - Detects CPU cores via num_cpus if not specified in config
    /// - Uses an explicit non-zero `max_concurrent_jobs` unchanged
    /// - Otherwise allows one conversion per four cores, at least one
    pub fn derive(cfg: &Config) -> Self {
        let total_cores = cfg
            .concurrency
            .logical_cores
            .unwrap_or_else(|| num_cpus::get() as u32);

        let max_concurrent_jobs = if cfg.concurrency.max_concurrent_jobs > 0 {
            cfg.concurrency.max_concurrent_jobs
        } else {
            derive_max_jobs(total_cores)
        };

        Self {
            total_cores,
            max_concurrent_jobs,
        }
    }

    /// One conversion at a time, in registration order
    pub fn serial() -> Self {
        Self {
            total_cores: 1,
            max_concurrent_jobs: 1,
        }
    }

    pub fn is_serial(&self) -> bool {
        self.max_concurrent_jobs <= 1
    }
}

impl Default for ConcurrencyPlan {
    fn default() -> Self {
        Self::serial()
    }
}

fn derive_max_jobs(cores: u32) -> u32 {
    (cores / CORES_PER_CONVERSION).max(1)
}

/// Public function to derive a concurrency plan from configuration
pub fn derive_plan(cfg: &Config) -> ConcurrencyPlan {
    ConcurrencyPlan::derive(cfg)
}
