//! Example suite runner.
//!
//! Runs a simulated test suite on worker threads that share one account
//! registry, then shuts the registry down and reports leaked accounts.
//!
//! # Usage
//!
//! ```bash
//! checkout [tests] [workers]
//! ```
//!
//! The inventory is read from the file named by `QUARTERMASTER_INVENTORY`
//! (a `.env` file is honored), falling back to the bundled one. Logging is
//! configured with `QUARTERMASTER_LOG` and `QUARTERMASTER_LOG_FORMAT`.
//!
//! # Example
//!
//! ```bash
//! QUARTERMASTER_LOG=debug checkout 40 10
//! ```

use core::time::Duration;
use std::process::ExitCode;
use std::sync::Arc;

use example::{Account, BUNDLED_INVENTORY, plan, run_suite};
use parking_lot::Mutex;
use quartermaster_config::{ConfigError, RegistryConfig};
use quartermaster_core::TracingConfig;
use quartermaster_registry::hooks::{EventKind, PoolEvent};

const INVENTORY_ENV: &str = "QUARTERMASTER_INVENTORY";

fn load_inventory() -> Result<RegistryConfig<Account>, ConfigError> {
    match std::env::var(INVENTORY_ENV) {
        Ok(path) => RegistryConfig::from_path(path),
        Err(_) => {
            tracing::info!("{INVENTORY_ENV} not set, using bundled inventory");
            RegistryConfig::from_json_str(BUNDLED_INVENTORY)
        }
    }
}

fn parse_arg(args: &[String], index: usize, default: usize) -> usize {
    args.get(index)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    TracingConfig::from_env().init();

    let args: Vec<String> = std::env::args().collect();
    let tests = parse_arg(&args, 1, 24);
    let workers = parse_arg(&args, 2, 8);

    let registry = match load_inventory().and_then(RegistryConfig::build_registry) {
        Ok(registry) => registry,
        Err(error) => {
            tracing::error!(%error, "failed to set up account registry");
            return ExitCode::FAILURE;
        }
    };

    let longest_wait = Arc::new(Mutex::new(Duration::ZERO));
    {
        let longest_wait = Arc::clone(&longest_wait);
        let registered = registry.hooks().register_observer_on(
            &[EventKind::TestStarted],
            "longest_wait",
            move |event: &PoolEvent<Account>| {
                if let PoolEvent::TestStarted { waited, .. } = event {
                    let mut longest = longest_wait.lock();
                    *longest = (*longest).max(*waited);
                }
            },
        );
        if let Err(error) = registered {
            tracing::warn!(%error, "wait tracking disabled");
        }
    }

    tracing::info!(tests, workers, "running suite");
    let outcome = run_suite(&registry, plan(tests), workers);
    let report = registry.shutdown();

    tracing::info!(
        passed = outcome.passed.len(),
        failed = outcome.failed.len(),
        longest_wait = ?*longest_wait.lock(),
        "suite finished"
    );
    for (category, stats) in report.snapshot.iter() {
        tracing::info!(
            ?category,
            capacity = stats.capacity,
            available = stats.available,
            "inventory"
        );
    }

    if outcome.failed.is_empty() && report.is_clean() {
        ExitCode::SUCCESS
    } else {
        tracing::error!(leaked = ?report.leaked, "suite did not finish cleanly");
        ExitCode::FAILURE
    }
}
