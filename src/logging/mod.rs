// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostics for the logbook itself.
//!
//! Exchange records go through a [`crate::sink::HttpLogWriter`]; this module
//! only sets up where the crate's own `log` output ends up.  Either
//! `env_logger` on stderr, or a `slog` root logger with the `log` facade
//! bridged into it.

pub mod config;
pub mod structured;
#[macro_use]
pub mod wrapper;


pub use config::LoggingConfig;
pub use structured::{LogFormat, LoggerConfig, LoggerGuard, create_logger, init_global_logger};

use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static INIT: Once = Once::new();
static USING_STRUCTURED: AtomicBool = AtomicBool::new(false);
static GLOBAL_GUARD: OnceCell<LoggerGuard> = OnceCell::new();

/// Initialize `env_logger` at `level` (or `RUST_LOG`, default `info`).
///
/// Only the first call in a process has any effect.
pub fn init(level: Option<LevelFilter>) {
    INIT.call_once(|| init_env_logger(level.unwrap_or(LevelFilter::Info)));
}

/// Initialize logging from a [`LoggingConfig`].
///
/// With `structured` set, installs a global `slog` logger and routes the
/// `log` facade into it; otherwise behaves like [`init`].
pub fn init_with_config(level: LevelFilter, config: &LoggingConfig) {
    INIT.call_once(|| {
        if !config.structured {
            init_env_logger(level);
            return;
        }

        let logger_config = config.to_logger_config();
        let guard = GLOBAL_GUARD.get_or_init(|| init_global_logger(&logger_config));
        match level.to_level() {
            Some(log_level) => {
                if let Err(e) = slog_stdlog::init_with_level(log_level) {
                    slog::warn!(guard.logger(), "log facade already bound"; "error" => %e);
                    return;
                }
            }
            None => log::set_max_level(LevelFilter::Off),
        }
        USING_STRUCTURED.store(true, Ordering::SeqCst);
        info_fmt!("Logging", "Structured logging initialized at level {}", level);
    });
}

/// Whether [`init_with_config`] installed the structured logger.
pub fn is_structured() -> bool {
    USING_STRUCTURED.load(Ordering::SeqCst)
}

fn init_env_logger(level: LevelFilter) {
    let env = env_logger::Env::default().filter_or("RUST_LOG", level.as_str().to_lowercase());
    let initialized = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(true)
        .try_init();
    if initialized.is_ok() {
        info_fmt!("Logging", "Logging initialized at level {}", log::max_level());
    }
}
