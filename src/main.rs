#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use linguist_core::model::config::CoreConfig;
use linguist_core::protocol::Session;
use linguist_core::services::config;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "LINGUIST_LOG";

// stdout carries the protocol, so logs go to stderr
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let (config, config_error) = match config::load() {
        Ok(c) => (c, None),
        Err(e) => (CoreConfig::default(), Some(e)),
    };

    init_tracing(&config.log_level);
    if let Some(e) = config_error {
        warn!(error = %e, "using default config");
    }

    let mut session = Session::new(config);
    if let Err(e) = session.preload() {
        warn!(error = %e, "default locale not loaded");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| session.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
