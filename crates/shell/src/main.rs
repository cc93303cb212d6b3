mod shell;

use std::{
    fs::{self, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use gamelib_core::{
    config::{self, AppConfig},
    FileAuditLog, GameLibrary,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::shell::Shell;

fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.data_dir)?;
    info!(data_dir = %config.data_dir.display(), "starting game library");

    let audit = FileAuditLog::new(config.audit_log_path());
    let mut library = GameLibrary::open(config.store_paths(), audit);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(&mut library, stdin.lock(), stdout.lock());
    shell.run()
}

fn init_logging(data_dir: &Path) -> Result<()> {
    let log_dir = data_dir.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("gamelib.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::from_default_env();

    // stdout belongs to the menu.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
