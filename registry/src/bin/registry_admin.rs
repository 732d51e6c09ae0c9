//! `registry-admin`: deploy rosters and manage registry snapshots.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use registry::config::RegistrySettings;
use registry::inbound::cli::{Cli, run};

fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = RegistrySettings::load_from_iter([OsString::from("registry-admin")])
        .wrap_err("failed to load registry settings")?;
    init_tracing(settings.json_logs);

    let cli = Cli::parse();
    let lines = run(&cli, &settings)?;

    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}").wrap_err("failed to write output")?;
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
