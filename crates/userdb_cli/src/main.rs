//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `userdb_core` wiring: configuration, logging, store bootstrap.
//! - Print deterministic output for quick local sanity checks.

use log::info;
use std::error::Error;
use std::process::ExitCode;
use userdb_core::{
    core_version, init_logging, load_privilege_catalog, open_db, open_db_in_memory, CoreConfig,
    SqliteStore,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("userdb_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config = CoreConfig::from_env()?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let catalog = load_privilege_catalog(&SqliteStore::new(&conn))?;
    info!(
        "event=cli_startup module=cli status=ok privileges={}",
        catalog.privileges().len()
    );

    println!("userdb_core version={}", core_version());
    for privilege in catalog.privileges() {
        println!(
            "privilege id={} name={} owner={}",
            privilege.id,
            privilege.name,
            catalog.is_owner(privilege.id)
        );
    }
    Ok(())
}
