use std::path::PathBuf;

use anyhow::{Context, Result};
use slugcli::{Invocation, Program, ProgramManifest};
use tracing_subscriber::{EnvFilter, fmt};

/// Declarations shipped with the binary. `DEVTOOL_MANIFEST` points at a
/// replacement file.
const EMBEDDED_MANIFEST: &str = include_str!("../devtool.json");

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let manifest = load_manifest()?;
    let mut program =
        Program::from_manifest(&manifest).context("invalid program declaration")?;
    program.action("tcp", tcp)?;
    program.action("ping", ping)?;

    program.parse();
    Ok(())
}

fn load_manifest() -> Result<ProgramManifest> {
    match std::env::var_os("DEVTOOL_MANIFEST") {
        Some(path) => ProgramManifest::from_file(&PathBuf::from(path)),
        None => ProgramManifest::from_json(EMBEDDED_MANIFEST),
    }
}

fn tcp(_: &Program, inv: &Invocation) -> Result<()> {
    warn_unknown(inv);
    let port: u16 = inv
        .matches
        .arg("port")
        .unwrap_or_default()
        .parse()
        .context("port must be a number between 0 and 65535")?;
    let host = inv.matches.arg("host").unwrap_or("*");

    if inv.matches.is_present("verbose") {
        println!(
            "using settings from {}",
            inv.matches.get("config").unwrap_or_default()
        );
    }
    if inv.matches.is_present("dry-run") {
        println!("would capture tcp on {host}:{port}");
        return Ok(());
    }
    match inv.matches.get("limit") {
        Some(limit) => println!("doing tcp on {host}:{port} (limit {limit})"),
        None => println!("doing tcp on {host}:{port}"),
    }
    Ok(())
}

fn ping(_: &Program, inv: &Invocation) -> Result<()> {
    warn_unknown(inv);
    let host = inv.matches.arg("host").unwrap_or_default();
    let count: u32 = match inv.matches.arg("count") {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid count `{raw}'"))?,
        None => 4,
    };
    println!("pinging {host} {count} times");
    Ok(())
}

fn warn_unknown(inv: &Invocation) {
    for option in &inv.unknown {
        tracing::warn!(command = %inv.command, option = %option, "ignoring unknown option");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
