use anyhow::{Context, Result};
use harvestload::{
    config::DbConfig,
    db,
    report::{self, Quarter},
};
use std::{env, path::PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// Generate the quarterly reports. Takes the quarter label as the first
/// argument (default `2025-Q4`); writes the CSVs into `REPORT_DIR`.
fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let quarter: Quarter = env::args()
        .nth(1)
        .unwrap_or_else(|| "2025-Q4".to_string())
        .parse()?;
    let out_dir = PathBuf::from(env::var("REPORT_DIR").unwrap_or_else(|_| ".".to_string()));

    let cfg = DbConfig::from_env()?;
    let conn = db::connect(&cfg)?;
    report::generate(&conn, &quarter, &out_dir)
        .with_context(|| format!("generating {quarter} reports"))?;

    Ok(())
}
