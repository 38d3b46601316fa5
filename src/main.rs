use anyhow::{Context, Result};
use harvestload::{
    config::DbConfig,
    db,
    load::{self, LoadRequest},
    schema, seed,
};
use std::{env, path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    match run() {
        Ok(0) => {
            info!("all tables populated");
            ExitCode::SUCCESS
        }
        Ok(failed) => {
            error!("{failed} load step(s) failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run every load step, returning how many of them failed. Only
/// configuration and bootstrap problems abort the run as a whole.
fn run() -> Result<u64> {
    // ─── 2) configuration, read once ─────────────────────────────────
    let cfg = DbConfig::from_env()?;
    let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
    info!(database = %cfg.db_path().display(), data = %data_dir.display(), "startup");

    // ─── 3) make sure the warehouse tables exist ─────────────────────
    {
        let conn = db::connect(&cfg)?;
        schema::ensure_tables(&conn).context("creating warehouse tables")?;
    }

    // ─── 4) load CSVs, parents before children ───────────────────────
    let requests = [
        LoadRequest::new(
            data_dir.join("suppliers.csv"),
            "Suppliers",
            "INSERT INTO Suppliers (supplier_id, farm_name, region) VALUES (?, ?, ?)",
            &["supplier_id", "farm_name", "region"],
        ),
        LoadRequest::new(
            data_dir.join("orders.csv"),
            "Orders",
            "INSERT INTO Orders (order_id, supplier_id, order_date, total_price) \
             VALUES (?, ?, ?, ?)",
            &["order_id", "supplier_id", "order_date", "total_price"],
        ),
        LoadRequest::new(
            data_dir.join("targets.csv"),
            "Sales_Targets",
            "INSERT INTO Sales_Targets (region, quarter, target_amount) VALUES (?, ?, ?)",
            &["region", "quarter", "target_amount"],
        ),
    ];

    let mut failed = 0u64;
    for request in &requests {
        match load::load(&cfg, request) {
            Ok(rows) => info!(table = %request.table, rows, "loaded"),
            Err(e) => {
                failed += 1;
                error!(table = %request.table, "{e}");
            }
        }
    }

    // ─── 5) static reference rows ────────────────────────────────────
    if let Err(e) = seed::seed_reference_data(&cfg) {
        failed += 1;
        error!("{e}");
    }

    Ok(failed)
}
