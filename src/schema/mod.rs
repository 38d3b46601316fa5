//! Canonical warehouse schema.
//!
//! `Orders` carries a `total_price` column; revenue is never derived from
//! quantity and unit price. Primary keys double as the uniqueness
//! constraints the loader's rollback behavior is tested against, and the
//! foreign keys encode the required load order (Suppliers first).

use duckdb::Connection;
use tracing::debug;

pub const TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS Suppliers (
    supplier_id  INTEGER PRIMARY KEY,
    farm_name    VARCHAR NOT NULL,
    region       VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS Orders (
    order_id     INTEGER PRIMARY KEY,
    supplier_id  INTEGER NOT NULL REFERENCES Suppliers (supplier_id),
    order_date   DATE NOT NULL,
    total_price  DECIMAL(12, 2) NOT NULL
);

CREATE TABLE IF NOT EXISTS Sales_Targets (
    region        VARCHAR NOT NULL,
    quarter       VARCHAR NOT NULL,
    target_amount DECIMAL(14, 2) NOT NULL,
    PRIMARY KEY (region, quarter)
);

CREATE TABLE IF NOT EXISTS Certifications (
    supplier_id        INTEGER NOT NULL REFERENCES Suppliers (supplier_id),
    certification_name VARCHAR NOT NULL,
    issued_by          VARCHAR,
    issue_date         DATE,
    PRIMARY KEY (supplier_id, certification_name)
);

CREATE TABLE IF NOT EXISTS Harvest_Log (
    supplier_id  INTEGER NOT NULL REFERENCES Suppliers (supplier_id),
    harvest_date DATE NOT NULL,
    crop_type    VARCHAR NOT NULL,
    quantity_kg  INTEGER NOT NULL
);
"#;

/// Create any missing tables. Safe to run on every startup.
pub fn ensure_tables(conn: &Connection) -> duckdb::Result<()> {
    conn.execute_batch(TABLES)?;
    debug!("schema ensured");
    Ok(())
}
