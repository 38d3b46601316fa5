//! Static reference rows: certifications and harvest log entries.
//!
//! These are fixed literals rather than CSV inputs. Every insert is guarded
//! by a NOT EXISTS subquery, so seeding can run on every startup without
//! duplicating rows; the whole batch shares one transaction.

use crate::config::DbConfig;
use crate::db;
use crate::error::Error;
use tracing::info;

const INSERT_CERTIFICATION: &str = "\
    INSERT INTO Certifications (supplier_id, certification_name, issued_by, issue_date) \
    SELECT ?, ?, ?, ? \
    WHERE NOT EXISTS ( \
        SELECT 1 FROM Certifications \
        WHERE supplier_id = ? AND certification_name = ? \
    )";

const INSERT_HARVEST: &str = "\
    INSERT INTO Harvest_Log (supplier_id, harvest_date, crop_type, quantity_kg) \
    SELECT ?, ?, ?, ? \
    WHERE NOT EXISTS ( \
        SELECT 1 FROM Harvest_Log \
        WHERE supplier_id = ? AND harvest_date = ? AND crop_type = ? \
    )";

const CERTIFICATIONS: &[(i64, &str, &str, &str)] = &[
    (1, "Organic Certified", "SA Organic", "2024-01-01"),
    (2, "Fair Trade", "Fairtrade Africa", "2023-06-15"),
    (3, "GlobalG.A.P", "GLOBALG.A.P", "2024-03-10"),
];

const HARVESTS: &[(i64, &str, &str, i64)] = &[
    (1, "2025-10-05", "Apples", 1200),
    (2, "2025-10-12", "Grapes", 950),
    (3, "2025-11-01", "Olives", 700),
    (4, "2025-11-18", "Grapes", 1300),
    (5, "2025-12-03", "Olives", 1100),
];

/// Insert the reference rows that do not arrive as CSV files. Idempotent;
/// rolls back as one unit on any failure.
pub fn seed_reference_data(cfg: &DbConfig) -> Result<(), Error> {
    let mut conn = db::connect(cfg)?;
    let fail = |e| Error::load("Certifications/Harvest_Log", e);

    let tx = conn.transaction().map_err(fail)?;
    {
        let mut stmt = tx.prepare(INSERT_CERTIFICATION).map_err(fail)?;
        for (supplier_id, name, issued_by, issue_date) in CERTIFICATIONS {
            stmt.execute(duckdb::params![
                supplier_id,
                name,
                issued_by,
                issue_date,
                supplier_id,
                name
            ])
            .map_err(fail)?;
        }

        let mut stmt = tx.prepare(INSERT_HARVEST).map_err(fail)?;
        for (supplier_id, date, crop, quantity_kg) in HARVESTS {
            stmt.execute(duckdb::params![
                supplier_id,
                date,
                crop,
                quantity_kg,
                supplier_id,
                date,
                crop
            ])
            .map_err(fail)?;
        }
    }
    tx.commit().map_err(fail)?;

    info!("certifications and harvest log populated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use tempfile::tempdir;

    fn counts(cfg: &DbConfig) -> (i64, i64) {
        let conn = db::connect(cfg).unwrap();
        let certs = conn
            .query_row("SELECT COUNT(*) FROM Certifications", [], |r| r.get(0))
            .unwrap();
        let harvests = conn
            .query_row("SELECT COUNT(*) FROM Harvest_Log", [], |r| r.get(0))
            .unwrap();
        (certs, harvests)
    }

    #[test]
    fn seeding_twice_inserts_once() {
        let dir = tempdir().unwrap();
        let cfg = DbConfig::at(dir.path(), "warehouse").unwrap();
        {
            let conn = db::connect(&cfg).unwrap();
            schema::ensure_tables(&conn).unwrap();
            // the reference rows point at suppliers 1-5
            conn.execute_batch(
                "INSERT INTO Suppliers VALUES
                     (1, 'Green Valley Farm', 'Western Cape'),
                     (2, 'Sunrise Vineyards', 'Western Cape'),
                     (3, 'Olive Grove Estate', 'Eastern Cape'),
                     (4, 'Karoo Vines', 'Northern Cape'),
                     (5, 'Highveld Olives', 'Eastern Cape');",
            )
            .unwrap();
        }

        seed_reference_data(&cfg).unwrap();
        assert_eq!(counts(&cfg), (3, 5));

        seed_reference_data(&cfg).unwrap();
        assert_eq!(counts(&cfg), (3, 5), "re-seeding must not duplicate");
    }

    #[test]
    fn seeding_without_suppliers_rolls_back() {
        let dir = tempdir().unwrap();
        let cfg = DbConfig::at(dir.path(), "warehouse").unwrap();
        {
            let conn = db::connect(&cfg).unwrap();
            schema::ensure_tables(&conn).unwrap();
        }

        // foreign keys reject every row; nothing may survive
        let err = seed_reference_data(&cfg).unwrap_err();
        assert!(matches!(err, Error::Load { .. }), "got {err:?}");
        assert_eq!(counts(&cfg), (0, 0));
    }
}
