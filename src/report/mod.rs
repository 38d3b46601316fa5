//! Quarterly reporting: regional performance vs target and top suppliers
//! per region, written as CSV files and printed as console tables.

use crate::error::Error;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use duckdb::Connection;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// A calendar quarter, parsed from labels like `2025-Q4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quarter {
    pub year: i32,
    pub n: u32,
}

impl Quarter {
    /// Label as stored in `Sales_Targets.quarter`.
    pub fn label(&self) -> String {
        format!("{}-Q{}", self.year, self.n)
    }

    /// First day of the quarter.
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, (self.n - 1) * 3 + 1, 1).unwrap()
    }

    /// Last day of the quarter.
    pub fn end(&self) -> NaiveDate {
        let (year, month) = if self.n == 4 {
            (self.year + 1, 1)
        } else {
            (self.year, self.n * 3 + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap() - chrono::Days::new(1)
    }
}

impl FromStr for Quarter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let bad = || Error::Configuration(format!("invalid quarter `{s}`, expected YYYY-Qn"));
        let (year, q) = s.split_once("-Q").ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let n: u32 = q.parse().map_err(|_| bad())?;
        if !(1..=4).contains(&n) {
            return Err(bad());
        }
        Ok(Quarter { year, n })
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Revenue per region against its sales target.
#[derive(Debug, Clone, Serialize)]
pub struct RegionalPerformance {
    pub region: String,
    pub actual_revenue: f64,
    pub target_amount: f64,
    pub percent_of_target: f64,
}

/// One supplier's rank within its region by revenue.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierRanking {
    pub region: String,
    pub supplier_id: i64,
    pub farm_name: String,
    pub revenue: f64,
    pub supplier_rank: i64,
}

const REGIONAL_SQL: &str = "\
    SELECT
        s.region,
        CAST(SUM(o.total_price) AS DOUBLE) AS actual_revenue,
        CAST(t.target_amount AS DOUBLE) AS target_amount,
        CASE
            WHEN t.target_amount = 0 THEN 0
            ELSE CAST(ROUND(SUM(o.total_price) / t.target_amount * 100, 2) AS DOUBLE)
        END AS percent_of_target
    FROM Orders o
    JOIN Suppliers s ON o.supplier_id = s.supplier_id
    JOIN Sales_Targets t ON s.region = t.region
    WHERE t.quarter = ?
    GROUP BY s.region, t.target_amount
    ORDER BY s.region";

const RANKING_SQL: &str = "\
    SELECT region, supplier_id, farm_name, revenue, supplier_rank
    FROM (
        SELECT
            s.region,
            s.supplier_id,
            s.farm_name,
            CAST(SUM(o.total_price) AS DOUBLE) AS revenue,
            RANK() OVER (
                PARTITION BY s.region
                ORDER BY SUM(o.total_price) DESC
            ) AS supplier_rank
        FROM Orders o
        JOIN Suppliers s ON o.supplier_id = s.supplier_id
        WHERE o.order_date BETWEEN ? AND ?
        GROUP BY s.region, s.supplier_id, s.farm_name
    ) ranked
    WHERE supplier_rank <= ?
    ORDER BY region, supplier_rank, supplier_id";

/// Revenue vs target per region for the quarter.
pub fn regional_performance(
    conn: &Connection,
    quarter: &Quarter,
) -> duckdb::Result<Vec<RegionalPerformance>> {
    let mut stmt = conn.prepare(REGIONAL_SQL)?;
    let rows = stmt.query_map([quarter.label()], |row| {
        Ok(RegionalPerformance {
            region: row.get(0)?,
            actual_revenue: row.get(1)?,
            target_amount: row.get(2)?,
            percent_of_target: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// The `limit` best-selling suppliers of each region, ranked by revenue over
/// the quarter's date window. Ties share a rank.
pub fn top_suppliers(
    conn: &Connection,
    quarter: &Quarter,
    limit: i64,
) -> duckdb::Result<Vec<SupplierRanking>> {
    let start = quarter.start().to_string();
    let end = quarter.end().to_string();
    let mut stmt = conn.prepare(RANKING_SQL)?;
    let rows = stmt.query_map(duckdb::params![start, end, limit], |row| {
        Ok(SupplierRanking {
            region: row.get(0)?,
            supplier_id: row.get(1)?,
            farm_name: row.get(2)?,
            revenue: row.get(3)?,
            supplier_rank: row.get(4)?,
        })
    })?;
    rows.collect()
}

/// Serialize `rows` to a CSV file with a header row.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// File locations produced by [`generate`].
#[derive(Debug)]
pub struct ReportPaths {
    pub performance: PathBuf,
    pub top_suppliers: PathBuf,
}

/// Run both quarterly queries, write their CSV files under `out_dir` and
/// print console summaries.
pub fn generate(conn: &Connection, quarter: &Quarter, out_dir: &Path) -> Result<ReportPaths> {
    let q = quarter.label().to_lowercase();
    let q = q.rsplit('-').next().unwrap_or("q4").to_string();

    let performance = regional_performance(conn, quarter)
        .with_context(|| format!("regional performance query for {quarter}"))?;
    let rankings = top_suppliers(conn, quarter, 3)
        .with_context(|| format!("top suppliers query for {quarter}"))?;

    let paths = ReportPaths {
        performance: out_dir.join(format!("{q}_performance.csv")),
        top_suppliers: out_dir.join(format!("{q}_top_suppliers.csv")),
    };
    write_csv(&paths.performance, &performance)?;
    write_csv(&paths.top_suppliers, &rankings)?;

    println!("\n=== {quarter} Regional Performance ===");
    println!(
        "{:<16} {:>14} {:>14} {:>10}",
        "region", "revenue", "target", "% of tgt"
    );
    for r in &performance {
        println!(
            "{:<16} {:>14.2} {:>14.2} {:>10.2}",
            r.region, r.actual_revenue, r.target_amount, r.percent_of_target
        );
    }

    println!("\n=== Top 3 Suppliers per Region ===");
    println!(
        "{:<16} {:>4} {:<20} {:>12} {:>5}",
        "region", "id", "farm", "revenue", "rank"
    );
    for s in &rankings {
        println!(
            "{:<16} {:>4} {:<20} {:>12.2} {:>5}",
            s.region, s.supplier_id, s.farm_name, s.revenue, s.supplier_rank
        );
    }

    info!(
        performance = %paths.performance.display(),
        suppliers = %paths.top_suppliers.display(),
        "reports written"
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, schema};
    use tempfile::tempdir;

    fn seeded_connection() -> Connection {
        let conn = db::connect_in_memory().unwrap();
        schema::ensure_tables(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO Suppliers VALUES
                 (1, 'Green Valley Farm', 'Western Cape'),
                 (2, 'Sunrise Vineyards', 'Western Cape'),
                 (3, 'Olive Grove Estate', 'Eastern Cape'),
                 (4, 'Karoo Vines', 'Western Cape'),
                 (5, 'Highveld Olives', 'Eastern Cape');
             INSERT INTO Orders VALUES
                 (101, 1, DATE '2025-10-08', 1000.00),
                 (102, 2, DATE '2025-11-02', 2000.00),
                 (103, 3, DATE '2025-11-15', 1500.00),
                 (104, 4, DATE '2025-12-01', 500.00),
                 (105, 1, DATE '2025-12-20', 500.00),
                 (106, 3, DATE '2026-01-05', 9999.00);
             INSERT INTO Sales_Targets VALUES
                 ('Western Cape', '2025-Q4', 7000.00),
                 ('Eastern Cape', '2025-Q4', 1500.00);",
        )
        .unwrap();
        conn
    }

    fn q4() -> Quarter {
        "2025-Q4".parse().unwrap()
    }

    #[test]
    fn quarter_parses_label_and_window() {
        let q = q4();
        assert_eq!(q.label(), "2025-Q4");
        assert_eq!(q.start(), NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(q.end(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        let q2: Quarter = "2026-Q2".parse().unwrap();
        assert_eq!(q2.end(), NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());
    }

    #[test]
    fn malformed_quarter_is_rejected() {
        for bad in ["2025Q4", "2025-Q5", "Q4-2025", "banana"] {
            assert!(bad.parse::<Quarter>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn regional_performance_sums_and_compares() {
        let conn = seeded_connection();
        let rows = regional_performance(&conn, &q4()).unwrap();
        assert_eq!(rows.len(), 2);

        // ordered by region name
        let eastern = &rows[0];
        assert_eq!(eastern.region, "Eastern Cape");
        assert_eq!(eastern.actual_revenue, 1500.0);
        assert_eq!(eastern.percent_of_target, 100.0);

        let western = &rows[1];
        assert_eq!(western.region, "Western Cape");
        assert_eq!(western.actual_revenue, 4000.0);
        assert_eq!(western.target_amount, 7000.0);
        // 4000 / 7000 = 57.14%
        assert!((western.percent_of_target - 57.14).abs() < 1e-9);
    }

    #[test]
    fn january_order_is_outside_the_quarter() {
        let conn = seeded_connection();
        let rows = top_suppliers(&conn, &q4(), 10).unwrap();
        let olive = rows
            .iter()
            .find(|r| r.supplier_id == 3)
            .expect("supplier 3 ranked");
        assert_eq!(olive.revenue, 1500.0, "order 106 must not count");
    }

    #[test]
    fn rankings_partition_by_region() {
        let conn = seeded_connection();
        let rows = top_suppliers(&conn, &q4(), 3).unwrap();

        let western: Vec<_> = rows.iter().filter(|r| r.region == "Western Cape").collect();
        assert_eq!(western.len(), 3);
        assert_eq!(western[0].supplier_id, 2, "Sunrise leads with 2000");
        assert_eq!(western[0].supplier_rank, 1);
        assert_eq!(western[1].supplier_id, 1, "Green Valley second with 1500");
        assert_eq!(western[2].supplier_id, 4);
        assert_eq!(western[2].supplier_rank, 3);

        let eastern: Vec<_> = rows.iter().filter(|r| r.region == "Eastern Cape").collect();
        assert_eq!(eastern.len(), 1);
        assert_eq!(eastern[0].supplier_rank, 1);
    }

    #[test]
    fn generate_writes_both_csv_files() {
        let conn = seeded_connection();
        let out = tempdir().unwrap();
        let paths = generate(&conn, &q4(), out.path()).unwrap();

        assert_eq!(
            paths.performance.file_name().unwrap(),
            "q4_performance.csv"
        );
        let body = std::fs::read_to_string(&paths.performance).unwrap();
        assert!(body.starts_with("region,actual_revenue,target_amount,percent_of_target"));
        assert!(body.contains("Western Cape"));

        let body = std::fs::read_to_string(&paths.top_suppliers).unwrap();
        assert!(body.starts_with("region,supplier_id,farm_name,revenue,supplier_rank"));
    }
}
