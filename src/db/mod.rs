pub mod queries;

use crate::calculator::{Category, round2};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct CarbonEntry {
    pub id: i64,
    pub owner_id: String,
    pub activity_type: String,
    pub activity_value: f64,
    pub unit: String,
    pub calculated_co2: f64,
    pub category: Category,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_co2: f64,
    pub activity_count: i64,
}

/// One point of the per-day history consumed by the prediction model.
#[derive(Debug, Clone)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub daily_co2: f64,
}

/// Per-category CO2 sums over a window. Categories with no entries in the
/// window are absent from the map; `total` is the sum across all categories.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryBreakdown {
    pub categories: BTreeMap<Category, f64>,
    pub total: f64,
}

impl CategoryBreakdown {
    pub fn share(&self, category: Category) -> f64 {
        self.categories.get(&category).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRow {
    pub id: i64,
    pub owner_id: String,
    pub total_co2: f64,
    pub breakdown: Value,
    pub insights: Value,
    pub predictions: Value,
    pub created_at: i64,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_entry(
        &self,
        owner_id: &str,
        activity_type: &str,
        activity_value: f64,
        unit: &str,
        calculated_co2: f64,
        category: Category,
        created_at: i64,
    ) -> Result<CarbonEntry> {
        self.conn
            .execute(
                "INSERT INTO carbon_entries (owner_id, activity_type, activity_value, unit, calculated_co2, category, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    owner_id,
                    activity_type,
                    activity_value,
                    unit,
                    calculated_co2,
                    category.as_str(),
                    created_at
                ],
            )
            .context("Failed to insert carbon entry")?;

        Ok(CarbonEntry {
            id: self.conn.last_insert_rowid(),
            owner_id: owner_id.to_string(),
            activity_type: activity_type.to_string(),
            activity_value,
            unit: unit.to_string(),
            calculated_co2,
            category,
            created_at,
        })
    }

    pub fn entries_since(&self, owner_id: &str, since_ts: i64) -> Result<Vec<CarbonEntry>> {
        let mut statement = self.conn.prepare(
            "SELECT id, owner_id, activity_type, activity_value, unit, calculated_co2, category, created_at
             FROM carbon_entries
             WHERE owner_id = ?1 AND created_at >= ?2
             ORDER BY created_at DESC",
        )?;

        let rows = statement
            .query_map(params![owner_id, since_ts], |row| {
                Ok(CarbonEntry {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    activity_type: row.get(2)?,
                    activity_value: row.get(3)?,
                    unit: row.get(4)?,
                    calculated_co2: row.get(5)?,
                    category: Category::parse(&row.get::<_, String>(6)?),
                    created_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query carbon entries")?;

        Ok(rows)
    }

    pub fn delete_entry(&self, owner_id: &str, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM carbon_entries WHERE owner_id = ?1 AND id = ?2",
                params![owner_id, id],
            )
            .context("Failed to delete carbon entry")?;

        Ok(deleted > 0)
    }

    pub fn latest_entry_timestamp(&self, owner_id: &str) -> Result<Option<i64>> {
        let timestamp = self
            .conn
            .query_row(
                "SELECT created_at FROM carbon_entries WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT 1",
                params![owner_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query latest entry timestamp")?;

        Ok(timestamp)
    }

    pub fn entry_count(&self, owner_id: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM carbon_entries WHERE owner_id = ?1",
                params![owner_id],
                |row| row.get(0),
            )
            .context("Failed to count carbon entries")
    }

    /// Per-day totals over the window, grouped by UTC calendar date, ascending.
    /// Days without entries are omitted rather than zero-filled.
    pub fn daily_totals(&self, owner_id: &str, window_days: u32) -> Result<Vec<DailyTotal>> {
        let mut statement = self.conn.prepare(
            "SELECT date(created_at, 'unixepoch') AS day, SUM(calculated_co2), COUNT(*)
             FROM carbon_entries
             WHERE owner_id = ?1 AND created_at >= ?2
             GROUP BY day
             ORDER BY day ASC",
        )?;

        let rows = statement
            .query_map(params![owner_id, window_start_ts(window_days)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query daily totals")?;

        rows.into_iter()
            .map(|(day, total_co2, activity_count)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date from daily totals query: {day}"))?;
                Ok(DailyTotal {
                    date,
                    total_co2: round2(total_co2),
                    activity_count,
                })
            })
            .collect()
    }

    /// Per-category CO2 sums over the window. Absent categories are omitted.
    pub fn category_breakdown(&self, owner_id: &str, window_days: u32) -> Result<CategoryBreakdown> {
        let mut statement = self.conn.prepare(
            "SELECT category, SUM(calculated_co2)
             FROM carbon_entries
             WHERE owner_id = ?1 AND created_at >= ?2
             GROUP BY category",
        )?;

        let rows = statement
            .query_map(params![owner_id, window_start_ts(window_days)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query category breakdown")?;

        let categories = rows
            .into_iter()
            .map(|(category, total)| (Category::parse(&category), round2(total)))
            .collect::<BTreeMap<_, _>>();
        let total = round2(categories.values().sum());

        Ok(CategoryBreakdown { categories, total })
    }

    /// Daily history feeding the prediction model, oldest first.
    pub fn historical_daily_totals(
        &self,
        owner_id: &str,
        window_days: u32,
    ) -> Result<Vec<DailySeriesPoint>> {
        let mut statement = self.conn.prepare(
            "SELECT date(created_at, 'unixepoch') AS day, SUM(calculated_co2)
             FROM carbon_entries
             WHERE owner_id = ?1 AND created_at >= ?2
             GROUP BY day
             ORDER BY day ASC",
        )?;

        let rows = statement
            .query_map(params![owner_id, window_start_ts(window_days)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query historical daily totals")?;

        rows.into_iter()
            .map(|(day, daily_co2)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date from history query: {day}"))?;
                Ok(DailySeriesPoint { date, daily_co2 })
            })
            .collect()
    }

    pub fn insert_analysis(
        &self,
        owner_id: &str,
        total_co2: f64,
        breakdown: &Value,
        insights: &Value,
        predictions: &Value,
        created_at: i64,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO ai_analysis (owner_id, total_co2, breakdown, insights, predictions, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    owner_id,
                    total_co2,
                    breakdown.to_string(),
                    insights.to_string(),
                    predictions.to_string(),
                    created_at
                ],
            )
            .context("Failed to insert analysis snapshot")?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_analysis_history(&self, owner_id: &str, limit: usize) -> Result<Vec<AnalysisRow>> {
        let mut statement = self.conn.prepare(
            "SELECT id, owner_id, total_co2, breakdown, insights, predictions, created_at
             FROM ai_analysis
             WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;

        let rows = statement
            .query_map(params![owner_id, limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query analysis history")?;

        rows.into_iter()
            .map(|(id, owner_id, total_co2, breakdown, insights, predictions, created_at)| {
                Ok(AnalysisRow {
                    id,
                    owner_id,
                    total_co2,
                    breakdown: serde_json::from_str(&breakdown)
                        .context("Failed to parse stored breakdown JSON")?,
                    insights: serde_json::from_str(&insights)
                        .context("Failed to parse stored insights JSON")?,
                    predictions: serde_json::from_str(&predictions)
                        .context("Failed to parse stored predictions JSON")?,
                    created_at,
                })
            })
            .collect()
    }
}

/// Start of the inclusive `[today - window_days, today]` window as a unix
/// timestamp. Calendar days are UTC; an entry belongs to the UTC date of its
/// `created_at`.
pub fn window_start_ts(window_days: u32) -> i64 {
    let start = Utc::now().date_naive() - Duration::days(i64::from(window_days));
    start.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::calculator::Category;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn open_test_db(dir: &TempDir) -> Database {
        Database::open(&dir.path().join("carbon.db")).expect("open test db")
    }

    fn ts_days_ago(days: i64) -> i64 {
        (Utc::now() - Duration::days(days)).timestamp()
    }

    #[test]
    fn insert_and_list_entries_newest_first() {
        let dir = TempDir::new().expect("tempdir");
        let db = open_test_db(&dir);

        db.insert_entry("alice", "car_commute", 10.0, "km", 2.1, Category::Transport, ts_days_ago(2))
            .expect("insert");
        db.insert_entry("alice", "beef_dinner", 1.0, "kg", 27.0, Category::Food, ts_days_ago(1))
            .expect("insert");
        db.insert_entry("bob", "bus_trip", 5.0, "km", 0.53, Category::Transport, ts_days_ago(1))
            .expect("insert");

        let entries = db.entries_since("alice", ts_days_ago(7)).expect("list");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].activity_type, "beef_dinner");
        assert_eq!(entries[1].activity_type, "car_commute");
    }

    #[test]
    fn delete_entry_is_owner_scoped() {
        let dir = TempDir::new().expect("tempdir");
        let db = open_test_db(&dir);

        let entry = db
            .insert_entry("alice", "car_commute", 10.0, "km", 2.1, Category::Transport, ts_days_ago(0))
            .expect("insert");

        assert!(!db.delete_entry("bob", entry.id).expect("delete as bob"));
        assert!(db.delete_entry("alice", entry.id).expect("delete as alice"));
        assert_eq!(db.entry_count("alice").expect("count"), 0);
    }

    #[test]
    fn daily_totals_group_by_date_ascending_and_sparse() {
        let dir = TempDir::new().expect("tempdir");
        let db = open_test_db(&dir);

        db.insert_entry("alice", "car_commute", 10.0, "km", 2.1, Category::Transport, ts_days_ago(3))
            .expect("insert");
        db.insert_entry("alice", "bus_trip", 10.0, "km", 1.05, Category::Transport, ts_days_ago(3))
            .expect("insert");
        db.insert_entry("alice", "beef_dinner", 1.0, "kg", 27.0, Category::Food, ts_days_ago(1))
            .expect("insert");

        let totals = db.daily_totals("alice", 7).expect("daily totals");
        assert_eq!(totals.len(), 2);
        assert!(totals[0].date < totals[1].date);
        assert_eq!(totals[0].total_co2, 3.15);
        assert_eq!(totals[0].activity_count, 2);
        assert_eq!(totals[1].total_co2, 27.0);
    }

    #[test]
    fn breakdown_sums_by_category_and_totals_match() {
        let dir = TempDir::new().expect("tempdir");
        let db = open_test_db(&dir);

        db.insert_entry("alice", "car_commute", 100.0, "km", 21.0, Category::Transport, ts_days_ago(2))
            .expect("insert");
        db.insert_entry("alice", "flight_short", 100.0, "km", 25.5, Category::Transport, ts_days_ago(1))
            .expect("insert");
        db.insert_entry("alice", "electricity_home", 10.0, "kwh", 8.5, Category::Energy, ts_days_ago(1))
            .expect("insert");

        let breakdown = db.category_breakdown("alice", 7).expect("breakdown");
        assert_eq!(breakdown.share(Category::Transport), 46.5);
        assert_eq!(breakdown.share(Category::Energy), 8.5);
        assert_eq!(breakdown.share(Category::Food), 0.0);
        assert!(!breakdown.categories.contains_key(&Category::Food));

        let summed: f64 = breakdown.categories.values().sum();
        assert!((summed - breakdown.total).abs() < 0.01);
    }

    #[test]
    fn entries_outside_window_are_excluded() {
        let dir = TempDir::new().expect("tempdir");
        let db = open_test_db(&dir);

        db.insert_entry("alice", "car_commute", 10.0, "km", 2.1, Category::Transport, ts_days_ago(20))
            .expect("insert");
        db.insert_entry("alice", "bus_trip", 10.0, "km", 1.05, Category::Transport, ts_days_ago(1))
            .expect("insert");

        let breakdown = db.category_breakdown("alice", 7).expect("breakdown");
        assert_eq!(breakdown.total, 1.05);

        let history = db.historical_daily_totals("alice", 30).expect("history");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn analysis_history_is_newest_first_and_round_trips_json() {
        let dir = TempDir::new().expect("tempdir");
        let db = open_test_db(&dir);

        let breakdown = json!({"transport": 10.0});
        let insights = json!({"weekly_trend": "stable"});
        let predictions = json!([]);

        db.insert_analysis("alice", 10.0, &breakdown, &insights, &predictions, 1_000)
            .expect("insert analysis");
        db.insert_analysis("alice", 20.0, &breakdown, &insights, &predictions, 2_000)
            .expect("insert analysis");
        db.insert_analysis("bob", 5.0, &breakdown, &insights, &predictions, 3_000)
            .expect("insert analysis");

        let history = db.list_analysis_history("alice", 10).expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].total_co2, 20.0);
        assert_eq!(history[1].total_co2, 10.0);
        assert_eq!(history[0].insights["weekly_trend"], "stable");

        let limited = db.list_analysis_history("alice", 1).expect("history");
        assert_eq!(limited.len(), 1);
    }
}
