pub const CREATE_CARBON_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS carbon_entries (
  id             INTEGER PRIMARY KEY AUTOINCREMENT,
  owner_id       TEXT NOT NULL,
  activity_type  TEXT NOT NULL,
  activity_value REAL NOT NULL,
  unit           TEXT NOT NULL,
  calculated_co2 REAL NOT NULL DEFAULT 0,
  category       TEXT NOT NULL DEFAULT 'other',
  created_at     INTEGER NOT NULL
);
"#;

pub const CREATE_AI_ANALYSIS: &str = r#"
CREATE TABLE IF NOT EXISTS ai_analysis (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  owner_id    TEXT NOT NULL,
  total_co2   REAL NOT NULL DEFAULT 0,
  breakdown   TEXT NOT NULL,
  insights    TEXT NOT NULL,
  predictions TEXT NOT NULL,
  created_at  INTEGER NOT NULL
);
"#;

pub const INDEX_ENTRIES_OWNER_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_carbon_entries_owner_created ON carbon_entries(owner_id, created_at);";

pub const INDEX_ANALYSIS_OWNER_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_ai_analysis_owner_created ON ai_analysis(owner_id, created_at);";

pub fn schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_CARBON_ENTRIES,
        CREATE_AI_ANALYSIS,
        INDEX_ENTRIES_OWNER_CREATED,
        INDEX_ANALYSIS_OWNER_CREATED,
    ]
}
