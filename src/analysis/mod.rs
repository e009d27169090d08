pub mod insights;
pub mod prediction;
pub mod suggestions;

use crate::calculator::Category;
use crate::db::Database;
use anyhow::{Context, Result};
use chrono::Utc;
use insights::WeeklyTrend;
use prediction::Prediction;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use suggestions::Comparison;

/// Breakdown window for a full analysis, in days.
pub const ANALYSIS_WINDOW_DAYS: u32 = 7;
/// History window feeding the prediction model, in days.
pub const HISTORY_WINDOW_DAYS: u32 = 30;

/// Merged insight payload: threshold findings plus suggestions and narrative.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisInsights {
    pub high_impact_areas: Vec<String>,
    pub quick_wins: Vec<String>,
    pub weekly_trend: WeeklyTrend,
    pub ai_suggestions: Vec<String>,
    pub detailed_analysis: String,
    pub comparison: Comparison,
    pub improvement_potential: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub total_co2: f64,
    pub breakdown: BTreeMap<Category, f64>,
    pub insights: AnalysisInsights,
    pub predictions: Vec<Prediction>,
    pub generated_at: String,
}

/// Runs a full analysis for one owner and persists the resulting snapshot.
///
/// The breakdown drives the threshold insights and suggestions; the prediction
/// model reads its own 30-day history independently. A failed snapshot write
/// fails the whole request; there is no retry, so each request attempts at
/// most one write.
pub fn run_analysis<R: Rng>(
    database: &Database,
    owner_id: &str,
    rng: &mut R,
) -> Result<AnalysisReport> {
    let breakdown = database.category_breakdown(owner_id, ANALYSIS_WINDOW_DAYS)?;
    let basic = insights::generate(&breakdown);

    let ai_suggestions = suggestions::suggestions(&breakdown);
    let details = suggestions::detailed_insights(&breakdown);

    let history = database.historical_daily_totals(owner_id, HISTORY_WINDOW_DAYS)?;
    let now = Utc::now();
    let predictions = prediction::predict(&history, now.date_naive(), rng);

    let report = AnalysisReport {
        total_co2: breakdown.total,
        breakdown: breakdown.categories,
        insights: AnalysisInsights {
            high_impact_areas: basic.high_impact_areas,
            quick_wins: basic.quick_wins,
            weekly_trend: basic.weekly_trend,
            ai_suggestions,
            detailed_analysis: details.detailed_analysis,
            comparison: details.comparison,
            improvement_potential: details.improvement_potential,
        },
        predictions,
        generated_at: now.to_rfc3339(),
    };

    let breakdown_json =
        serde_json::to_value(&report.breakdown).context("Failed to serialize breakdown")?;
    let insights_json =
        serde_json::to_value(&report.insights).context("Failed to serialize insights")?;
    let predictions_json =
        serde_json::to_value(&report.predictions).context("Failed to serialize predictions")?;

    database.insert_analysis(
        owner_id,
        report.total_co2,
        &breakdown_json,
        &insights_json,
        &predictions_json,
        now.timestamp(),
    )?;

    Ok(report)
}
