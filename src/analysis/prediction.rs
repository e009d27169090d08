use crate::calculator::round2;
use crate::db::DailySeriesPoint;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use serde::Serialize;

pub const FORECAST_DAYS: i64 = 7;

/// Day-of-week multipliers indexed by days-from-Sunday (Sun..Sat).
const DAY_FACTORS: [f64; 7] = [1.1, 1.0, 1.0, 1.0, 1.0, 1.2, 1.3];

const COLD_START_BASE: f64 = 25.0;
const COLD_START_SPREAD: f64 = 10.0;
const COLD_START_CONFIDENCE: i64 = 65;
const PREDICTION_FLOOR: f64 = 5.0;
const MAX_FACTORS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub predicted_co2: f64,
    pub confidence: i64,
    pub factors: Vec<String>,
}

/// Forecasts the next 7 days of emissions from the per-day history.
///
/// With no history at all there is no average to project from, so the
/// cold-start path emits a fixed band instead of dividing by zero. Randomness
/// comes from the injected generator, which keeps the model testable with a
/// seeded source; production callers pass a thread-local RNG.
pub fn predict<R: Rng>(
    history: &[DailySeriesPoint],
    today: NaiveDate,
    rng: &mut R,
) -> Vec<Prediction> {
    if history.is_empty() {
        return cold_start(today, rng);
    }

    let daily_values = history.iter().map(|point| point.daily_co2).collect::<Vec<_>>();
    let average = daily_values.iter().sum::<f64>() / daily_values.len() as f64;
    let confidence = confidence_score(history.len(), &daily_values, average);

    (1..=FORECAST_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let day_factor = DAY_FACTORS[date.weekday().num_days_from_sunday() as usize];
            let random_variation = rng.gen_range(0.9..1.1);
            let predicted_co2 =
                round2((average * day_factor * random_variation).max(PREDICTION_FLOOR));

            Prediction {
                date,
                predicted_co2,
                confidence,
                factors: identify_factors(date, history.len()),
            }
        })
        .collect()
}

fn cold_start<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<Prediction> {
    (1..=FORECAST_DAYS)
        .map(|offset| Prediction {
            date: today + Duration::days(offset),
            predicted_co2: COLD_START_BASE + rng.gen_range(0.0..COLD_START_SPREAD),
            confidence: COLD_START_CONFIDENCE,
            factors: vec!["new_user_pattern".to_string()],
        })
        .collect()
}

/// Heuristic reliability score clamped to [60, 95]: grows with data points,
/// penalized when the history is volatile (stddev above half the mean).
fn confidence_score(data_points: usize, values: &[f64], average: f64) -> i64 {
    let mut confidence = (50 + data_points as i64 * 3).min(95);

    let variance = values
        .iter()
        .map(|value| (value - average).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    if variance.sqrt() > average * 0.5 {
        confidence -= 15;
    }

    confidence.max(60)
}

fn identify_factors(date: NaiveDate, data_points: usize) -> Vec<String> {
    let mut factors = Vec::new();

    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        factors.push("weekend_pattern".to_string());
    }

    if data_points < 7 {
        factors.push("limited_data".to_string());
    }

    factors.truncate(MAX_FACTORS);
    factors
}
