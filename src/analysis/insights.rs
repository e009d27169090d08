use crate::calculator::Category;
use crate::db::CategoryBreakdown;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeeklyTrend {
    Increasing,
    Stable,
    Decreasing,
}

/// Qualitative findings derived from one category breakdown. Recomputed fresh
/// on every analysis request and only persisted as part of a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub high_impact_areas: Vec<String>,
    pub quick_wins: Vec<String>,
    pub weekly_trend: WeeklyTrend,
}

/// Threshold rules over the breakdown. Each rule compares a category against a
/// fraction of the grand total, so a category with no entries can never fire.
/// The rules are independent; several may contribute at once.
pub fn generate(breakdown: &CategoryBreakdown) -> Insights {
    let total = breakdown.total;
    let mut high_impact_areas = Vec::new();
    let mut quick_wins = Vec::new();

    if breakdown.share(Category::Transport) > total * 0.4 {
        high_impact_areas.push("Transportation".to_string());
        quick_wins.push("Use public transport for commute".to_string());
    }

    if breakdown.share(Category::Food) > total * 0.3 {
        high_impact_areas.push("Food consumption".to_string());
        quick_wins.push("Try meatless Mondays".to_string());
    }

    if breakdown.share(Category::Energy) > total * 0.25 {
        high_impact_areas.push("Home energy usage".to_string());
        quick_wins.push("Switch to LED bulbs".to_string());
    }

    let weekly_trend = if total > 100.0 {
        WeeklyTrend::Increasing
    } else if total < 50.0 {
        WeeklyTrend::Decreasing
    } else {
        WeeklyTrend::Stable
    };

    Insights {
        high_impact_areas,
        quick_wins,
        weekly_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::{WeeklyTrend, generate};
    use crate::calculator::Category;
    use crate::db::CategoryBreakdown;
    use std::collections::BTreeMap;

    fn breakdown(pairs: &[(Category, f64)]) -> CategoryBreakdown {
        let categories = pairs.iter().copied().collect::<BTreeMap<_, _>>();
        let total = categories.values().sum();
        CategoryBreakdown { categories, total }
    }

    #[test]
    fn transport_heavy_week_flags_transportation_only() {
        // transport=50, energy=20, food=10: only 50 > 0.4 * 80 fires.
        let input = breakdown(&[
            (Category::Transport, 50.0),
            (Category::Energy, 20.0),
            (Category::Food, 10.0),
        ]);

        let insights = generate(&input);
        assert_eq!(insights.high_impact_areas, vec!["Transportation"]);
        assert_eq!(insights.quick_wins, vec!["Use public transport for commute"]);
        assert_eq!(insights.weekly_trend, WeeklyTrend::Stable);
    }

    #[test]
    fn rules_are_independent_and_may_all_fire() {
        let input = breakdown(&[
            (Category::Transport, 45.0),
            (Category::Food, 35.0),
            (Category::Energy, 30.0),
        ]);

        let insights = generate(&input);
        assert_eq!(
            insights.high_impact_areas,
            vec!["Transportation", "Food consumption", "Home energy usage"]
        );
        assert_eq!(insights.quick_wins.len(), 3);
        assert_eq!(insights.weekly_trend, WeeklyTrend::Increasing);
    }

    #[test]
    fn empty_breakdown_fires_nothing_and_trends_decreasing() {
        let insights = generate(&CategoryBreakdown::default());
        assert!(insights.high_impact_areas.is_empty());
        assert!(insights.quick_wins.is_empty());
        assert_eq!(insights.weekly_trend, WeeklyTrend::Decreasing);
    }

    #[test]
    fn trend_boundaries() {
        let low = breakdown(&[(Category::Energy, 49.99)]);
        assert_eq!(generate(&low).weekly_trend, WeeklyTrend::Decreasing);

        let mid = breakdown(&[(Category::Energy, 100.0)]);
        assert_eq!(generate(&mid).weekly_trend, WeeklyTrend::Stable);

        let high = breakdown(&[(Category::Energy, 100.01)]);
        assert_eq!(generate(&high).weekly_trend, WeeklyTrend::Increasing);
    }

    #[test]
    fn generate_is_pure_and_idempotent() {
        let input = breakdown(&[(Category::Transport, 60.0), (Category::Food, 20.0)]);
        let first = generate(&input);
        let second = generate(&input);
        assert_eq!(first.high_impact_areas, second.high_impact_areas);
        assert_eq!(first.quick_wins, second.quick_wins);
        assert_eq!(first.weekly_trend, second.weekly_trend);
    }
}
