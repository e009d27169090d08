use crate::calculator::Category;
use crate::db::CategoryBreakdown;
use serde::{Deserialize, Serialize};

const MAX_SUGGESTIONS: usize = 5;

const TRANSPORT_SUGGESTIONS: [&str; 3] = [
    "🚗 Consider carpooling or using public transport 2-3 times per week",
    "🚶 Walk or cycle for trips under 3km to reduce emissions",
    "🛒 Combine multiple errands into one trip to minimize driving",
];

const ENERGY_SUGGESTIONS: [&str; 3] = [
    "💡 Switch to LED bulbs in high-usage areas of your home",
    "🔌 Unplug electronics when not in use to avoid phantom energy drain",
    "🌞 Use natural light during daytime instead of artificial lighting",
];

const FOOD_SUGGESTIONS: [&str; 3] = [
    "🌱 Try meatless Mondays - replace one meat meal with plant-based options",
    "🥦 Buy local and seasonal produce to reduce transportation emissions",
    "📝 Plan meals ahead to reduce food waste and save money",
];

const WASTE_SUGGESTIONS: [&str; 3] = [
    "♻️ Start composting food scraps to reduce landfill emissions",
    "📦 Reduce single-use plastics by using reusable containers",
    "📚 Recycle paper and cardboard properly to save trees",
];

const GENERAL_SUGGESTIONS: [&str; 3] = [
    "💧 Fix leaky faucets to save water and energy",
    "🌳 Plant a tree or support reforestation projects",
    "📊 Track your progress weekly to stay motivated",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AboveAverage,
    Average,
    BelowAverage,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedInsights {
    pub detailed_analysis: String,
    pub comparison: Comparison,
    pub improvement_potential: f64,
}

/// Ranked eco-suggestions: category pools gated by share-of-total thresholds,
/// appended in fixed order (transport, energy, food, waste, general), then cut
/// to five. The general pool is appended unconditionally, so the truncation is
/// a hard cap rather than an impact ranking.
pub fn suggestions(breakdown: &CategoryBreakdown) -> Vec<String> {
    let total = breakdown.total;
    let mut pool = Vec::new();

    if breakdown.share(Category::Transport) > total * 0.4 {
        pool.extend(TRANSPORT_SUGGESTIONS.map(String::from));
    }
    if breakdown.share(Category::Energy) > total * 0.3 {
        pool.extend(ENERGY_SUGGESTIONS.map(String::from));
    }
    if breakdown.share(Category::Food) > total * 0.25 {
        pool.extend(FOOD_SUGGESTIONS.map(String::from));
    }
    if breakdown.share(Category::Waste) > total * 0.15 {
        pool.extend(WASTE_SUGGESTIONS.map(String::from));
    }

    pool.extend(GENERAL_SUGGESTIONS.map(String::from));
    pool.truncate(MAX_SUGGESTIONS);
    pool
}

/// Narrative comparison against a weekly baseline, plus how many kg could
/// plausibly be shaved off. The potential is floored at zero in every branch.
pub fn detailed_insights(breakdown: &CategoryBreakdown) -> DetailedInsights {
    let total = breakdown.total;

    let (mut analysis, comparison, improvement_potential) = if total > 120.0 {
        (
            format!(
                "Your carbon footprint of {total}kg is above the recommended weekly average (100kg). Focus on reducing emissions in your highest impact categories."
            ),
            Comparison::AboveAverage,
            total - 80.0,
        )
    } else if total < 60.0 {
        (
            format!(
                "Great job! Your carbon footprint of {total}kg is well below average. Keep up the eco-friendly habits!"
            ),
            Comparison::BelowAverage,
            0.0,
        )
    } else {
        (
            format!(
                "Your carbon footprint of {total}kg is within a good range. Small improvements can make a big difference over time."
            ),
            Comparison::Average,
            total - 60.0,
        )
    };

    if breakdown.share(Category::Transport) > total * 0.4 {
        analysis.push_str(
            " Transportation is your largest emissions source. Consider alternative travel methods.",
        );
    }
    if breakdown.share(Category::Energy) > total * 0.3 {
        analysis.push_str(
            " Energy usage is significant. Look into energy-efficient appliances and habits.",
        );
    }

    DetailedInsights {
        detailed_analysis: analysis,
        comparison,
        improvement_potential: improvement_potential.max(0.0),
    }
}
