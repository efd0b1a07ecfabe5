use super::advice::generate_advice;
use super::config::{EngineConfig, ForecastAssumptions, NationalBenchmarks, ScoringPolicy};
use super::forecast::forecast_horizons;
use super::percentile::{age_group_comparison, metric_percentiles};
use super::ratios::{calculate_ratios, goal_progress};
use super::score::{calculate_score, classify_score};
use super::types::{DerivedMetrics, FinancialProfile, FinancialReport};

/// Everything derived from one profile. Pure: identical inputs give identical output,
/// and zero denominators resolve to documented sentinels instead of failing.
pub fn compute_derived_metrics(
    profile: &FinancialProfile,
    benchmarks: &NationalBenchmarks,
    assumptions: &ForecastAssumptions,
    policy: &ScoringPolicy,
) -> DerivedMetrics {
    let ratios = calculate_ratios(profile, policy.emergency_fund_cap);
    let card = calculate_score(&policy.score_model, profile, &ratios, benchmarks);
    let score_tier = classify_score(card.score, &policy.tiers);

    tracing::debug!(
        score = card.score,
        tier = ?score_tier,
        adjustments = card.adjustments.len(),
        "computed financial score"
    );

    DerivedMetrics {
        percentiles: metric_percentiles(profile, &ratios, benchmarks, policy.percentile_method),
        age_comparison: age_group_comparison(profile.age, ratios.net_worth, benchmarks),
        savings_goal_progress: goal_progress(profile.total_savings, profile.savings_goal),
        investment_goal_progress: goal_progress(
            profile.total_investments,
            profile.investment_goal,
        ),
        forecast: forecast_horizons(profile, ratios.net_income, assumptions),
        financial_score: card.score,
        score_tier,
        score_adjustments: card.adjustments,
        ratios,
    }
}

pub fn build_report(profile: &FinancialProfile, config: &EngineConfig) -> FinancialReport {
    let metrics = compute_derived_metrics(
        profile,
        &config.benchmarks,
        &config.assumptions,
        &config.policy,
    );
    let advice = generate_advice(profile, &metrics.ratios, &config.policy.advice);
    tracing::debug!(advice = advice.len(), "built financial report");
    FinancialReport { metrics, advice }
}
