mod advice;
mod config;
mod engine;
mod forecast;
mod percentile;
mod ratios;
mod score;
mod types;

pub use advice::{AdviceThresholds, generate_advice};
pub use config::{
    Benchmark, Breakpoint, ConfigError, EngineConfig, ForecastAssumptions, NationalBenchmarks,
    PercentileMethod, ScoringPolicy, TierThresholds,
};
pub use engine::{build_report, compute_derived_metrics};
pub use forecast::{forecast, forecast_horizons};
pub use percentile::{
    age_group_comparison, interpolated_percentile, normal_percentile, ratio_percentile,
};
pub use ratios::calculate_ratios;
pub use score::{
    BenchmarkAdjustment, Comparison, ContinuousRules, DiscreteRules, Predicate,
    ProportionalTerm, ScoreAdjustment, ScoreInput, ScoreModel, ScoreRule, Tier,
};
pub use types::{
    Advice, AdviceTopic, AgeComparison, DerivedMetrics, FinancialProfile, FinancialReport,
    ForecastPoint, Metric, Ratios, ScoreTier,
};
