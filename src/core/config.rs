use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::advice::AdviceThresholds;
use super::score::ScoreModel;
use super::types::Metric;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("benchmark for {metric:?}: {reason}")]
    Benchmark { metric: Metric, reason: String },

    #[error("net worth for age bracket {age} must be finite")]
    AgeBracket { age: u32 },

    #[error("forecast assumption {field}: {reason}")]
    Assumption { field: &'static str, reason: String },

    #[error("scoring policy: {0}")]
    Policy(String),
}

/// One point of a piecewise-linear percentile table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub value: f64,
    pub percentile: f64,
}

impl Breakpoint {
    pub const fn new(value: f64, percentile: f64) -> Self {
        Self { value, percentile }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Benchmark {
    pub average: f64,
    pub std_dev: f64,
    /// Inverts the ratio method for metrics such as debt.
    pub lower_is_better: bool,
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self {
            average: 0.0,
            std_dev: 0.0,
            lower_is_better: false,
            breakpoints: Vec::new(),
        }
    }
}

impl Benchmark {
    pub fn new(average: f64, std_dev: f64) -> Self {
        Self {
            average,
            std_dev,
            ..Self::default()
        }
    }

    fn inverted(mut self) -> Self {
        self.lower_is_better = true;
        self
    }

    fn with_breakpoints(mut self, breakpoints: &[Breakpoint]) -> Self {
        self.breakpoints = breakpoints.to_vec();
        self
    }

    fn validate(&self, metric: Metric) -> Result<(), ConfigError> {
        let fail = |reason: &str| ConfigError::Benchmark {
            metric,
            reason: reason.to_string(),
        };
        if !self.average.is_finite() {
            return Err(fail("average must be finite"));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(fail("standard deviation must be finite and >= 0"));
        }
        for pair in self.breakpoints.windows(2) {
            if !(pair[0].value < pair[1].value) {
                return Err(fail("breakpoint values must be strictly increasing"));
            }
        }
        for point in &self.breakpoints {
            if !point.value.is_finite() {
                return Err(fail("breakpoint values must be finite"));
            }
            if !(0.0..=100.0).contains(&point.percentile) {
                return Err(fail("breakpoint percentiles must be between 0 and 100"));
            }
        }
        Ok(())
    }
}

/// National reference distributions the user is compared against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NationalBenchmarks {
    pub metrics: BTreeMap<Metric, Benchmark>,
    pub net_worth_by_age: BTreeMap<u32, f64>,
}

impl Default for NationalBenchmarks {
    fn default() -> Self {
        let monthly = |annual: f64| annual / 12.0;
        let metrics = BTreeMap::from([
            (
                Metric::Income,
                Benchmark::new(5_000.0, 2_000.0).with_breakpoints(&[
                    Breakpoint::new(monthly(20_000.0), 30.0),
                    Breakpoint::new(monthly(100_000.0), 70.0),
                    Breakpoint::new(monthly(250_000.0), 95.0),
                ]),
            ),
            (
                Metric::Expenses,
                Benchmark::new(3_500.0, 1_500.0).inverted(),
            ),
            (
                Metric::Savings,
                Benchmark::new(25_000.0, 15_000.0).with_breakpoints(&[
                    Breakpoint::new(1_000.0, 20.0),
                    Breakpoint::new(25_000.0, 50.0),
                    Breakpoint::new(100_000.0, 85.0),
                ]),
            ),
            (Metric::Investments, Benchmark::new(40_000.0, 30_000.0)),
            (
                Metric::CreditScore,
                Benchmark::new(710.0, 40.0).with_breakpoints(&[
                    Breakpoint::new(580.0, 20.0),
                    Breakpoint::new(670.0, 40.0),
                    Breakpoint::new(740.0, 70.0),
                    Breakpoint::new(800.0, 90.0),
                ]),
            ),
            (
                Metric::NetWorth,
                Benchmark::new(100_000.0, 50_000.0).with_breakpoints(&[
                    Breakpoint::new(0.0, 20.0),
                    Breakpoint::new(100_000.0, 50.0),
                    Breakpoint::new(500_000.0, 80.0),
                    Breakpoint::new(1_000_000.0, 90.0),
                ]),
            ),
            (
                Metric::Debt,
                Benchmark::new(20_000.0, 10_000.0).inverted(),
            ),
            (Metric::EmergencyFundMonths, Benchmark::new(3.0, 2.0)),
            (Metric::SavingsRate, Benchmark::new(0.15, 0.1)),
            (Metric::InvestmentRate, Benchmark::new(0.2, 0.1)),
        ]);
        let net_worth_by_age = BTreeMap::from([
            (20, 5_000.0),
            (30, 35_000.0),
            (40, 80_000.0),
            (50, 150_000.0),
            (60, 250_000.0),
        ]);
        Self {
            metrics,
            net_worth_by_age,
        }
    }
}

impl NationalBenchmarks {
    pub fn get(&self, metric: Metric) -> Option<&Benchmark> {
        self.metrics.get(&metric)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (metric, benchmark) in &self.metrics {
            benchmark.validate(*metric)?;
        }
        for (age, net_worth) in &self.net_worth_by_age {
            if !net_worth.is_finite() {
                return Err(ConfigError::AgeBracket { age: *age });
            }
        }
        Ok(())
    }
}

/// Constant annual growth assumptions used by the forecaster. Rates are fractions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastAssumptions {
    pub income_growth_rate: f64,
    /// Share of monthly net income added to savings.
    pub savings_contribution_rate: f64,
    pub investment_growth_rate: f64,
    pub debt_reduction_rate: f64,
    pub credit_score_improvement_per_year: u32,
    pub horizons: Vec<u32>,
}

impl Default for ForecastAssumptions {
    fn default() -> Self {
        Self {
            income_growth_rate: 0.03,
            savings_contribution_rate: 0.15,
            investment_growth_rate: 0.06,
            debt_reduction_rate: 0.05,
            credit_score_improvement_per_year: 5,
            horizons: vec![2, 5, 10],
        }
    }
}

impl ForecastAssumptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |field: &'static str, reason: &str| ConfigError::Assumption {
            field,
            reason: reason.to_string(),
        };
        if !self.income_growth_rate.is_finite() || self.income_growth_rate <= -1.0 {
            return Err(fail("incomeGrowthRate", "must be finite and > -1"));
        }
        if !self.investment_growth_rate.is_finite() || self.investment_growth_rate <= -1.0 {
            return Err(fail("investmentGrowthRate", "must be finite and > -1"));
        }
        if !self.savings_contribution_rate.is_finite() {
            return Err(fail("savingsContributionRate", "must be finite"));
        }
        if !(0.0..=1.0).contains(&self.debt_reduction_rate) {
            return Err(fail("debtReductionRate", "must be between 0 and 1"));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentileMethod {
    #[default]
    #[serde(alias = "normalCdf", alias = "normal_cdf", alias = "cdf")]
    NormalCdf,
    #[serde(alias = "linear")]
    Ratio,
    #[serde(alias = "interpolated")]
    Piecewise,
}

/// Score breakpoints for the traffic-light grade. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TierThresholds {
    pub green_above: f64,
    pub yellow_above: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            green_above: 75.0,
            yellow_above: 50.0,
        }
    }
}

/// Everything about scoring and comparison that historically varied between releases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringPolicy {
    pub score_model: ScoreModel,
    pub percentile_method: PercentileMethod,
    pub emergency_fund_cap: Option<f64>,
    pub tiers: TierThresholds,
    pub advice: AdviceThresholds,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            score_model: ScoreModel::default(),
            percentile_method: PercentileMethod::default(),
            emergency_fund_cap: Some(12.0),
            tiers: TierThresholds::default(),
            advice: AdviceThresholds::default(),
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(cap) = self.emergency_fund_cap {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(ConfigError::Policy(
                    "emergencyFundCap must be finite and > 0".to_string(),
                ));
            }
        }
        if !(self.tiers.yellow_above < self.tiers.green_above) {
            return Err(ConfigError::Policy(
                "tiers.yellowAbove must be < tiers.greenAbove".to_string(),
            ));
        }
        self.score_model.validate().map_err(ConfigError::Policy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub benchmarks: NationalBenchmarks,
    pub assumptions: ForecastAssumptions,
    pub policy: ScoringPolicy,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.benchmarks.validate()?;
        self.assumptions.validate()?;
        self.policy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default()
            .validate()
            .expect("defaults must validate");
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let json = r#"{
          "assumptions": { "incomeGrowthRate": 0.05, "horizons": [1, 3] },
          "policy": { "percentileMethod": "piecewise", "emergencyFundCap": 6 }
        }"#;
        let config = EngineConfig::from_json_str(json).expect("config should parse");

        assert_eq!(config.assumptions.income_growth_rate, 0.05);
        assert_eq!(config.assumptions.investment_growth_rate, 0.06);
        assert_eq!(config.assumptions.horizons, vec![1, 3]);
        assert_eq!(config.policy.percentile_method, PercentileMethod::Piecewise);
        assert_eq!(config.policy.emergency_fund_cap, Some(6.0));
        assert_eq!(config.benchmarks, NationalBenchmarks::default());
    }

    #[test]
    fn null_cap_disables_emergency_fund_cap() {
        let config = EngineConfig::from_json_str(r#"{ "policy": { "emergencyFundCap": null } }"#)
            .expect("config should parse");
        assert_eq!(config.policy.emergency_fund_cap, None);
    }

    #[test]
    fn benchmarks_parse_metric_and_age_keys() {
        let json = r#"{
          "benchmarks": {
            "metrics": { "creditScore": { "average": 700, "stdDev": 50 } },
            "netWorthByAge": { "25": 10000 }
          }
        }"#;
        let config = EngineConfig::from_json_str(json).expect("config should parse");
        let credit = config
            .benchmarks
            .get(Metric::CreditScore)
            .expect("credit benchmark");
        assert_eq!(credit.average, 700.0);
        assert_eq!(credit.std_dev, 50.0);
        assert!(config.benchmarks.get(Metric::Income).is_none());
        assert_eq!(config.benchmarks.net_worth_by_age.get(&25), Some(&10_000.0));
    }

    #[test]
    fn rejects_negative_std_dev() {
        let mut config = EngineConfig::default();
        config
            .benchmarks
            .metrics
            .insert(Metric::Debt, Benchmark::new(20_000.0, -1.0));
        let err = config.validate().expect_err("must reject negative std dev");
        assert!(err.to_string().contains("standard deviation"));
    }

    #[test]
    fn rejects_unsorted_breakpoints() {
        let mut config = EngineConfig::default();
        config.benchmarks.metrics.insert(
            Metric::Income,
            Benchmark::new(5_000.0, 2_000.0).with_breakpoints(&[
                Breakpoint::new(5_000.0, 50.0),
                Breakpoint::new(1_000.0, 20.0),
            ]),
        );
        let err = config.validate().expect_err("must reject unsorted table");
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn rejects_inverted_tiers() {
        let mut config = EngineConfig::default();
        config.policy.tiers = TierThresholds {
            green_above: 40.0,
            yellow_above: 60.0,
        };
        let err = config.validate().expect_err("must reject inverted tiers");
        assert!(err.to_string().contains("yellowAbove"));
    }

    #[test]
    fn rejects_debt_reduction_above_one() {
        let mut config = EngineConfig::default();
        config.assumptions.debt_reduction_rate = 1.5;
        let err = config.validate().expect_err("must reject > 100% reduction");
        assert!(err.to_string().contains("debtReductionRate"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
