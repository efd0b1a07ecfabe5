//! Financial health score.
//!
//! Two rule shapes are supported. The discrete model adds fixed bonuses and
//! penalties when threshold predicates hold. The continuous model scales each
//! adjustment by how far a ratio sits past its threshold and rounds the result
//! to two decimals. Both clamp to [0, 100].

use serde::{Deserialize, Serialize};

use super::config::{NationalBenchmarks, TierThresholds};
use super::types::{FinancialProfile, Metric, Ratios, ScoreTier};

/// Quantity a score rule looks at.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreInput {
    DebtToIncome,
    SavingsRate,
    InvestmentRate,
    EmergencyFundMonths,
    CreditScore,
    NetWorth,
    Debt,
    Age,
}

impl ScoreInput {
    fn value(self, profile: &FinancialProfile, ratios: &Ratios) -> f64 {
        match self {
            ScoreInput::DebtToIncome => ratios.debt_to_income_ratio,
            ScoreInput::SavingsRate => ratios.savings_rate,
            ScoreInput::InvestmentRate => ratios.investment_rate,
            ScoreInput::EmergencyFundMonths => ratios.emergency_fund_months,
            ScoreInput::CreditScore => profile.credit_score as f64,
            ScoreInput::NetWorth => ratios.net_worth,
            ScoreInput::Debt => profile.current_debt,
            ScoreInput::Age => profile.age as f64,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    Above,
    Below,
    Equal,
}

impl Comparison {
    fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Above => value > threshold,
            Comparison::Below => value < threshold,
            Comparison::Equal => value == threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub input: ScoreInput,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Predicate {
    pub const fn new(input: ScoreInput, comparison: Comparison, threshold: f64) -> Self {
        Self {
            input,
            comparison,
            threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub threshold: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScoreRule {
    /// Applies `points` when every predicate holds.
    Flat {
        #[serde(default)]
        label: String,
        when: Vec<Predicate>,
        points: f64,
    },
    /// Applies the points of the first tier (in listed order) whose threshold matches.
    Tiered {
        #[serde(default)]
        label: String,
        input: ScoreInput,
        comparison: Comparison,
        tiers: Vec<Tier>,
    },
}

impl ScoreRule {
    fn flat(label: &str, when: &[Predicate], points: f64) -> Self {
        ScoreRule::Flat {
            label: label.to_string(),
            when: when.to_vec(),
            points,
        }
    }

    fn tiered(label: &str, input: ScoreInput, comparison: Comparison, tiers: &[(f64, f64)]) -> Self {
        ScoreRule::Tiered {
            label: label.to_string(),
            input,
            comparison,
            tiers: tiers
                .iter()
                .map(|&(threshold, points)| Tier { threshold, points })
                .collect(),
        }
    }

    fn label(&self) -> &str {
        match self {
            ScoreRule::Flat { label, .. } | ScoreRule::Tiered { label, .. } => label,
        }
    }

    /// Points this rule contributes, or `None` when it does not fire.
    pub fn points(&self, profile: &FinancialProfile, ratios: &Ratios) -> Option<f64> {
        match self {
            ScoreRule::Flat { when, points, .. } => when
                .iter()
                .all(|p| p.comparison.holds(p.input.value(profile, ratios), p.threshold))
                .then_some(*points),
            ScoreRule::Tiered {
                input,
                comparison,
                tiers,
                ..
            } => {
                let value = input.value(profile, ratios);
                tiers
                    .iter()
                    .find(|tier| comparison.holds(value, tier.threshold))
                    .map(|tier| tier.points)
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ScoreRule::Flat { label, when, points } => {
                if when.is_empty() {
                    return Err(format!("rule '{label}' needs at least one predicate"));
                }
                if !points.is_finite() || when.iter().any(|p| !p.threshold.is_finite()) {
                    return Err(format!("rule '{label}' must use finite numbers"));
                }
            }
            ScoreRule::Tiered { label, tiers, .. } => {
                if tiers.is_empty() {
                    return Err(format!("rule '{label}' needs at least one tier"));
                }
                if tiers
                    .iter()
                    .any(|t| !t.threshold.is_finite() || !t.points.is_finite())
                {
                    return Err(format!("rule '{label}' must use finite numbers"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscreteRules {
    pub base: f64,
    pub rules: Vec<ScoreRule>,
}

impl Default for DiscreteRules {
    /// Tiered debt and credit penalties with the age-conditioned net worth rules.
    fn default() -> Self {
        use Comparison::{Above, Below, Equal};
        use ScoreInput::*;

        Self {
            base: 100.0,
            rules: vec![
                ScoreRule::tiered(
                    "high debt-to-income",
                    DebtToIncome,
                    Above,
                    &[(40.0, -20.0), (30.0, -15.0), (20.0, -10.0)],
                ),
                ScoreRule::flat(
                    "low savings rate",
                    &[Predicate::new(SavingsRate, Below, 0.15)],
                    -10.0,
                ),
                ScoreRule::flat(
                    "thin emergency fund",
                    &[Predicate::new(EmergencyFundMonths, Below, 3.0)],
                    -10.0,
                ),
                ScoreRule::flat(
                    "low investment rate",
                    &[Predicate::new(InvestmentRate, Below, 0.2)],
                    -10.0,
                ),
                ScoreRule::tiered(
                    "weak credit",
                    CreditScore,
                    Below,
                    &[(600.0, -15.0), (700.0, -10.0)],
                ),
                ScoreRule::flat(
                    "excellent credit",
                    &[Predicate::new(CreditScore, Above, 750.0)],
                    5.0,
                ),
                ScoreRule::flat("debt-free", &[Predicate::new(Debt, Equal, 0.0)], 10.0),
                ScoreRule::flat(
                    "strong savings rate",
                    &[Predicate::new(SavingsRate, Above, 0.3)],
                    5.0,
                ),
                ScoreRule::flat(
                    "strong investment rate",
                    &[Predicate::new(InvestmentRate, Above, 0.25)],
                    5.0,
                ),
                ScoreRule::flat(
                    "early wealth",
                    &[
                        Predicate::new(Age, Below, 30.0),
                        Predicate::new(NetWorth, Above, 50_000.0),
                    ],
                    5.0,
                ),
                ScoreRule::flat(
                    "late-career shortfall",
                    &[
                        Predicate::new(Age, Above, 50.0),
                        Predicate::new(NetWorth, Below, 100_000.0),
                    ],
                    -10.0,
                ),
            ],
        }
    }
}

impl DiscreteRules {
    /// The earlier single-threshold rule set.
    pub fn legacy_flat() -> Self {
        use Comparison::{Above, Below, Equal};
        use ScoreInput::*;

        Self {
            base: 100.0,
            rules: vec![
                ScoreRule::flat(
                    "high debt-to-income",
                    &[Predicate::new(DebtToIncome, Above, 40.0)],
                    -20.0,
                ),
                ScoreRule::flat(
                    "low savings rate",
                    &[Predicate::new(SavingsRate, Below, 0.15)],
                    -10.0,
                ),
                ScoreRule::flat(
                    "thin emergency fund",
                    &[Predicate::new(EmergencyFundMonths, Below, 3.0)],
                    -5.0,
                ),
                ScoreRule::flat(
                    "low investment rate",
                    &[Predicate::new(InvestmentRate, Below, 0.2)],
                    -10.0,
                ),
                ScoreRule::flat(
                    "weak credit",
                    &[Predicate::new(CreditScore, Below, 600.0)],
                    -10.0,
                ),
                ScoreRule::flat(
                    "excellent credit",
                    &[Predicate::new(CreditScore, Above, 750.0)],
                    5.0,
                ),
                ScoreRule::flat("debt-free", &[Predicate::new(Debt, Equal, 0.0)], 10.0),
            ],
        }
    }
}

/// `weight * |value - threshold|` whenever the comparison holds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProportionalTerm {
    pub input: ScoreInput,
    pub comparison: Comparison,
    pub threshold: f64,
    pub weight: f64,
}

impl ProportionalTerm {
    const fn new(input: ScoreInput, comparison: Comparison, threshold: f64, weight: f64) -> Self {
        Self {
            input,
            comparison,
            threshold,
            weight,
        }
    }

    fn points(&self, profile: &FinancialProfile, ratios: &Ratios) -> Option<f64> {
        let value = self.input.value(profile, ratios);
        if !self.comparison.holds(value, self.threshold) {
            return None;
        }
        // Uncapped emergency coverage can be infinite.
        let distance = (value - self.threshold).abs().min(f64::MAX);
        Some(self.weight * distance)
    }
}

/// `+points` when the user is at least as good as the national average, `-points` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkAdjustment {
    pub metric: Metric,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContinuousRules {
    pub base: f64,
    pub terms: Vec<ProportionalTerm>,
    pub benchmark_adjustments: Vec<BenchmarkAdjustment>,
    pub debt_free_bonus: f64,
}

impl Default for ContinuousRules {
    fn default() -> Self {
        use Comparison::{Above, Below};
        use ScoreInput::*;

        Self {
            base: 100.0,
            terms: vec![
                ProportionalTerm::new(DebtToIncome, Above, 50.0, -0.3),
                ProportionalTerm::new(DebtToIncome, Below, 20.0, 0.1),
                ProportionalTerm::new(SavingsRate, Below, 0.15, -50.0),
                ProportionalTerm::new(SavingsRate, Above, 0.3, 20.0),
                ProportionalTerm::new(InvestmentRate, Below, 0.2, -40.0),
                ProportionalTerm::new(InvestmentRate, Above, 0.25, 20.0),
                ProportionalTerm::new(EmergencyFundMonths, Below, 3.0, -2.0),
                ProportionalTerm::new(EmergencyFundMonths, Above, 6.0, 0.5),
                ProportionalTerm::new(CreditScore, Below, 650.0, -0.1),
                ProportionalTerm::new(CreditScore, Above, 750.0, 0.05),
            ],
            benchmark_adjustments: vec![
                BenchmarkAdjustment {
                    metric: Metric::Savings,
                    points: 2.5,
                },
                BenchmarkAdjustment {
                    metric: Metric::Debt,
                    points: 2.0,
                },
                BenchmarkAdjustment {
                    metric: Metric::CreditScore,
                    points: 1.5,
                },
            ],
            debt_free_bonus: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "camelCase")]
pub enum ScoreModel {
    Discrete(DiscreteRules),
    Continuous(ContinuousRules),
}

impl Default for ScoreModel {
    fn default() -> Self {
        ScoreModel::Discrete(DiscreteRules::default())
    }
}

impl ScoreModel {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ScoreModel::Discrete(rules) => {
                if !rules.base.is_finite() {
                    return Err("discrete base score must be finite".to_string());
                }
                rules.rules.iter().try_for_each(ScoreRule::validate)
            }
            ScoreModel::Continuous(rules) => {
                let finite = rules.base.is_finite()
                    && rules.debt_free_bonus.is_finite()
                    && rules
                        .terms
                        .iter()
                        .all(|t| t.threshold.is_finite() && t.weight.is_finite())
                    && rules
                        .benchmark_adjustments
                        .iter()
                        .all(|a| a.points.is_finite());
                if finite {
                    Ok(())
                } else {
                    Err("continuous score rules must use finite numbers".to_string())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAdjustment {
    pub label: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: f64,
    pub adjustments: Vec<ScoreAdjustment>,
}

pub fn calculate_score(
    model: &ScoreModel,
    profile: &FinancialProfile,
    ratios: &Ratios,
    benchmarks: &NationalBenchmarks,
) -> ScoreCard {
    match model {
        ScoreModel::Discrete(rules) => discrete_score(rules, profile, ratios),
        ScoreModel::Continuous(rules) => continuous_score(rules, profile, ratios, benchmarks),
    }
}

fn discrete_score(rules: &DiscreteRules, profile: &FinancialProfile, ratios: &Ratios) -> ScoreCard {
    let adjustments: Vec<ScoreAdjustment> = rules
        .rules
        .iter()
        .filter_map(|rule| {
            rule.points(profile, ratios).map(|points| ScoreAdjustment {
                label: rule.label().to_string(),
                points,
            })
        })
        .collect();
    let raw = rules.base + adjustments.iter().map(|a| a.points).sum::<f64>();
    ScoreCard {
        score: raw.clamp(0.0, 100.0),
        adjustments,
    }
}

fn continuous_score(
    rules: &ContinuousRules,
    profile: &FinancialProfile,
    ratios: &Ratios,
    benchmarks: &NationalBenchmarks,
) -> ScoreCard {
    let mut adjustments = Vec::new();

    for term in &rules.terms {
        if let Some(points) = term.points(profile, ratios) {
            adjustments.push(ScoreAdjustment {
                label: term_label(term),
                points,
            });
        }
    }

    for adjustment in &rules.benchmark_adjustments {
        let Some(benchmark) = benchmarks.get(adjustment.metric) else {
            continue;
        };
        let value = adjustment.metric.value_of(profile, ratios);
        let at_least_average = if benchmark.lower_is_better {
            value <= benchmark.average
        } else {
            value >= benchmark.average
        };
        adjustments.push(ScoreAdjustment {
            label: format!("{:?} vs national average", adjustment.metric),
            points: if at_least_average {
                adjustment.points
            } else {
                -adjustment.points
            },
        });
    }

    if profile.current_debt == 0.0 && rules.debt_free_bonus != 0.0 {
        adjustments.push(ScoreAdjustment {
            label: "debt-free".to_string(),
            points: rules.debt_free_bonus,
        });
    }

    let raw = rules.base + adjustments.iter().map(|a| a.points).sum::<f64>();
    ScoreCard {
        score: ((raw * 100.0).round() / 100.0).clamp(0.0, 100.0),
        adjustments,
    }
}

fn term_label(term: &ProportionalTerm) -> String {
    let direction = match term.comparison {
        Comparison::Above => "above",
        Comparison::Below => "below",
        Comparison::Equal => "at",
    };
    format!("{:?} {direction} {}", term.input, term.threshold)
}

pub fn classify_score(score: f64, tiers: &TierThresholds) -> ScoreTier {
    if score > tiers.green_above {
        ScoreTier::Green
    } else if score > tiers.yellow_above {
        ScoreTier::Yellow
    } else {
        ScoreTier::Red
    }
}
