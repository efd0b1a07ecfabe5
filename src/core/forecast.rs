use std::collections::BTreeMap;

use super::config::ForecastAssumptions;
use super::ratios::emergency_fund_months;
use super::types::{FinancialProfile, ForecastPoint};

const MAX_CREDIT_SCORE: u32 = 850;

/// Projects the profile `years` ahead under constant growth assumptions.
///
/// Income and investments compound, debt decays geometrically, and savings grow
/// linearly by a fixed share of today's net income. Each horizon is computed
/// independently from the current snapshot. Projected emergency coverage is not capped.
pub fn forecast(
    profile: &FinancialProfile,
    net_income: f64,
    assumptions: &ForecastAssumptions,
    years: u32,
) -> ForecastPoint {
    let t = years as f64;
    let compound = |rate: f64| (1.0 + rate).powf(t);

    let income = profile.monthly_income * compound(assumptions.income_growth_rate);
    let savings =
        profile.total_savings + net_income * assumptions.savings_contribution_rate * 12.0 * t;
    let investments = profile.total_investments * compound(assumptions.investment_growth_rate);
    let debt = profile.current_debt * compound(-assumptions.debt_reduction_rate);
    let credit_score = profile
        .credit_score
        .saturating_add(assumptions.credit_score_improvement_per_year.saturating_mul(years))
        .min(MAX_CREDIT_SCORE);

    ForecastPoint {
        years,
        income,
        savings,
        investments,
        debt,
        credit_score,
        net_worth: savings + investments - debt,
        emergency_fund_months: emergency_fund_months(savings, profile.monthly_expenses, None),
    }
}

pub fn forecast_horizons(
    profile: &FinancialProfile,
    net_income: f64,
    assumptions: &ForecastAssumptions,
) -> BTreeMap<u32, ForecastPoint> {
    assumptions
        .horizons
        .iter()
        .map(|&years| (years, forecast(profile, net_income, assumptions, years)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ratios::tests::sample_profile;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn ten_year_projection_matches_closed_form() {
        let mut profile = sample_profile();
        profile.current_debt = 10_000.0;
        let assumptions = ForecastAssumptions::default();
        let point = forecast(&profile, 3_850.0, &assumptions, 10);

        assert_eq!(point.years, 10);
        assert_approx(point.income, 5_000.0 * 1.03f64.powi(10));
        assert_approx(point.savings, 25_000.0 + 3_850.0 * 0.15 * 12.0 * 10.0);
        assert_approx(point.investments, 40_000.0 * 1.06f64.powi(10));
        assert_approx(point.debt, 10_000.0 * 0.95f64.powi(10));
        assert_eq!(point.credit_score, 770);
        assert_approx(
            point.net_worth,
            point.savings + point.investments - point.debt,
        );
        assert_approx(point.emergency_fund_months, point.savings / (3_500.0 / 12.0));
    }

    #[test]
    fn credit_score_caps_at_850() {
        let mut profile = sample_profile();
        profile.credit_score = 840;
        let point = forecast(&profile, 3_850.0, &ForecastAssumptions::default(), 10);
        assert_eq!(point.credit_score, 850);
    }

    #[test]
    fn negative_net_income_drains_savings() {
        let point = forecast(
            &sample_profile(),
            -1_000.0,
            &ForecastAssumptions::default(),
            2,
        );
        assert_approx(point.savings, 25_000.0 - 1_000.0 * 0.15 * 12.0 * 2.0);
    }

    #[test]
    fn zero_expenses_projection_is_unbounded() {
        let mut profile = sample_profile();
        profile.monthly_expenses = 0.0;
        let point = forecast(&profile, 3_850.0, &ForecastAssumptions::default(), 5);
        assert_eq!(point.emergency_fund_months, f64::INFINITY);
    }

    #[test]
    fn horizons_come_from_assumptions() {
        let assumptions = ForecastAssumptions {
            horizons: vec![1, 3, 30],
            ..ForecastAssumptions::default()
        };
        let points = forecast_horizons(&sample_profile(), 3_850.0, &assumptions);
        assert_eq!(points.keys().copied().collect::<Vec<_>>(), vec![1, 3, 30]);
        assert_eq!(points[&3].years, 3);
    }

    proptest! {
        #[test]
        fn prop_year_zero_is_current_snapshot(
            income in 0u32..100_000,
            savings in 0u32..5_000_000,
            investments in 0u32..5_000_000,
            debt in 0u32..5_000_000,
            credit in 300u32..851,
            net_income in -50_000i32..100_000
        ) {
            let mut profile = sample_profile();
            profile.monthly_income = income as f64;
            profile.total_savings = savings as f64;
            profile.total_investments = investments as f64;
            profile.current_debt = debt as f64;
            profile.credit_score = credit;

            let point = forecast(&profile, net_income as f64, &ForecastAssumptions::default(), 0);
            prop_assert_eq!(point.income, profile.monthly_income);
            prop_assert_eq!(point.savings, profile.total_savings);
            prop_assert_eq!(point.investments, profile.total_investments);
            prop_assert_eq!(point.debt, profile.current_debt);
            prop_assert_eq!(point.credit_score, credit);
        }

        #[test]
        fn prop_forecast_is_idempotent(years in 0u32..60, net_income in -10_000i32..50_000) {
            let profile = sample_profile();
            let assumptions = ForecastAssumptions::default();
            let a = forecast(&profile, net_income as f64, &assumptions, years);
            let b = forecast(&profile, net_income as f64, &assumptions, years);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_debt_never_grows(years in 0u32..80, debt in 0u32..1_000_000) {
            let mut profile = sample_profile();
            profile.current_debt = debt as f64;
            let point = forecast(&profile, 0.0, &ForecastAssumptions::default(), years);
            prop_assert!(point.debt <= profile.current_debt);
        }
    }
}
