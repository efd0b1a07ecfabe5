use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;

use statrs::function::erf::erf;

use super::config::{Benchmark, Breakpoint, NationalBenchmarks, PercentileMethod};
use super::types::{AgeComparison, FinancialProfile, Metric, Ratios};

/// Normal-CDF percentile: `100 * Phi(z)`, rounded to two decimals and kept in [1, 100].
/// A zero standard deviation means everyone is average, so the answer is 50.
pub fn normal_percentile(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 50.0;
    }
    let z = (value - mean) / std_dev;
    let cdf = 0.5 * (1.0 + erf(z / SQRT_2));
    round2(100.0 * cdf).clamp(1.0, 100.0)
}

/// Value as a share of the average, in [0, 100]. `lower_is_better` flips the scale.
pub fn ratio_percentile(value: f64, average: f64, lower_is_better: bool) -> f64 {
    if average == 0.0 {
        return 50.0;
    }
    let share = value / average * 100.0;
    let percentile = if lower_is_better { 100.0 - share } else { share };
    percentile.clamp(0.0, 100.0)
}

/// Linear interpolation through an ascending breakpoint table. Values outside the
/// table take the nearest end's percentile.
pub fn interpolated_percentile(value: f64, table: &[Breakpoint]) -> Option<f64> {
    let first = table.first()?;
    let last = table.last()?;
    if value <= first.value {
        return Some(first.percentile);
    }
    if value >= last.value {
        return Some(last.percentile);
    }

    let upper_idx = table.iter().position(|point| point.value >= value)?;
    let lower = table[upper_idx - 1];
    let upper = table[upper_idx];
    let w = (value - lower.value) / (upper.value - lower.value);
    Some((lower.percentile + w * (upper.percentile - lower.percentile)).clamp(0.0, 100.0))
}

pub fn benchmark_percentile(value: f64, benchmark: &Benchmark, method: PercentileMethod) -> f64 {
    match method {
        PercentileMethod::NormalCdf => {
            normal_percentile(value, benchmark.average, benchmark.std_dev)
        }
        PercentileMethod::Ratio => {
            ratio_percentile(value, benchmark.average, benchmark.lower_is_better)
        }
        PercentileMethod::Piecewise => interpolated_percentile(value, &benchmark.breakpoints)
            .unwrap_or_else(|| normal_percentile(value, benchmark.average, benchmark.std_dev)),
    }
}

/// Percentile of every benchmarked metric. Metrics without a benchmark are left out.
pub fn metric_percentiles(
    profile: &FinancialProfile,
    ratios: &Ratios,
    benchmarks: &NationalBenchmarks,
    method: PercentileMethod,
) -> BTreeMap<Metric, f64> {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let benchmark = benchmarks.get(metric)?;
            let value = metric.value_of(profile, ratios);
            Some((metric, benchmark_percentile(value, benchmark, method)))
        })
        .collect()
}

/// Bracket key closest to `age`; ties go to the younger bracket.
pub fn nearest_age_bracket(age: u32, brackets: &BTreeMap<u32, f64>) -> Option<(u32, f64)> {
    brackets
        .iter()
        .min_by_key(|(bracket, _)| bracket.abs_diff(age))
        .map(|(bracket, net_worth)| (*bracket, *net_worth))
}

/// Net worth against the nearest age bracket, using the global net worth spread.
pub fn age_group_comparison(
    age: u32,
    net_worth: f64,
    benchmarks: &NationalBenchmarks,
) -> Option<AgeComparison> {
    let (bracket_age, bracket_net_worth) =
        nearest_age_bracket(age, &benchmarks.net_worth_by_age)?;
    let std_dev = benchmarks
        .get(Metric::NetWorth)
        .map(|benchmark| benchmark.std_dev)
        .unwrap_or(0.0);
    Some(AgeComparison {
        bracket_age,
        bracket_net_worth,
        percentile: normal_percentile(net_worth, bracket_net_worth, std_dev),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn income_table() -> Vec<Breakpoint> {
        vec![
            Breakpoint::new(20_000.0, 30.0),
            Breakpoint::new(100_000.0, 70.0),
            Breakpoint::new(250_000.0, 95.0),
        ]
    }

    #[test]
    fn mean_value_sits_at_fiftieth_percentile() {
        assert_approx(normal_percentile(5_000.0, 5_000.0, 2_000.0), 50.0);
    }

    #[test]
    fn higher_values_rank_higher() {
        assert_approx(normal_percentile(750.0, 710.0, 40.0), 84.13);
        assert_approx(normal_percentile(670.0, 710.0, 40.0), 15.87);
    }

    #[test]
    fn normal_percentile_floors_at_one() {
        assert_eq!(normal_percentile(0.0, 100_000.0, 1_000.0), 1.0);
        assert_eq!(normal_percentile(1e9, 100.0, 1.0), 100.0);
    }

    #[test]
    fn infinite_value_ranks_at_top() {
        assert_eq!(normal_percentile(f64::INFINITY, 3.0, 2.0), 100.0);
    }

    #[test]
    fn ratio_method_scales_and_inverts() {
        assert_approx(ratio_percentile(2_500.0, 5_000.0, false), 50.0);
        assert_approx(ratio_percentile(10_000.0, 5_000.0, false), 100.0);
        assert_approx(ratio_percentile(5_000.0, 20_000.0, true), 75.0);
        assert_approx(ratio_percentile(40_000.0, 20_000.0, true), 0.0);
        assert_approx(ratio_percentile(1.0, 0.0, false), 50.0);
    }

    #[test]
    fn interpolation_between_breakpoints() {
        let table = income_table();
        assert_approx(interpolated_percentile(60_000.0, &table).unwrap(), 50.0);
        assert_approx(interpolated_percentile(175_000.0, &table).unwrap(), 82.5);
        assert_approx(interpolated_percentile(100_000.0, &table).unwrap(), 70.0);
    }

    #[test]
    fn interpolation_clamps_to_table_ends() {
        let table = income_table();
        assert_approx(interpolated_percentile(5_000.0, &table).unwrap(), 30.0);
        assert_approx(interpolated_percentile(1e7, &table).unwrap(), 95.0);
        assert!(interpolated_percentile(1.0, &[]).is_none());
    }

    #[test]
    fn piecewise_without_table_falls_back_to_normal_cdf() {
        let benchmark = Benchmark::new(40_000.0, 30_000.0);
        assert_approx(
            benchmark_percentile(40_000.0, &benchmark, PercentileMethod::Piecewise),
            50.0,
        );
    }

    #[test]
    fn nearest_bracket_prefers_younger_on_tie() {
        let brackets = NationalBenchmarks::default().net_worth_by_age;
        assert_eq!(nearest_age_bracket(35, &brackets), Some((30, 35_000.0)));
        assert_eq!(nearest_age_bracket(37, &brackets), Some((40, 80_000.0)));
        assert_eq!(nearest_age_bracket(5, &brackets), Some((20, 5_000.0)));
        assert_eq!(nearest_age_bracket(90, &brackets), Some((60, 250_000.0)));
        assert_eq!(nearest_age_bracket(30, &BTreeMap::new()), None);
    }

    #[test]
    fn age_comparison_uses_bracket_mean_and_global_spread() {
        let benchmarks = NationalBenchmarks::default();
        let comparison = age_group_comparison(41, 130_000.0, &benchmarks).expect("bracket");
        assert_eq!(comparison.bracket_age, 40);
        assert_approx(comparison.bracket_net_worth, 80_000.0);
        // z = (130k - 80k) / 50k = 1
        assert_approx(comparison.percentile, 84.13);
    }

    #[test]
    fn metric_percentiles_cover_every_benchmark() {
        let benchmarks = NationalBenchmarks::default();
        let profile = crate::core::ratios::tests::sample_profile();
        let ratios = crate::core::ratios::calculate_ratios(&profile, Some(12.0));
        let percentiles =
            metric_percentiles(&profile, &ratios, &benchmarks, PercentileMethod::NormalCdf);

        assert_eq!(percentiles.len(), Metric::ALL.len());
        assert_approx(percentiles[&Metric::Income], 50.0);
        assert_approx(percentiles[&Metric::Savings], 50.0);
        assert_approx(percentiles[&Metric::Investments], 50.0);
    }

    proptest! {
        #[test]
        fn prop_zero_std_dev_is_always_fifty(value in -1e9f64..1e9, mean in -1e9f64..1e9) {
            prop_assert_eq!(normal_percentile(value, mean, 0.0), 50.0);
        }

        #[test]
        fn prop_normal_percentile_in_one_to_hundred(
            value in -1e9f64..1e9,
            mean in -1e9f64..1e9,
            std_dev in 1e-6f64..1e9
        ) {
            let p = normal_percentile(value, mean, std_dev);
            prop_assert!((1.0..=100.0).contains(&p));
        }

        #[test]
        fn prop_ratio_percentile_in_zero_to_hundred(
            value in 0f64..1e9,
            average in -1e9f64..1e9,
            lower_is_better in proptest::bool::ANY
        ) {
            let p = ratio_percentile(value, average, lower_is_better);
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn prop_interpolated_percentile_stays_within_table(value in -1e7f64..1e7) {
            let p = interpolated_percentile(value, &income_table()).unwrap();
            prop_assert!((30.0..=95.0).contains(&p));
        }
    }
}
