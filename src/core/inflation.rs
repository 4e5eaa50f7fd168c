use super::projection::project;
use super::rates::real_return_from_nominal;
use super::types::{InflationInputs, InflationReport};

/// Price of `amount` of today's goods after `years` of inflation.
pub fn future_cost(amount: f64, inflation: f64, years: u32) -> f64 {
    amount * cumulative_factor(inflation, years)
}

/// What `amount` held as cash buys in today's money after `years`.
pub fn purchasing_power(amount: f64, inflation: f64, years: u32) -> f64 {
    amount / cumulative_factor(inflation, years)
}

fn cumulative_factor(inflation: f64, years: u32) -> f64 {
    if inflation == 0.0 {
        return 1.0;
    }
    (1.0 + inflation).powi(years as i32)
}

pub fn run_inflation(inputs: &InflationInputs) -> InflationReport {
    let factor = cumulative_factor(inputs.inflation, inputs.years);
    let real_savings_rate = real_return_from_nominal(inputs.savings_rate, inputs.inflation);
    let savings = project(
        inputs.start_age,
        inputs.years,
        inputs.amount,
        inputs.monthly_deposit * 12.0,
        inputs.savings_rate,
        inputs.inflation,
    );

    InflationReport {
        years: inputs.years,
        cumulative_inflation: factor - 1.0,
        future_cost: future_cost(inputs.amount, inputs.inflation, inputs.years),
        purchasing_power: purchasing_power(inputs.amount, inputs.inflation, inputs.years),
        real_savings_rate,
        beats_inflation: real_savings_rate > 0.0,
        savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> InflationInputs {
        InflationInputs {
            start_age: 35,
            amount: 10_000.0,
            monthly_deposit: 100.0,
            savings_rate: 0.03,
            inflation: 0.05,
            years: 10,
        }
    }

    #[test]
    fn future_cost_and_purchasing_power_are_inverse() {
        let cost = future_cost(1_000.0, 0.04, 12);
        assert_close(purchasing_power(cost, 0.04, 12), 1_000.0, 1e-9);
        assert_close(cost, 1_000.0 * 1.04_f64.powi(12), 1e-9);
    }

    #[test]
    fn zero_inflation_changes_nothing() {
        assert_eq!(future_cost(1_234.5, 0.0, 30), 1_234.5);
        assert_eq!(purchasing_power(1_234.5, 0.0, 30), 1_234.5);
    }

    #[test]
    fn low_savings_rate_loses_to_inflation() {
        let report = run_inflation(&sample_inputs());
        assert!(!report.beats_inflation);
        assert!(report.real_savings_rate < 0.0);
        assert_close(report.cumulative_inflation, 1.05_f64.powi(10) - 1.0, 1e-12);
        assert_close(report.purchasing_power, 10_000.0 / 1.05_f64.powi(10), 1e-9);
        assert!(report.future_cost > 16_000.0);
    }

    #[test]
    fn savings_ledger_covers_every_year() {
        let report = run_inflation(&sample_inputs());
        assert_eq!(report.savings.len(), 11);
        let last = report.savings.last().expect("ledger has rows");
        assert_eq!(last.age, 45);
        assert_close(last.contribution, 1_200.0, 1e-9);
        assert!(last.balance_end_real < last.balance_end_nominal);
    }

    #[test]
    fn high_savings_rate_beats_inflation() {
        let mut inputs = sample_inputs();
        inputs.savings_rate = 0.08;
        let report = run_inflation(&inputs);
        assert!(report.beats_inflation);
    }
}
