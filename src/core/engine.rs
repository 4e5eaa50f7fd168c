use super::annuity::perpetual_real_value;
use super::projection::{MAX_PROJECTION_YEARS, project_indexed};
use super::rates::{AssetRates, real_return_from_nominal, resolve_rate};
use super::solver::{LifeExpectancyInputs, months_to_target, months_to_target_life_expectancy};
use super::types::{
    PlanInputs, PlanResult, RateChoice, RateSummary, RetirementGoal, RetirementMode,
    SolveDiagnostics,
};

/// Projection horizon used when the goal can never be reached.
pub const UNREACHABLE_PROJECTION_AGE: u32 = 100;

pub fn run_plan(inputs: &PlanInputs) -> PlanResult {
    let rates = resolve_rates(inputs);
    let monthly = inputs.monthly_contribution;
    let perpetual_real = perpetual_real_value(inputs.annual_spend, rates.real);

    let (goal, solve) = match inputs.mode {
        RetirementMode::WithdrawalRate { rate } => {
            let goal_real = if rate > 0.0 {
                inputs.annual_spend / rate
            } else {
                f64::INFINITY
            };
            let months = months_to_target(inputs.current_savings, monthly, rates.real, goal_real);
            let goal = RetirementGoal {
                mode: inputs.mode,
                goal_nominal: nominal_goal(goal_real, inputs.inflation, months),
                goal_real,
                months_to_goal: months,
                retire_age: retire_age(inputs.current_age, months),
                retirement_span_years: None,
                perpetual_real,
            };
            (goal, None)
        }
        RetirementMode::LifeExpectancy {
            age,
            spending_cut_after_60,
        } => {
            let solve = months_to_target_life_expectancy(&LifeExpectancyInputs {
                principal: inputs.current_savings,
                monthly_contribution: monthly,
                nominal_return: rates.nominal,
                inflation: inputs.inflation,
                annual_spend: inputs.annual_spend,
                current_age: inputs.current_age,
                life_expectancy_age: age,
                spending_cut_after_60,
            });
            let goal = RetirementGoal {
                mode: inputs.mode,
                goal_nominal: nominal_goal(solve.goal, inputs.inflation, solve.months),
                goal_real: solve.goal,
                months_to_goal: solve.months,
                retire_age: solve.retire_age,
                retirement_span_years: solve.span_years,
                perpetual_real,
            };
            let diagnostics = SolveDiagnostics {
                iterations: solve.iteration_count(),
                residual: solve.residual,
                converged: solve.converged,
            };
            (goal, Some(diagnostics))
        }
    };

    // Months are solved in today's money, so the ledger indexes the
    // contribution to inflation to follow the same path.
    let projection = project_indexed(
        inputs.current_age,
        projection_years(inputs.current_age, goal.months_to_goal),
        inputs.current_savings,
        monthly * 12.0,
        inputs.inflation,
        rates.nominal,
        inputs.inflation,
    );

    PlanResult {
        rates,
        goal,
        projection,
        solve,
    }
}

pub fn resolve_rates(inputs: &PlanInputs) -> RateSummary {
    let rates = AssetRates {
        stocks: resolve_choice(inputs.stocks_rate),
        fixed: resolve_choice(inputs.fixed_rate),
        cash: resolve_choice(inputs.cash_rate),
    };
    let nominal = inputs.allocation.blended_rate(rates);
    RateSummary {
        nominal,
        real: real_return_from_nominal(nominal, inputs.inflation),
    }
}

fn resolve_choice(choice: RateChoice) -> f64 {
    resolve_rate(choice.kind, choice.custom, choice.preset)
}

/// Goal in money of the retirement date.
fn nominal_goal(goal_real: f64, inflation: f64, months: f64) -> f64 {
    if inflation == 0.0 || !goal_real.is_finite() || !months.is_finite() {
        return goal_real;
    }
    goal_real * (1.0 + inflation).powf(months / 12.0)
}

fn retire_age(current_age: u32, months: f64) -> Option<u32> {
    if !months.is_finite() {
        return None;
    }
    let years = (months / 12.0).ceil().max(0.0) as u32;
    Some(current_age.saturating_add(years))
}

fn projection_years(current_age: u32, months: f64) -> u32 {
    if !months.is_finite() {
        return UNREACHABLE_PROJECTION_AGE.saturating_sub(current_age);
    }
    let years = (months / 12.0).ceil().max(0.0);
    if years >= MAX_PROJECTION_YEARS as f64 {
        MAX_PROJECTION_YEARS
    } else {
        years as u32
    }
}
