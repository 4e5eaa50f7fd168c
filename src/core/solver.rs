use tracing::debug;

use super::annuity::{growth_discount, present_value_growing_annuity};
use super::rates::real_return_from_nominal;

pub const MAX_LIFE_EXPECTANCY_ITERATIONS: u32 = 80;
pub const CONVERGENCE_TOLERANCE_MONTHS: f64 = 1.0;
pub const SEED_WITHDRAWAL_RATE: f64 = 0.04;
pub const SPENDING_CUT_AGE: u32 = 60;
pub const SPENDING_CUT_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy)]
pub struct LifeExpectancyInputs {
    pub principal: f64,
    pub monthly_contribution: f64,
    pub nominal_return: f64,
    pub inflation: f64,
    pub annual_spend: f64,
    pub current_age: u32,
    pub life_expectancy_age: u32,
    pub spending_cut_after_60: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SolveIteration {
    pub iteration: u32,
    pub months: f64,
    pub goal: f64,
    pub retire_age: u32,
    pub span_years: u32,
}

#[derive(Debug, Clone)]
pub struct LifeExpectancySolve {
    pub months: f64,
    /// Required nest egg in today's money.
    pub goal: f64,
    pub retire_age: Option<u32>,
    pub span_years: Option<u32>,
    pub residual: f64,
    pub converged: bool,
    pub iterations: Vec<SolveIteration>,
}

impl LifeExpectancySolve {
    pub fn iteration_count(&self) -> u32 {
        self.iterations.len() as u32
    }
}

/// Months of saving until `principal` grows to `target`, compounding
/// `annual_return / 12` monthly with contributions at each month end.
/// Returns `f64::INFINITY` when the target can never be reached.
pub fn months_to_target(
    principal: f64,
    monthly_contribution: f64,
    annual_return: f64,
    target: f64,
) -> f64 {
    if !target.is_finite() {
        return f64::INFINITY;
    }
    if monthly_contribution <= 0.0 && principal >= target {
        return 0.0;
    }

    let r = annual_return / 12.0;
    if r == 0.0 {
        if monthly_contribution <= 0.0 {
            return f64::INFINITY;
        }
        return ((target - principal) / monthly_contribution).max(0.0);
    }

    let level = monthly_contribution / r;
    let a = (target + level) / (principal + level);
    if !a.is_finite() || a <= 0.0 {
        return f64::INFINITY;
    }

    let n = a.ln() / (1.0 + r).ln();
    if n.is_nan() {
        return f64::INFINITY;
    }
    // A negative root means the balance is moving away from the target.
    if n < 0.0 && target > principal {
        return f64::INFINITY;
    }
    n.max(0.0)
}

/// Solves the circular dependency between retirement age and the nest egg
/// needed to fund spending until `life_expectancy_age`.
///
/// Accumulation runs at the real return so the goal stays in today's money.
/// Stops once successive guesses move by less than
/// [`CONVERGENCE_TOLERANCE_MONTHS`] or after
/// [`MAX_LIFE_EXPECTANCY_ITERATIONS`]; the last estimate is returned either way.
pub fn months_to_target_life_expectancy(inputs: &LifeExpectancyInputs) -> LifeExpectancySolve {
    let real_return = real_return_from_nominal(inputs.nominal_return, inputs.inflation);
    let seed_goal = inputs.annual_spend.max(0.0) / SEED_WITHDRAWAL_RATE;
    let mut months = months_to_target(
        inputs.principal,
        inputs.monthly_contribution,
        real_return,
        seed_goal,
    );

    let mut iterations = Vec::with_capacity(MAX_LIFE_EXPECTANCY_ITERATIONS as usize);
    let mut goal = seed_goal;
    let mut residual = f64::INFINITY;
    let mut converged = false;

    for iteration in 1..=MAX_LIFE_EXPECTANCY_ITERATIONS {
        let (retire_age, span_years) = retirement_window(inputs, months);
        goal = retirement_goal(inputs, retire_age, span_years);
        let next = months_to_target(
            inputs.principal,
            inputs.monthly_contribution,
            real_return,
            goal,
        );
        residual = if next == months {
            0.0
        } else {
            (next - months).abs()
        };
        months = next;
        iterations.push(SolveIteration {
            iteration,
            months,
            goal,
            retire_age,
            span_years,
        });

        if residual < CONVERGENCE_TOLERANCE_MONTHS {
            converged = true;
            break;
        }
    }

    if !converged {
        debug!(
            iterations = iterations.len(),
            residual,
            months,
            "life expectancy solve stopped without converging"
        );
    }

    if !months.is_finite() {
        return LifeExpectancySolve {
            iterations,
            ..unreachable_solve(goal)
        };
    }

    // Report the window the final goal was priced with.
    let (retire_age, span_years) = iterations
        .last()
        .map(|it| (it.retire_age, it.span_years))
        .unwrap_or_else(|| retirement_window(inputs, months));
    LifeExpectancySolve {
        months,
        goal,
        retire_age: Some(retire_age),
        span_years: Some(span_years),
        residual,
        converged,
        iterations,
    }
}

/// Whole retirement age reached after `months` of saving and the years left
/// until life expectancy. A goal that is never reached retires at life
/// expectancy with nothing left to fund.
pub fn retirement_window(inputs: &LifeExpectancyInputs, months: f64) -> (u32, u32) {
    let retire_age = if months.is_finite() {
        let years = (months / 12.0).ceil().max(0.0) as u32;
        inputs.current_age.saturating_add(years)
    } else {
        inputs.life_expectancy_age.max(inputs.current_age)
    };
    let span_years = inputs.life_expectancy_age.saturating_sub(retire_age);
    (retire_age, span_years)
}

/// Nest egg, in today's money, that funds `span_years` of inflation-growing
/// spending starting at `retire_age`.
pub fn retirement_goal(inputs: &LifeExpectancyInputs, retire_age: u32, span_years: u32) -> f64 {
    let spend = inputs.annual_spend.max(0.0);
    let nominal = inputs.nominal_return;
    let growth = inputs.inflation;
    if !inputs.spending_cut_after_60 {
        return present_value_growing_annuity(spend, nominal, growth, span_years as f64);
    }

    let full_years = SPENDING_CUT_AGE.saturating_sub(retire_age).min(span_years);
    let reduced_years = span_years - full_years;
    let full = present_value_growing_annuity(spend, nominal, growth, full_years as f64);
    let reduced = present_value_growing_annuity(spend, nominal, growth, reduced_years as f64);
    full + SPENDING_CUT_FACTOR * reduced * growth_discount(nominal, growth, full_years as f64)
}

fn unreachable_solve(goal: f64) -> LifeExpectancySolve {
    LifeExpectancySolve {
        months: f64::INFINITY,
        goal,
        retire_age: None,
        span_years: None,
        residual: f64::INFINITY,
        converged: false,
        iterations: Vec::new(),
    }
}
