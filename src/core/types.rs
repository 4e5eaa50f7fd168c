use serde::Serialize;

use super::rates::{Allocation, RateKind};

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RetirementMode {
    /// Goal is `annual_spend / rate`, a perpetual withdrawal at `rate`.
    WithdrawalRate { rate: f64 },
    /// Goal is the growing-annuity value of spending until `age`.
    #[serde(rename_all = "camelCase")]
    LifeExpectancy {
        age: u32,
        spending_cut_after_60: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RateChoice {
    pub kind: RateKind,
    pub custom: f64,
    pub preset: f64,
}

#[derive(Debug, Clone)]
pub struct PlanInputs {
    pub current_age: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub allocation: Allocation,
    pub stocks_rate: RateChoice,
    pub fixed_rate: RateChoice,
    pub cash_rate: RateChoice,
    pub inflation: f64,
    pub annual_spend: f64,
    pub mode: RetirementMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub year_index: u32,
    pub age: u32,
    pub balance_start: f64,
    pub contribution: f64,
    pub interest: f64,
    pub balance_end_nominal: f64,
    pub balance_end_real: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSummary {
    pub nominal: f64,
    pub real: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementGoal {
    pub mode: RetirementMode,
    pub goal_nominal: f64,
    pub goal_real: f64,
    pub months_to_goal: f64,
    pub retire_age: Option<u32>,
    pub retirement_span_years: Option<u32>,
    /// Nest egg that funds the spending forever at the real return.
    pub perpetual_real: f64,
}

impl RetirementGoal {
    pub fn is_reachable(&self) -> bool {
        self.months_to_goal.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveDiagnostics {
    pub iterations: u32,
    pub residual: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub rates: RateSummary,
    pub goal: RetirementGoal,
    pub projection: Vec<ProjectionRow>,
    pub solve: Option<SolveDiagnostics>,
}

#[derive(Debug, Clone, Copy)]
pub struct InflationInputs {
    pub start_age: u32,
    pub amount: f64,
    pub monthly_deposit: f64,
    pub savings_rate: f64,
    pub inflation: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationReport {
    pub years: u32,
    pub cumulative_inflation: f64,
    pub future_cost: f64,
    pub purchasing_power: f64,
    pub real_savings_rate: f64,
    pub beats_inflation: bool,
    pub savings: Vec<ProjectionRow>,
}
