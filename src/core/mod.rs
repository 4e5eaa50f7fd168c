mod annuity;
mod engine;
mod inflation;
mod projection;
mod rates;
mod solver;
mod types;

pub use annuity::{perpetual_real_value, present_value_growing_annuity};
pub use engine::{UNREACHABLE_PROJECTION_AGE, resolve_rates, run_plan};
pub use inflation::{future_cost, purchasing_power, run_inflation};
pub use projection::{MAX_PROJECTION_YEARS, project, project_indexed};
pub use rates::{
    Allocation, AssetRates, AssetWeights, RateKind, blended_nominal_rate,
    real_return_from_nominal, resolve_rate,
};
pub use solver::{
    CONVERGENCE_TOLERANCE_MONTHS, LifeExpectancyInputs, LifeExpectancySolve,
    MAX_LIFE_EXPECTANCY_ITERATIONS, SolveIteration, months_to_target,
    months_to_target_life_expectancy,
};
pub use types::{
    InflationInputs, InflationReport, PlanInputs, PlanResult, ProjectionRow, RateChoice,
    RateSummary, RetirementGoal, RetirementMode, SolveDiagnostics,
};
