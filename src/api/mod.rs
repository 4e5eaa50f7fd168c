mod error;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub use error::InputError;
use error::ensure_finite;

use crate::core::{
    Allocation, InflationInputs, InflationReport, MAX_PROJECTION_YEARS, PlanInputs, PlanResult,
    ProjectionRow, RateChoice, RateKind, RateSummary, RetirementGoal, RetirementMode,
    SolveDiagnostics, run_inflation, run_plan,
};

pub const DEFAULT_PORT: u16 = 8080;
pub const MAX_AGE: u32 = 120;

const STOCKS_PRESET_PCT: f64 = 7.0;
const FIXED_PRESET_PCT: f64 = 4.0;
const CASH_PRESET_PCT: f64 = 0.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRateKind {
    #[value(name = "none")]
    Off,
    Custom,
    Preset,
}

impl From<CliRateKind> for RateKind {
    fn from(value: CliRateKind) -> Self {
        match value {
            CliRateKind::Off => RateKind::None,
            CliRateKind::Custom => RateKind::Custom,
            CliRateKind::Preset => RateKind::Preset,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRetirementMode {
    WithdrawalRate,
    LifeExpectancy,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRateKind {
    #[serde(rename = "none", alias = "off")]
    Off,
    Custom,
    Preset,
}

impl From<ApiRateKind> for CliRateKind {
    fn from(value: ApiRateKind) -> Self {
        match value {
            ApiRateKind::Off => CliRateKind::Off,
            ApiRateKind::Custom => CliRateKind::Custom,
            ApiRateKind::Preset => CliRateKind::Preset,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRetirementMode {
    #[serde(alias = "withdrawalRate", alias = "withdrawal_rate", alias = "withdrawal")]
    WithdrawalRate,
    #[serde(alias = "lifeExpectancy", alias = "life_expectancy", alias = "life")]
    LifeExpectancy,
}

impl From<ApiRetirementMode> for CliRetirementMode {
    fn from(value: ApiRetirementMode) -> Self {
        match value {
            ApiRetirementMode::WithdrawalRate => CliRetirementMode::WithdrawalRate,
            ApiRetirementMode::LifeExpectancy => CliRetirementMode::LifeExpectancy,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiSlider {
    Stocks,
    Fixed,
    Cash,
}

#[derive(Parser, Debug)]
#[command(
    name = "fire-calc",
    about = "FIRE retirement and inflation calculator (closed-form projections)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Print a retirement plan as JSON.
    Plan(PlanArgs),
    /// Print an inflation and savings-growth report as JSON.
    Inflation(InflationArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 20_000.0)]
    current_savings: f64,
    #[arg(
        long,
        default_value_t = 250.0,
        help = "Monthly saving in today's money, raised with inflation each year"
    )]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 30_000.0,
        help = "Desired annual spending in today's money"
    )]
    annual_spend: f64,
    #[arg(long, default_value_t = 70.0, help = "Stocks allocation in percent")]
    stocks_pct: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Fixed income allocation in percent; cash holds the rest"
    )]
    fixed_pct: f64,
    #[arg(long, value_enum, default_value_t = CliRateKind::Preset)]
    stocks_rate_kind: CliRateKind,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Custom stocks return in percent"
    )]
    stocks_rate: f64,
    #[arg(long, value_enum, default_value_t = CliRateKind::Preset)]
    fixed_rate_kind: CliRateKind,
    #[arg(long, default_value_t = 4.0, help = "Custom fixed income return in percent")]
    fixed_rate: f64,
    #[arg(long, value_enum, default_value_t = CliRateKind::Off)]
    cash_rate_kind: CliRateKind,
    #[arg(long, default_value_t = 0.0, help = "Custom cash return in percent")]
    cash_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual inflation in percent")]
    inflation: f64,
    #[arg(long, value_enum, default_value_t = CliRetirementMode::WithdrawalRate)]
    mode: CliRetirementMode,
    #[arg(long, default_value_t = 4.0, help = "Safe withdrawal rate in percent")]
    withdrawal_rate: f64,
    #[arg(long, default_value_t = 90)]
    life_expectancy: u32,
    #[arg(long, help = "Spend 20% less from age 60 (life-expectancy mode)")]
    spending_cut_after_60: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InflationArgs {
    #[arg(long, default_value_t = 30)]
    start_age: u32,
    #[arg(long, default_value_t = 10_000.0)]
    amount: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_deposit: f64,
    #[arg(long, default_value_t = 3.0, help = "Savings return in percent")]
    savings_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
    inflation: f64,
    #[arg(long, default_value_t = 10)]
    years: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    current_age: Option<u32>,
    current_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_spend: Option<f64>,

    stocks_pct: Option<f64>,
    fixed_pct: Option<f64>,

    stocks_rate_kind: Option<ApiRateKind>,
    stocks_rate: Option<f64>,
    fixed_rate_kind: Option<ApiRateKind>,
    fixed_rate: Option<f64>,
    cash_rate_kind: Option<ApiRateKind>,
    cash_rate: Option<f64>,
    inflation: Option<f64>,

    mode: Option<ApiRetirementMode>,
    withdrawal_rate: Option<f64>,
    life_expectancy: Option<u32>,
    #[serde(alias = "spendingCut")]
    spending_cut_after_60: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InflationPayload {
    start_age: Option<u32>,
    amount: Option<f64>,
    monthly_deposit: Option<f64>,
    savings_rate: Option<f64>,
    inflation: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AllocationPayload {
    stocks_pct: Option<f64>,
    fixed_pct: Option<f64>,
    adjust: Option<ApiSlider>,
    value: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationView {
    pub stocks_pct: f64,
    pub fixed_pct: f64,
    pub cash_pct: f64,
}

impl From<Allocation> for AllocationView {
    fn from(value: Allocation) -> Self {
        Self {
            stocks_pct: value.stocks_pct(),
            fixed_pct: value.fixed_pct(),
            cash_pct: value.cash_pct(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub allocation: AllocationView,
    pub rates: RateSummary,
    pub goal: RetirementGoal,
    pub solve: Option<SolveDiagnostics>,
    pub projection: Vec<ProjectionRow>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_inputs(args: PlanArgs) -> Result<PlanInputs, InputError> {
    if args.current_age > MAX_AGE {
        return Err(InputError::out_of_range(
            "--current-age",
            format!("must be <= {MAX_AGE}"),
        ));
    }

    let current_savings = ensure_finite("--current-savings", args.current_savings)?;
    if current_savings < 0.0 {
        return Err(InputError::out_of_range("--current-savings", "must be >= 0"));
    }

    let monthly_contribution = ensure_finite("--monthly-contribution", args.monthly_contribution)?;
    if monthly_contribution < 0.0 {
        return Err(InputError::out_of_range(
            "--monthly-contribution",
            "must be >= 0",
        ));
    }

    let annual_spend = ensure_finite("--annual-spend", args.annual_spend)?;
    if annual_spend <= 0.0 {
        return Err(InputError::out_of_range("--annual-spend", "must be > 0"));
    }

    let stocks_pct = ensure_finite("--stocks-pct", args.stocks_pct)?;
    if !(0.0..=100.0).contains(&stocks_pct) {
        return Err(InputError::out_of_range(
            "--stocks-pct",
            "must be between 0 and 100",
        ));
    }
    let fixed_pct = ensure_finite("--fixed-pct", args.fixed_pct)?;
    if !(0.0..=100.0).contains(&fixed_pct) {
        return Err(InputError::out_of_range(
            "--fixed-pct",
            "must be between 0 and 100",
        ));
    }
    if stocks_pct + fixed_pct > 100.0 + 1e-9 {
        return Err(InputError::out_of_range(
            "--fixed-pct",
            "plus --stocks-pct must not exceed 100",
        ));
    }

    let stocks_rate = rate_choice(
        "--stocks-rate",
        args.stocks_rate_kind,
        args.stocks_rate,
        STOCKS_PRESET_PCT,
    )?;
    let fixed_rate = rate_choice(
        "--fixed-rate",
        args.fixed_rate_kind,
        args.fixed_rate,
        FIXED_PRESET_PCT,
    )?;
    let cash_rate = rate_choice(
        "--cash-rate",
        args.cash_rate_kind,
        args.cash_rate,
        CASH_PRESET_PCT,
    )?;

    let inflation = ensure_finite("--inflation", args.inflation)?;
    if inflation <= -100.0 {
        return Err(InputError::out_of_range("--inflation", "must be > -100"));
    }

    let mode = match args.mode {
        CliRetirementMode::WithdrawalRate => {
            let rate = ensure_finite("--withdrawal-rate", args.withdrawal_rate)?;
            if rate <= 0.0 || rate > 100.0 {
                return Err(InputError::out_of_range(
                    "--withdrawal-rate",
                    "must be > 0 and <= 100",
                ));
            }
            RetirementMode::WithdrawalRate { rate: rate / 100.0 }
        }
        CliRetirementMode::LifeExpectancy => {
            if args.life_expectancy <= args.current_age {
                return Err(InputError::out_of_range(
                    "--life-expectancy",
                    "must be > --current-age",
                ));
            }
            if args.life_expectancy > MAX_AGE {
                return Err(InputError::out_of_range(
                    "--life-expectancy",
                    format!("must be <= {MAX_AGE}"),
                ));
            }
            RetirementMode::LifeExpectancy {
                age: args.life_expectancy,
                spending_cut_after_60: args.spending_cut_after_60,
            }
        }
    };

    Ok(PlanInputs {
        current_age: args.current_age,
        current_savings,
        monthly_contribution,
        allocation: Allocation::new(stocks_pct, fixed_pct),
        stocks_rate,
        fixed_rate,
        cash_rate,
        inflation: inflation / 100.0,
        annual_spend,
        mode,
    })
}

fn rate_choice(
    flag: &'static str,
    kind: CliRateKind,
    custom_pct: f64,
    preset_pct: f64,
) -> Result<RateChoice, InputError> {
    let custom_pct = ensure_finite(flag, custom_pct)?;
    if kind == CliRateKind::Custom && custom_pct <= -100.0 {
        return Err(InputError::out_of_range(flag, "must be > -100"));
    }
    Ok(RateChoice {
        kind: kind.into(),
        custom: custom_pct / 100.0,
        preset: preset_pct / 100.0,
    })
}

pub fn build_inflation_inputs(args: InflationArgs) -> Result<InflationInputs, InputError> {
    if args.start_age > MAX_AGE {
        return Err(InputError::out_of_range(
            "--start-age",
            format!("must be <= {MAX_AGE}"),
        ));
    }
    let amount = ensure_finite("--amount", args.amount)?;
    if amount < 0.0 {
        return Err(InputError::out_of_range("--amount", "must be >= 0"));
    }
    let monthly_deposit = ensure_finite("--monthly-deposit", args.monthly_deposit)?;
    if monthly_deposit < 0.0 {
        return Err(InputError::out_of_range("--monthly-deposit", "must be >= 0"));
    }
    let savings_rate = ensure_finite("--savings-rate", args.savings_rate)?;
    if savings_rate <= -100.0 {
        return Err(InputError::out_of_range("--savings-rate", "must be > -100"));
    }
    let inflation = ensure_finite("--inflation", args.inflation)?;
    if inflation <= -100.0 {
        return Err(InputError::out_of_range("--inflation", "must be > -100"));
    }
    if args.years > MAX_PROJECTION_YEARS {
        return Err(InputError::out_of_range(
            "--years",
            format!("must be <= {MAX_PROJECTION_YEARS}"),
        ));
    }

    Ok(InflationInputs {
        start_age: args.start_age,
        amount,
        monthly_deposit,
        savings_rate: savings_rate / 100.0,
        inflation: inflation / 100.0,
        years: args.years,
    })
}

pub fn plan_command(args: PlanArgs) -> Result<PlanResponse, InputError> {
    let inputs = build_inputs(args)?;
    let result = run_plan(&inputs);
    Ok(build_plan_response(&inputs, result))
}

pub fn inflation_command(args: InflationArgs) -> Result<InflationReport, InputError> {
    let inputs = build_inflation_inputs(args)?;
    Ok(run_inflation(&inputs))
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route(
            "/api/inflation",
            get(inflation_get_handler).post(inflation_post_handler),
        )
        .route(
            "/api/allocation",
            get(allocation_get_handler).post(allocation_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE calculator API listening");
    info!("Local access: http://127.0.0.1:{}/api/plan", addr.port());

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(query: Result<Query<PlanPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => plan_response(payload),
        Err(rejection) => payload_error(rejection.body_text()),
    }
}

async fn plan_post_handler(body: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => plan_response(payload),
        Err(rejection) => payload_error(rejection.body_text()),
    }
}

async fn inflation_get_handler(query: Result<Query<InflationPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => inflation_response(payload),
        Err(rejection) => payload_error(rejection.body_text()),
    }
}

async fn inflation_post_handler(body: Result<Json<InflationPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => inflation_response(payload),
        Err(rejection) => payload_error(rejection.body_text()),
    }
}

async fn allocation_get_handler(query: Result<Query<AllocationPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => allocation_response(payload),
        Err(rejection) => payload_error(rejection.body_text()),
    }
}

async fn allocation_post_handler(body: Result<Json<AllocationPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => allocation_response(payload),
        Err(rejection) => payload_error(rejection.body_text()),
    }
}

/// Malformed bodies and query strings get the same JSON error shape as
/// rejected values.
fn payload_error(detail: String) -> Response {
    let err = InputError::Payload(detail);
    debug!(%err, "rejected request payload");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn plan_response(payload: PlanPayload) -> Response {
    let inputs = match plan_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    let result = run_plan(&inputs);
    debug!(
        nominal = result.rates.nominal,
        real = result.rates.real,
        months = result.goal.months_to_goal,
        retire_age = ?result.goal.retire_age,
        "plan computed"
    );
    json_response(StatusCode::OK, build_plan_response(&inputs, result))
}

fn inflation_response(payload: InflationPayload) -> Response {
    match inflation_inputs_from_payload(payload) {
        Ok(inputs) => json_response(StatusCode::OK, run_inflation(&inputs)),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

fn allocation_response(payload: AllocationPayload) -> Response {
    let defaults = Allocation::default();
    let stocks = sanitize("stocksPct", payload.stocks_pct, defaults.stocks_pct());
    let fixed = sanitize("fixedPct", payload.fixed_pct, defaults.fixed_pct());
    let mut allocation = Allocation::new(stocks, fixed);

    if let Some(slider) = payload.adjust {
        let Some(value) = payload.value.filter(|v| v.is_finite()) else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "value must be a finite number when adjust is set",
            );
        };
        match slider {
            ApiSlider::Stocks => allocation.set_stocks(value),
            ApiSlider::Fixed => allocation.set_fixed(value),
            ApiSlider::Cash => allocation.set_cash(value),
        }
    }

    json_response(StatusCode::OK, AllocationView::from(allocation))
}

fn build_plan_response(inputs: &PlanInputs, result: PlanResult) -> PlanResponse {
    PlanResponse {
        allocation: inputs.allocation.into(),
        rates: result.rates,
        goal: result.goal,
        solve: result.solve,
        projection: result.projection,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

/// Non-finite numbers from a malformed field fall back to the default.
fn sanitize(field: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        Some(v) => {
            warn!(field, value = %v, default, "ignoring non-finite input");
            default
        }
        None => default,
    }
}

#[cfg(test)]
fn plan_inputs_from_json(json: &str) -> Result<PlanInputs, InputError> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| InputError::Payload(e.to_string()))?;
    plan_inputs_from_payload(payload)
}

fn plan_inputs_from_payload(payload: PlanPayload) -> Result<PlanInputs, InputError> {
    let mut args = default_plan_args();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    args.current_savings = sanitize("currentSavings", payload.current_savings, args.current_savings);
    args.monthly_contribution = sanitize(
        "monthlyContribution",
        payload.monthly_contribution,
        args.monthly_contribution,
    );
    args.annual_spend = sanitize("annualSpend", payload.annual_spend, args.annual_spend);

    args.stocks_pct = sanitize("stocksPct", payload.stocks_pct, args.stocks_pct);
    args.fixed_pct = sanitize("fixedPct", payload.fixed_pct, args.fixed_pct);

    if let Some(v) = payload.stocks_rate_kind {
        args.stocks_rate_kind = v.into();
    }
    args.stocks_rate = sanitize("stocksRate", payload.stocks_rate, args.stocks_rate);
    if let Some(v) = payload.fixed_rate_kind {
        args.fixed_rate_kind = v.into();
    }
    args.fixed_rate = sanitize("fixedRate", payload.fixed_rate, args.fixed_rate);
    if let Some(v) = payload.cash_rate_kind {
        args.cash_rate_kind = v.into();
    }
    args.cash_rate = sanitize("cashRate", payload.cash_rate, args.cash_rate);
    args.inflation = sanitize("inflation", payload.inflation, args.inflation);

    if let Some(v) = payload.mode {
        args.mode = v.into();
    }
    args.withdrawal_rate = sanitize("withdrawalRate", payload.withdrawal_rate, args.withdrawal_rate);
    if let Some(v) = payload.life_expectancy {
        args.life_expectancy = v;
    }
    if let Some(v) = payload.spending_cut_after_60 {
        args.spending_cut_after_60 = v;
    }

    build_inputs(args)
}

fn inflation_inputs_from_payload(payload: InflationPayload) -> Result<InflationInputs, InputError> {
    let mut args = default_inflation_args();

    if let Some(v) = payload.start_age {
        args.start_age = v;
    }
    args.amount = sanitize("amount", payload.amount, args.amount);
    args.monthly_deposit = sanitize("monthlyDeposit", payload.monthly_deposit, args.monthly_deposit);
    args.savings_rate = sanitize("savingsRate", payload.savings_rate, args.savings_rate);
    args.inflation = sanitize("inflation", payload.inflation, args.inflation);
    if let Some(v) = payload.years {
        args.years = v;
    }

    build_inflation_inputs(args)
}

fn default_plan_args() -> PlanArgs {
    PlanArgs {
        current_age: 30,
        current_savings: 20_000.0,
        monthly_contribution: 250.0,
        annual_spend: 30_000.0,
        stocks_pct: 70.0,
        fixed_pct: 20.0,
        stocks_rate_kind: CliRateKind::Preset,
        stocks_rate: 7.0,
        fixed_rate_kind: CliRateKind::Preset,
        fixed_rate: 4.0,
        cash_rate_kind: CliRateKind::Off,
        cash_rate: 0.0,
        inflation: 0.0,
        mode: CliRetirementMode::WithdrawalRate,
        withdrawal_rate: 4.0,
        life_expectancy: 90,
        spending_cut_after_60: false,
    }
}

fn default_inflation_args() -> InflationArgs {
    InflationArgs {
        start_age: 30,
        amount: 10_000.0,
        monthly_deposit: 0.0,
        savings_rate: 3.0,
        inflation: 3.0,
        years: 10,
    }
}
