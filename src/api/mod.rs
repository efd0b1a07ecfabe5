mod input;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    EngineConfig, FinancialProfile, FinancialReport, ForecastPoint, build_report,
    calculate_ratios, forecast,
};

pub use input::{
    CliPercentileMethod, CliScoreModel, InputError, PolicyArgs, ProfileArgs,
    apply_policy_overrides, build_profile,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiScoreModel {
    #[serde(alias = "tiered")]
    Discrete,
    #[serde(alias = "legacyDiscrete", alias = "legacy_discrete", alias = "legacy")]
    LegacyDiscrete,
    #[serde(alias = "proportional")]
    Continuous,
}

impl From<ApiScoreModel> for CliScoreModel {
    fn from(value: ApiScoreModel) -> Self {
        match value {
            ApiScoreModel::Discrete => CliScoreModel::Discrete,
            ApiScoreModel::LegacyDiscrete => CliScoreModel::LegacyDiscrete,
            ApiScoreModel::Continuous => CliScoreModel::Continuous,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPercentileMethod {
    #[serde(alias = "normalCdf", alias = "normal_cdf", alias = "cdf")]
    NormalCdf,
    #[serde(alias = "linear")]
    Ratio,
    #[serde(alias = "interpolated")]
    Piecewise,
}

impl From<ApiPercentileMethod> for CliPercentileMethod {
    fn from(value: ApiPercentileMethod) -> Self {
        match value {
            ApiPercentileMethod::NormalCdf => CliPercentileMethod::NormalCdf,
            ApiPercentileMethod::Ratio => CliPercentileMethod::Ratio,
            ApiPercentileMethod::Piecewise => CliPercentileMethod::Piecewise,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReportPayload {
    #[serde(alias = "income")]
    monthly_income: Option<f64>,
    #[serde(alias = "expenses")]
    monthly_expenses: Option<f64>,
    #[serde(alias = "savings")]
    total_savings: Option<f64>,
    #[serde(alias = "investments")]
    total_investments: Option<f64>,
    #[serde(alias = "debt")]
    current_debt: Option<f64>,
    #[serde(alias = "assets")]
    total_assets: Option<f64>,
    age: Option<u32>,
    credit_score: Option<u32>,
    federal_tax_rate: Option<f64>,
    state_tax_rate: Option<f64>,
    local_tax_rate: Option<f64>,
    savings_goal: Option<f64>,
    investment_goal: Option<f64>,

    score_model: Option<ApiScoreModel>,
    percentile_method: Option<ApiPercentileMethod>,
    emergency_fund_cap: Option<f64>,
    no_emergency_fund_cap: Option<bool>,

    years: Option<u32>,
}

#[derive(Debug)]
struct ApiRequest {
    profile: FinancialProfile,
    config: EngineConfig,
    years: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    profile: FinancialProfile,
    #[serde(flatten)]
    report: FinancialReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastResponse {
    net_income: f64,
    forecast: ForecastPoint,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type SharedConfig = Arc<EngineConfig>;

pub fn router(config: EngineConfig) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/report",
            get(report_get_handler).post(report_post_handler),
        )
        .route(
            "/api/forecast",
            get(forecast_get_handler).post(forecast_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(Arc::new(config))
}

pub async fn run_http_server(port: u16, config: EngineConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "finance advisor API listening");
    tracing::info!("local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn report_get_handler(
    State(config): State<SharedConfig>,
    Query(payload): Query<ReportPayload>,
) -> Response {
    report_handler_impl(&config, payload)
}

async fn report_post_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<ReportPayload>,
) -> Response {
    report_handler_impl(&config, payload)
}

async fn forecast_get_handler(
    State(config): State<SharedConfig>,
    Query(payload): Query<ReportPayload>,
) -> Response {
    forecast_handler_impl(&config, payload)
}

async fn forecast_post_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<ReportPayload>,
) -> Response {
    forecast_handler_impl(&config, payload)
}

fn report_handler_impl(base: &EngineConfig, payload: ReportPayload) -> Response {
    let request = match api_request_from_payload(payload, base) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    let report = build_report(&request.profile, &request.config);
    tracing::debug!(
        score = report.metrics.financial_score,
        advice = report.advice.len(),
        "served report"
    );
    json_response(
        StatusCode::OK,
        ReportResponse {
            profile: request.profile,
            report,
        },
    )
}

fn forecast_handler_impl(base: &EngineConfig, payload: ReportPayload) -> Response {
    let request = match api_request_from_payload(payload, base) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    let Some(years) = request.years else {
        return InputError::Payload("years is required".to_string()).into_response();
    };

    let ratios = calculate_ratios(&request.profile, request.config.policy.emergency_fund_cap);
    let point = forecast(
        &request.profile,
        ratios.net_income,
        &request.config.assumptions,
        years,
    );
    json_response(
        StatusCode::OK,
        ForecastResponse {
            net_income: ratios.net_income,
            forecast: point,
        },
    )
}

impl IntoResponse for InputError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected request");
        error_response(StatusCode::BAD_REQUEST, &self.to_string())
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

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, InputError> {
    let payload = serde_json::from_str::<ReportPayload>(json)
        .map_err(|e| InputError::Payload(e.to_string()))?;
    api_request_from_payload(payload, &EngineConfig::default())
}

fn api_request_from_payload(
    payload: ReportPayload,
    base: &EngineConfig,
) -> Result<ApiRequest, InputError> {
    let mut args = default_profile_args_for_api();

    if let Some(v) = payload.monthly_income {
        args.monthly_income = v;
    }
    if let Some(v) = payload.monthly_expenses {
        args.monthly_expenses = v;
    }
    if let Some(v) = payload.total_savings {
        args.total_savings = v;
    }
    if let Some(v) = payload.total_investments {
        args.total_investments = v;
    }
    if let Some(v) = payload.current_debt {
        args.current_debt = v;
    }
    if let Some(v) = payload.total_assets {
        args.total_assets = v;
    }
    if let Some(v) = payload.age {
        args.age = v;
    }
    if let Some(v) = payload.credit_score {
        args.credit_score = v;
    }
    if let Some(v) = payload.federal_tax_rate {
        args.federal_tax_rate = v;
    }
    if let Some(v) = payload.state_tax_rate {
        args.state_tax_rate = v;
    }
    if let Some(v) = payload.local_tax_rate {
        args.local_tax_rate = v;
    }
    if payload.savings_goal.is_some() {
        args.savings_goal = payload.savings_goal;
    }
    if payload.investment_goal.is_some() {
        args.investment_goal = payload.investment_goal;
    }

    let overrides = PolicyArgs {
        score_model: payload.score_model.map(Into::into),
        percentile_method: payload.percentile_method.map(Into::into),
        emergency_fund_cap: payload.emergency_fund_cap,
        no_emergency_fund_cap: payload.no_emergency_fund_cap.unwrap_or(false),
    };

    let profile = build_profile(args)?;
    let config = apply_policy_overrides(base, &overrides)?;

    Ok(ApiRequest {
        profile,
        config,
        years: payload.years,
    })
}

fn default_profile_args_for_api() -> ProfileArgs {
    ProfileArgs {
        monthly_income: 5_000.0,
        monthly_expenses: 3_500.0,
        total_savings: 25_000.0,
        total_investments: 40_000.0,
        current_debt: 0.0,
        total_assets: 0.0,
        age: 30,
        credit_score: 710,
        federal_tax_rate: 15.0,
        state_tax_rate: 5.0,
        local_tax_rate: 3.0,
        savings_goal: None,
        investment_goal: None,
    }
}
