use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use lab_core::config::{environment_from_env_value, timeout_from_env_value};
use lab_core::constants::{
    LAB_API_KEY_VAR, LAB_ENV_VAR, LAB_PROVIDER_URL_VAR, LAB_TIMEOUT_SECS_VAR,
};
use lab_core::{
    CriticalReport, Direction, FetchOutcome, InternalRecord, LabConfig, LabConnector,
    SubmitOutcome, check_critical,
};
use lab_types::{
    LabOrder, LabResult, LabTest, LabTestResult, OrderStatus, Priority, ResultFlag, ResultStatus,
    TestValue,
};

/// Batch concurrency used when a request does not specify one.
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Application state shared across REST API handlers
#[derive(Clone)]
struct AppState {
    connector: LabConnector,
    environment: &'static str,
}

#[derive(Serialize, ToSchema)]
struct HealthRes {
    ok: bool,
    message: String,
    environment: String,
}

#[derive(Deserialize, ToSchema)]
struct BatchReq {
    orders: Vec<LabOrder>,
    /// Maximum submissions in flight (default 4)
    #[serde(default)]
    concurrency: Option<usize>,
}

#[derive(Serialize, ToSchema)]
struct ResultsRes {
    outcome: FetchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    critical: Option<CriticalReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object, nullable)]
    record: Option<InternalRecord>,
}

#[derive(Serialize, ToSchema)]
struct ParsedOruRes {
    result: LabResult,
    critical: CriticalReport,
    #[schema(value_type = Object)]
    record: InternalRecord,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, submit_order, submit_orders, fetch_results, parse_oru),
    components(schemas(
        HealthRes,
        BatchReq,
        ResultsRes,
        ParsedOruRes,
        LabOrder,
        LabTest,
        LabResult,
        LabTestResult,
        Priority,
        OrderStatus,
        ResultFlag,
        ResultStatus,
        TestValue,
        SubmitOutcome,
        FetchOutcome,
        CriticalReport
    ))
)]
struct ApiDoc;

/// Main entry point for the lab engine REST server
///
/// # Environment Variables
/// - `LAB_ENV`: `production` enables the live provider; anything else uses the mock
/// - `LAB_PROVIDER_URL`: provider base URL (required in production)
/// - `LAB_API_KEY`: provider API key (required in production)
/// - `LAB_TIMEOUT_SECS`: per-request deadline (default: 30)
/// - `LAB_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("lab=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let environment = environment_from_env_value(std::env::var(LAB_ENV_VAR).ok());
    let config = LabConfig::new(
        environment,
        std::env::var(LAB_PROVIDER_URL_VAR).unwrap_or_default(),
        std::env::var(LAB_API_KEY_VAR).unwrap_or_default(),
        timeout_from_env_value(std::env::var(LAB_TIMEOUT_SECS_VAR).ok())?,
    )?;
    let rest_addr = std::env::var("LAB_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let connector = LabConnector::new(&config)?;
    tracing::info!(
        "++ Starting lab REST on {} ({} environment, {} strategy)",
        rest_addr,
        environment,
        connector.strategy_name()
    );

    let app = app(AppState {
        connector,
        environment: environment.as_str(),
    });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(submit_order))
        .route("/orders/batch", post(submit_orders))
        .route("/orders/:id/results", get(fetch_results))
        .route("/hl7/oru", post(parse_oru))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Logs each critical finding for the notification collaborator. Patient names are never
/// logged.
fn notify_critical(result: &LabResult, report: &CriticalReport) {
    for finding in report.findings() {
        let direction = match finding.direction {
            Direction::Low => "low",
            Direction::High => "high",
        };
        tracing::warn!(
            result_id = %result.id,
            patient_id = %result.patient_id,
            code = %finding.code,
            value = finding.value,
            unit = %finding.unit,
            limit = finding.limit,
            direction,
            "critical lab value"
        );
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Lab engine is alive".into(),
        environment: state.environment.into(),
    })
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = LabOrder,
    responses(
        (status = 200, description = "Order submitted", body = SubmitOutcome),
        (status = 502, description = "Provider rejected or did not answer", body = SubmitOutcome)
    )
)]
/// Submit a single order to the laboratory
///
/// Outside production the order is acknowledged by the mock provider and nothing is sent.
async fn submit_order(
    State(state): State<AppState>,
    Json(order): Json<LabOrder>,
) -> (StatusCode, Json<SubmitOutcome>) {
    let outcome = state.connector.submit_order(&order).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        tracing::error!(order_id = %order.id, "Submit order error: {:?}", outcome.error);
        StatusCode::BAD_GATEWAY
    };
    (status, Json(outcome))
}

#[utoipa::path(
    post,
    path = "/orders/batch",
    request_body = BatchReq,
    responses(
        (status = 200, description = "One outcome per order, in request order", body = [SubmitOutcome])
    )
)]
/// Submit several orders with bounded concurrency
async fn submit_orders(
    State(state): State<AppState>,
    Json(req): Json<BatchReq>,
) -> Json<Vec<SubmitOutcome>> {
    let concurrency = req.concurrency.unwrap_or(DEFAULT_BATCH_CONCURRENCY);
    Json(state.connector.submit_orders(&req.orders, concurrency).await)
}

#[utoipa::path(
    get,
    path = "/orders/{id}/results",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Results with critical value report", body = ResultsRes),
        (status = 502, description = "Provider failed or returned an unreadable result", body = ResultsRes)
    )
)]
/// Fetch results for an order and run the critical value check
async fn fetch_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<ResultsRes>) {
    let outcome = state.connector.fetch_results(&id).await;

    let Some(result) = outcome.result.as_ref() else {
        tracing::error!(order_id = %id, "Fetch results error: {:?}", outcome.error);
        let res = ResultsRes {
            outcome,
            critical: None,
            record: None,
        };
        return (StatusCode::BAD_GATEWAY, Json(res));
    };

    let critical = check_critical(result);
    notify_critical(result, &critical);
    let record = state.connector.to_internal_format(result);

    let res = ResultsRes {
        outcome,
        critical: Some(critical),
        record: Some(record),
    };
    (StatusCode::OK, Json(res))
}

#[utoipa::path(
    post,
    path = "/hl7/oru",
    request_body(content = String, content_type = "text/plain", description = "Raw ORU^R01 message"),
    responses(
        (status = 200, description = "Parsed result", body = ParsedOruRes),
        (status = 422, description = "Not a readable ORU message")
    )
)]
/// Parse a pushed ORU^R01 message, check it and map it to the internal format
async fn parse_oru(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ParsedOruRes>, (StatusCode, String)> {
    let result = hl7::parse_oru_text(&body).map_err(|e| {
        tracing::error!("Parse ORU error: {}", e);
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let critical = check_critical(&result);
    notify_critical(&result, &critical);
    let record = state.connector.to_internal_format(&result);

    Ok(Json(ParsedOruRes {
        result,
        critical,
        record,
    }))
}
