//! axum routes for the risk form.

use super::context::{AppContext, FORM_PAGE};
use super::form::{FIELDS, RiskOutcome, parse_submission};
use crate::error::PipelineError;
use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};

/// Build the router: `/` (form, GET and POST) and `/health`.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn show_form(State(ctx): State<Arc<AppContext>>) -> Response {
    render(&ctx, None)
}

async fn submit_form(
    State(ctx): State<Arc<AppContext>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let span = info_span!(parent: &ctx.span, "predict");
    let _guard = span.enter();

    let outcome = match form {
        Ok(Form(values)) => classify(&ctx, &values),
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable form body");
            RiskOutcome::ProcessingError
        }
    };
    info!(outcome = %outcome, "Prediction served");
    render(&ctx, Some(outcome))
}

fn classify(ctx: &AppContext, values: &HashMap<String, String>) -> RiskOutcome {
    let row = match parse_submission(values) {
        Ok(row) => row,
        Err(e) => {
            warn!(error = %e, "Rejected form input");
            return RiskOutcome::ProcessingError;
        }
    };
    match ctx.predictor.predict_one(&row) {
        Ok(label) => RiskOutcome::from_label(label),
        Err(e) => {
            warn!(error = %e, "Prediction failed");
            RiskOutcome::ProcessingError
        }
    }
}

fn render(ctx: &AppContext, outcome: Option<RiskOutcome>) -> Response {
    let mut data = json!({ "fields": FIELDS });
    if let Some(outcome) = outcome {
        data["prediction"] = json!(outcome.as_str());
        data["result_class"] = json!(outcome.css_class());
        data["now"] = json!(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    }
    match ctx.templates.render(FORM_PAGE, &data) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, "Form template failed to render");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

async fn health_handler(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "predictor": ctx.predictor.name(),
    }))
}

/// Bind `host:port` and serve the form until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, host: &str, port: u16) -> Result<(), PipelineError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %listener.local_addr()?,
        predictor = ctx.predictor.name(),
        "Risk form listening"
    );
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Risk form stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
