use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stackassign_pricing::{compute_price, quote_tiers, AcademicLevel};

use crate::app::dto::{CalculatePriceRequest, PricingBody, TierBody, TiersQuery};
use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/tiers", get(tiers))
}

/// Quote a single (level, deadline, pages) triple. Public.
pub async fn calculate(Json(body): Json<CalculatePriceRequest>) -> axum::response::Response {
    let days = body.deadline.days_from(Utc::now());
    if days < 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "deadline cannot be in the past",
        );
    }

    match compute_price(body.academic_level, days, body.pages) {
        Ok(quote) => Json(serde_json::json!({
            "pricing": PricingBody::from_quote(&quote, days),
        }))
        .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

/// The public pricing table: one row per deadline band. Public.
///
/// Unknown academic levels deliberately price at the fallback rate here
/// (`parse_lossy`), matching the calculator's historical behavior.
pub async fn tiers(Query(query): Query<TiersQuery>) -> axum::response::Response {
    let level = query
        .academic_level
        .as_deref()
        .map(AcademicLevel::parse_lossy)
        .unwrap_or(AcademicLevel::HighSchool);
    let pages = query.pages.unwrap_or(1);

    match quote_tiers(level, pages) {
        Ok(tiers) => Json(serde_json::json!({
            "academic_level": level,
            "pages": pages,
            "tiers": tiers.into_iter().map(TierBody::from).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
