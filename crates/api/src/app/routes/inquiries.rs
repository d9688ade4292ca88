use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stackassign_inquiries::InquiryId;

use crate::app::dto::{
    AddInquiryNoteRequest, CreateInquiryRequest, InquiryListQuery, SetInquiryPriorityRequest,
    UpdateInquiryStatusRequest,
};
use crate::app::errors;
use crate::app::routes::common::{optional_actor, parse_aggregate_id, require_actor};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_inquiry).get(list_inquiries))
        .route("/:id", get(get_inquiry).delete(delete_inquiry))
        .route("/:id/status", post(update_status))
        .route("/:id/priority", post(set_priority))
        .route("/:id/notes", post(add_note))
}

/// Public submission; an authenticated caller is linked, anonymous is fine.
pub async fn create_inquiry(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Json(body): Json<CreateInquiryRequest>,
) -> axum::response::Response {
    match services.create_inquiry(optional_actor(actor), body) {
        Ok(inquiry) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "inquiry": inquiry })),
        )
            .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn list_inquiries(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Query(query): Query<InquiryListQuery>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match services.list_inquiries(actor, query) {
        Ok(list) => Json(list).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn get_inquiry(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let inquiry_id = match parse_aggregate_id(&id) {
        Ok(id) => InquiryId::new(id),
        Err(response) => return response,
    };

    match services.get_inquiry(actor, inquiry_id) {
        Ok(inquiry) => Json(serde_json::json!({ "inquiry": inquiry })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateInquiryStatusRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let inquiry_id = match parse_aggregate_id(&id) {
        Ok(id) => InquiryId::new(id),
        Err(response) => return response,
    };

    match services.update_inquiry_status(actor, inquiry_id, body) {
        Ok(inquiry) => Json(serde_json::json!({ "inquiry": inquiry })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn set_priority(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<SetInquiryPriorityRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let inquiry_id = match parse_aggregate_id(&id) {
        Ok(id) => InquiryId::new(id),
        Err(response) => return response,
    };

    match services.set_inquiry_priority(actor, inquiry_id, body) {
        Ok(inquiry) => Json(serde_json::json!({ "inquiry": inquiry })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn add_note(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<AddInquiryNoteRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let inquiry_id = match parse_aggregate_id(&id) {
        Ok(id) => InquiryId::new(id),
        Err(response) => return response,
    };

    match services.add_inquiry_note(actor, inquiry_id, body) {
        Ok(inquiry) => Json(serde_json::json!({ "inquiry": inquiry })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn delete_inquiry(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let inquiry_id = match parse_aggregate_id(&id) {
        Ok(id) => InquiryId::new(id),
        Err(response) => return response,
    };

    match services.delete_inquiry(actor, inquiry_id) {
        Ok(()) => Json(serde_json::json!({ "deleted": true })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
