use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stackassign_orders::OrderId;

use crate::app::dto::{
    AssignWriterRequest, ChangeOrderStatusRequest, CreateOrderRequest, OrderListQuery,
    RecordPaymentRequest, UpdateOrderRequest,
};
use crate::app::errors;
use crate::app::routes::common::{parse_aggregate_id, require_actor};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route(
            "/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/:id/status", post(change_status))
        .route("/:id/payment", post(record_payment))
        .route("/:id/assign", post(assign_writer))
        .route("/:id/cancel", post(cancel_order))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Json(body): Json<CreateOrderRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match services.create_order(actor, body) {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "order": order })),
        )
            .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Query(query): Query<OrderListQuery>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match services.list_orders(actor, query) {
        Ok(list) => Json(list).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.get_order(actor, order_id) {
        Ok(order) => Json(serde_json::json!({ "order": order })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrderRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.update_order_content(actor, order_id, body) {
        Ok(order) => Json(serde_json::json!({ "order": order })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<ChangeOrderStatusRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.transition_order_status(actor, order_id, body.status) {
        Ok(order) => Json(serde_json::json!({ "order": order })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<RecordPaymentRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.record_payment(actor, order_id, body.payment_status) {
        Ok(order) => Json(serde_json::json!({ "order": order })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn assign_writer(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
    Json(body): Json<AssignWriterRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.assign_writer(actor, order_id, body) {
        Ok(order) => Json(serde_json::json!({ "order": order })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.cancel_order(actor, order_id) {
        Ok(order) => Json(serde_json::json!({ "order": order })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let order_id = match parse_aggregate_id(&id) {
        Ok(id) => OrderId::new(id),
        Err(response) => return response,
    };

    match services.delete_order(actor, order_id) {
        Ok(()) => Json(serde_json::json!({ "deleted": true })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
