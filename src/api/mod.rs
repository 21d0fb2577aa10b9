// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthenticatedUser,
    models::{CreateTodoRequest, TodoResponse, UpdateTodoRequest, UserId},
    state::AppState,
};

pub mod health;
pub mod todos;

pub fn router(state: AppState) -> Router {
    // Trailing-slash variants are registered explicitly.
    let api_routes = Router::new()
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route("/todos/", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .put(todos::replace_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route(
            "/todos/{id}/",
            get(todos::get_todo)
                .put(todos::replace_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http()),
        )
}

/// Registers the `Authorization: Token <key>` scheme referenced by the todo paths.
struct TokenAuthAddon;

impl Modify for TokenAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        todos::list_todos,
        todos::create_todo,
        todos::get_todo,
        todos::replace_todo,
        todos::update_todo,
        todos::delete_todo,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            TodoResponse,
            CreateTodoRequest,
            UpdateTodoRequest,
            UserId,
            AuthenticatedUser,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&TokenAuthAddon),
    tags(
        (name = "Todos", description = "Per-user todo management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
