// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{FromRequest, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{CreateTodoRequest, TodoResponse, UpdateTodoRequest},
    state::AppState,
    storage::TodoId,
};

/// JSON body extractor that reports malformed bodies as API errors.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path ids that are not integers can never match a todo.
fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found())
}

#[utoipa::path(
    get,
    path = "/api/todos",
    tag = "Todos",
    security(("token_auth" = [])),
    responses(
        (status = 200, description = "Caller's todos, newest first", body = [TodoResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_todos(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let todos = state.todo_repository().list(&user.user_id)?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    tag = "Todos",
    security(("token_auth" = [])),
    responses(
        (status = 201, body = TodoResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_todo(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let todo = state
        .todo_repository()
        .create(&user.user_id, request.into())?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo identifier")),
    tag = "Todos",
    security(("token_auth" = [])),
    responses(
        (status = 200, body = TodoResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo for this user")
    )
)]
pub async fn get_todo(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoResponse>, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state.todo_repository().get(&user.user_id, id)?;
    Ok(Json(todo.into()))
}

#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo identifier")),
    request_body = UpdateTodoRequest,
    tag = "Todos",
    security(("token_auth" = [])),
    responses(
        (status = 200, body = TodoResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo for this user")
    )
)]
pub async fn replace_todo(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state
        .todo_repository()
        .replace(&user.user_id, id, request.into())?;
    Ok(Json(todo.into()))
}

#[utoipa::path(
    patch,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo identifier")),
    request_body = UpdateTodoRequest,
    tag = "Todos",
    security(("token_auth" = [])),
    responses(
        (status = 200, body = TodoResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo for this user")
    )
)]
pub async fn update_todo(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state
        .todo_repository()
        .update(&user.user_id, id, request.into())?;
    Ok(Json(todo.into()))
}

#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo identifier")),
    tag = "Todos",
    security(("token_auth" = [])),
    responses(
        (status = 204),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo for this user")
    )
)]
pub async fn delete_todo(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_todo_id(&id)?;
    state.todo_repository().delete(&user.user_id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;

    fn as_user(user_id: &str) -> Auth {
        Auth(AuthenticatedUser::new(user_id))
    }

    fn titled(title: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            title: Some(Some(title.to_string())),
            ..CreateTodoRequest::default()
        }
    }

    async fn create(state: &AppState, user_id: &str, title: &str) -> TodoResponse {
        let (status, Json(todo)) =
            create_todo(as_user(user_id), State(state.clone()), ApiJson(titled(title)))
                .await
                .expect("todo creation succeeds");
        assert_eq!(status, StatusCode::CREATED);
        todo
    }

    #[tokio::test]
    async fn create_todo_success() {
        let state = AppState::default();
        let todo = create(&state, "alice", "Buy milk").await;

        assert_eq!(todo.id, 1);
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, None);
        assert!(!todo.completed);
        assert_eq!(todo.created_by.as_str(), "alice");
        assert_eq!(todo.updated_by.as_str(), "alice");
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn create_todo_rejects_blank_title() {
        let state = AppState::default();
        let err = create_todo(as_user("alice"), State(state.clone()), ApiJson(titled("   ")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field, Some("title"));

        let Json(todos) = list_todos(as_user("alice"), State(state)).await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn list_todos_only_returns_own_items_newest_first() {
        let state = AppState::default();
        let first = create(&state, "alice", "first").await;
        create(&state, "bob", "not mine").await;
        let second = create(&state, "alice", "second").await;

        let Json(todos) = list_todos(as_user("alice"), State(state)).await.unwrap();
        let ids: Vec<_> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn get_todo_of_other_user_is_not_found() {
        let state = AppState::default();
        let todo = create(&state, "alice", "secret").await;

        let err = get_todo(as_user("bob"), State(state.clone()), Path(todo.id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let Json(found) = get_todo(as_user("alice"), State(state), Path(todo.id.to_string()))
            .await
            .unwrap();
        assert_eq!(found, todo);
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let state = AppState::default();
        let err = get_todo(as_user("alice"), State(state), Path("abc".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_todo_changes_only_supplied_fields() {
        let state = AppState::default();
        let todo = create(&state, "alice", "Buy milk").await;

        let request = UpdateTodoRequest {
            completed: Some(Some(true)),
            ..UpdateTodoRequest::default()
        };
        let Json(updated) = update_todo(
            as_user("alice"),
            State(state),
            Path(todo.id.to_string()),
            ApiJson(request),
        )
        .await
        .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at > todo.updated_at);
    }

    #[tokio::test]
    async fn replace_todo_requires_title() {
        let state = AppState::default();
        let todo = create(&state, "alice", "Buy milk").await;

        let request = UpdateTodoRequest {
            completed: Some(Some(true)),
            ..UpdateTodoRequest::default()
        };
        let err = replace_todo(
            as_user("alice"),
            State(state.clone()),
            Path(todo.id.to_string()),
            ApiJson(request),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field, Some("title"));

        let request = UpdateTodoRequest {
            title: Some(Some("Buy oat milk".to_string())),
            ..UpdateTodoRequest::default()
        };
        let Json(replaced) = replace_todo(
            as_user("alice"),
            State(state),
            Path(todo.id.to_string()),
            ApiJson(request),
        )
        .await
        .unwrap();
        assert_eq!(replaced.title, "Buy oat milk");
    }

    #[tokio::test]
    async fn delete_todo_success() {
        let state = AppState::default();
        let todo = create(&state, "alice", "Buy milk").await;

        let err = delete_todo(as_user("bob"), State(state.clone()), Path(todo.id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let status = delete_todo(as_user("alice"), State(state.clone()), Path(todo.id.to_string()))
            .await
            .expect("todo deletion succeeds");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_todo(as_user("alice"), State(state), Path(todo.id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
