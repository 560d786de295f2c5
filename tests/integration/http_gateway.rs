//! Integration tests for `HttpGateway` against the in-process task server.
//!
//! # Verification Focus
//!
//! - Create, read, update, and list round-trip through real HTTP
//! - `{ msg }` error bodies become `GatewayError::Rejected` messages
//! - 400 on invalid bodies, 401 on token mismatch, 404 on unknown ids
//! - Transport failures surface as `GatewayError::Transport`
//! - The form controller works end to end over HTTP

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use taskdesk::form::{Effect, FormState, TaskForm};
use taskdesk::gateway::http::HttpGateway;
use taskdesk::gateway::{FetchGateway, FetchRequest, GatewayError};
use taskdesk::route::Route;
use taskdesk::session::Session;
use taskdesk_proto::form::FormField;
use taskdesk_proto::task::{TaskEnvelope, TaskId, TaskListEnvelope, TaskStatus};
use taskdesk_server::routes::{self, AppState};

/// Start the task server in-process and return a gateway pointed at it.
async fn start_backend(token: Option<&str>) -> (HttpGateway, tokio::task::JoinHandle<()>) {
    let state = Arc::new(AppState::new().with_token(token.map(str::to_string)));
    let (addr, handle) = routes::start_server_with_state("127.0.0.1:0", state)
        .await
        .expect("failed to start task server");
    let gateway = HttpGateway::new(&format!("http://{addr}"), Duration::from_secs(5))
        .expect("valid base url");
    (gateway, handle)
}

fn body(title: &str, description: &str, status: &str) -> serde_json::Value {
    json!({"title": title, "description": description, "status": status})
}

#[tokio::test]
async fn create_get_update_list_round_trip() {
    let (gateway, _handle) = start_backend(None).await;

    let created = gateway
        .fetch(&FetchRequest::post("/tasks", body("Write", "Docs", "pending")))
        .await
        .expect("create");
    assert_eq!(created["msg"], "Task created successfully");
    let created: TaskEnvelope = serde_json::from_value(created).unwrap();
    let id = created.task.id.clone();

    let fetched = gateway
        .fetch(&FetchRequest::get(format!("/tasks/{id}")))
        .await
        .expect("get");
    let fetched: TaskEnvelope = serde_json::from_value(fetched).unwrap();
    assert_eq!(fetched.task, created.task);
    assert_eq!(fetched.msg.as_deref(), Some("Task found successfully"));

    let updated = gateway
        .fetch(&FetchRequest::put(
            format!("/tasks/{id}"),
            body("Write", "Docs", "completed"),
        ))
        .await
        .expect("update");
    let updated: TaskEnvelope = serde_json::from_value(updated).unwrap();
    assert_eq!(updated.task.status, TaskStatus::Completed);

    let list = gateway
        .fetch(&FetchRequest::get("/tasks"))
        .await
        .expect("list");
    let list: TaskListEnvelope = serde_json::from_value(list).unwrap();
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].id, id);
}

#[tokio::test]
async fn unknown_id_is_rejected_with_404() {
    let (gateway, _handle) = start_backend(None).await;
    let err = gateway
        .fetch(&FetchRequest::get("/tasks/nope"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Rejected {
            status: 404,
            message: "Task nope not found".to_string(),
        }
    );
}

#[tokio::test]
async fn invalid_body_is_rejected_with_400() {
    let (gateway, _handle) = start_backend(None).await;
    let err = gateway
        .fetch(&FetchRequest::post("/tasks", body("", "D", "pending")))
        .await
        .unwrap_err();
    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("title: This field is required"), "{message}");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn token_is_enforced() {
    let (gateway, _handle) = start_backend(Some("s3cret")).await;

    let err = gateway
        .fetch(&FetchRequest::get("/tasks"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { status: 401, .. }));

    let wrong = FetchRequest::get("/tasks").with_authorization(Some("guess"));
    assert!(gateway.fetch(&wrong).await.is_err());

    let right = FetchRequest::get("/tasks").with_authorization(Some("s3cret"));
    let list = gateway.fetch(&right).await.expect("authorized list");
    assert_eq!(list["tasks"], json!([]));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let (gateway, handle) = start_backend(None).await;
    handle.abort();
    let _ = handle.await;

    let err = gateway
        .fetch(&FetchRequest::get("/tasks"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, GatewayError::Transport(_)),
        "expected transport error, got {err:?}"
    );
}

#[tokio::test]
async fn form_round_trip_over_http() {
    let (gateway, _handle) = start_backend(None).await;

    // Seed a task the form can edit.
    let created = gateway
        .fetch(&FetchRequest::post("/tasks", body("Old", "Desc", "pending")))
        .await
        .unwrap();
    let id = TaskId::new(created["task"]["id"].as_str().unwrap());

    let mut form = TaskForm::new(Some(id.clone()), Session::anonymous());
    let Some(Effect::Fetch { id: load, request }) = form.initialize() else {
        panic!("expected load request");
    };
    let result = gateway.fetch(&request).await;
    assert!(form.on_response(load, result).is_none());
    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(form.data().title, "Old");

    form.on_field_change(FormField::Title, "New").unwrap();
    let Some(Effect::Fetch { id: submit, request }) = form.on_submit() else {
        panic!("expected submit request");
    };
    let result = gateway.fetch(&request).await;
    assert!(matches!(
        form.on_response(submit, result),
        Some(Effect::Navigate(Route::TaskList))
    ));

    let stored = gateway
        .fetch(&FetchRequest::get(format!("/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(stored["task"]["title"], "New");
}
