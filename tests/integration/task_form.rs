//! Integration tests for the task form controller driven through the request
//! worker.
//!
//! Each test runs the same loop the TUI runs: effects from the controller are
//! sent as `ApiCommand`s, and `ApiEvent`s coming back are fed to
//! `on_response`. The backend is a scripted `LoopbackGateway`.
//!
//! # Verification Focus
//!
//! - Update mode loads once, with the credential and no success toast
//! - Invalid forms never reach the gateway
//! - Valid submits send the right method, path, and body, then navigate
//! - Failed submits return to `Ready` with the data intact
//! - Cancel while submitting navigates once and drops the late result

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use taskdesk::api::{self, ApiCommand, ApiEvent, RequestId};
use taskdesk::form::{Effect, FormState, TaskForm};
use taskdesk::gateway::loopback::LoopbackGateway;
use taskdesk::gateway::{GatewayError, Method, Toast, ToastKind};
use taskdesk::route::Route;
use taskdesk::session::{Credential, Session};
use taskdesk_proto::form::FormField;
use taskdesk_proto::task::{TaskId, TaskStatus};
use taskdesk_proto::validation::REQUIRED_MESSAGE;
use tokio::sync::mpsc;

const TIMEOUT: Duration = Duration::from_secs(5);

fn session() -> Session {
    Session::authenticated(Credential::new("tok-123"))
}

fn task_body(id: &str) -> Value {
    json!({
        "task": {"id": id, "title": "Ship it", "description": "Before Friday", "status": "in_progress"},
        "msg": "Task found successfully"
    })
}

/// Request worker plus the gateway behind it.
struct Harness {
    gateway: Arc<LoopbackGateway>,
    tx: mpsc::Sender<ApiCommand>,
    rx: mpsc::Receiver<ApiEvent>,
}

impl Harness {
    fn new(gateway: LoopbackGateway) -> Self {
        let gateway = Arc::new(gateway);
        let (tx, rx) = api::spawn_api(Arc::clone(&gateway), 16);
        Self { gateway, tx, rx }
    }

    /// Send a fetch effect and return its id.
    async fn send(&self, effect: Option<Effect>) -> RequestId {
        match effect {
            Some(Effect::Fetch { id, request }) => {
                self.tx
                    .send(ApiCommand::Fetch { id, request })
                    .await
                    .expect("worker alive");
                id
            }
            other => panic!("expected fetch effect, got {other:?}"),
        }
    }

    /// Wait for the completion of `id`, collecting toasts on the way.
    async fn completion(
        &mut self,
        id: RequestId,
    ) -> (Result<Value, GatewayError>, Vec<Toast>) {
        let mut toasts = Vec::new();
        loop {
            let event = tokio::time::timeout(TIMEOUT, self.rx.recv())
                .await
                .expect("timeout waiting for api event")
                .expect("event channel closed");
            match event {
                ApiEvent::Toast(toast) => toasts.push(toast),
                ApiEvent::Completed { id: done, result } if done == id => {
                    return (result, toasts);
                }
                ApiEvent::Completed { id: other, .. } => panic!("unexpected completion {other}"),
            }
        }
    }
}

fn fill(form: &mut TaskForm, title: &str, description: &str, status: &str) {
    form.on_field_change(FormField::Title, title).unwrap();
    form.on_field_change(FormField::Description, description)
        .unwrap();
    form.on_field_change(FormField::Status, status).unwrap();
}

#[tokio::test]
async fn update_mode_loads_task_quietly() {
    let mut h = Harness::new(LoopbackGateway::new().with_response(Ok(task_body("42"))));
    let mut form = TaskForm::new(Some(TaskId::new("42")), session());
    assert_eq!(form.state(), FormState::Loading);

    let id = h.send(form.initialize()).await;
    assert!(form.initialize().is_none(), "second initialize must not reload");

    let (result, toasts) = h.completion(id).await;
    assert!(toasts.is_empty(), "load must not show a success toast");
    assert!(form.on_response(id, result).is_none());

    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(form.data().title, "Ship it");
    assert_eq!(form.data().status, "in_progress");
    assert_eq!(
        form.loaded_task().map(|t| t.status),
        Some(TaskStatus::InProgress)
    );

    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].url, "/tasks/42");
    assert_eq!(requests[0].authorization(), Some("tok-123"));
}

#[tokio::test]
async fn failed_load_stays_loading_with_error_toast() {
    let mut h = Harness::new(LoopbackGateway::new().with_response(Err(
        GatewayError::Rejected {
            status: 404,
            message: "Task 9 not found".to_string(),
        },
    )));
    let mut form = TaskForm::new(Some(TaskId::new("9")), session());

    let id = h.send(form.initialize()).await;
    let (result, toasts) = h.completion(id).await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(toasts[0].message.contains("Task 9 not found"));

    assert!(form.on_response(id, result).is_none());
    assert_eq!(form.state(), FormState::Loading);
    assert!(form.on_field_change(FormField::Title, "x").is_err());
}

#[tokio::test]
async fn invalid_submit_never_reaches_gateway() {
    let h = Harness::new(LoopbackGateway::new());
    let mut form = TaskForm::new(None, session());
    form.on_field_change(FormField::Title, "   ").unwrap();

    assert!(form.on_submit().is_none());
    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(form.error_for(FormField::Title), Some(REQUIRED_MESSAGE));
    assert_eq!(form.error_for(FormField::Description), Some(REQUIRED_MESSAGE));
    assert!(form.error_for(FormField::Status).is_some());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(h.gateway.requests().is_empty());
}

#[tokio::test]
async fn add_submit_posts_and_navigates_with_toast() {
    let mut h = Harness::new(LoopbackGateway::new().with_response(Ok(json!({
        "task": {"id": "n1", "title": "New", "description": "Thing", "status": "pending"},
        "msg": "Task created successfully"
    }))));
    let mut form = TaskForm::new(None, session());
    fill(&mut form, "New", "Thing", "pending");

    let id = h.send(form.on_submit()).await;
    assert_eq!(form.state(), FormState::Submitting);
    assert!(form.on_submit().is_none(), "re-entrant submit must be ignored");

    let (result, toasts) = h.completion(id).await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].message, "Task created successfully");

    let effect = form.on_response(id, result);
    assert!(matches!(effect, Some(Effect::Navigate(Route::TaskList))));
    assert_eq!(form.state(), FormState::Done);

    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, "/tasks");
    assert_eq!(
        requests[0].data,
        Some(json!({"title": "New", "description": "Thing", "status": "pending"}))
    );
}

#[tokio::test]
async fn update_submit_puts_to_task_path() {
    let mut h = Harness::new(
        LoopbackGateway::new()
            .with_response(Ok(task_body("42")))
            .with_response(Ok(json!({"msg": "Task updated successfully"}))),
    );
    let mut form = TaskForm::new(Some(TaskId::new("42")), session());
    let load = h.send(form.initialize()).await;
    let (result, _) = h.completion(load).await;
    form.on_response(load, result);

    form.on_field_change(FormField::Status, "completed").unwrap();
    let submit = h.send(form.on_submit()).await;
    let (result, _) = h.completion(submit).await;
    assert!(matches!(
        form.on_response(submit, result),
        Some(Effect::Navigate(Route::TaskList))
    ));

    let requests = h.gateway.requests();
    assert_eq!(requests[1].method, Method::Put);
    assert_eq!(requests[1].url, "/tasks/42");
    assert_eq!(requests[1].authorization(), Some("tok-123"));
    assert_eq!(
        requests[1].data.as_ref().and_then(|d| d.get("status")),
        Some(&json!("completed"))
    );
}

#[tokio::test]
async fn failed_submit_returns_to_ready_with_data() {
    let mut h = Harness::new(LoopbackGateway::new().with_response(Err(GatewayError::Timeout)));
    let mut form = TaskForm::new(None, session());
    fill(&mut form, "Keep me", "Please", "pending");

    let id = h.send(form.on_submit()).await;
    let (result, toasts) = h.completion(id).await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);

    assert!(form.on_response(id, result).is_none());
    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(form.data().title, "Keep me");
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn cancel_during_submit_navigates_once() {
    let mut h = Harness::new(LoopbackGateway::new().with_response(Ok(json!({"msg": "ok"}))));
    let mut form = TaskForm::new(None, session());
    fill(&mut form, "T", "D", "pending");

    let id = h.send(form.on_submit()).await;
    assert!(matches!(
        form.on_cancel(),
        Some(Effect::Navigate(Route::TaskList))
    ));
    assert!(form.on_cancel().is_none());

    let (result, _) = h.completion(id).await;
    assert!(form.on_response(id, result).is_none(), "late result is stale");
    assert_eq!(form.state(), FormState::Done);
}

#[tokio::test]
async fn anonymous_session_sends_no_authorization() {
    let mut h = Harness::new(LoopbackGateway::new().with_response(Ok(task_body("1"))));
    let mut form = TaskForm::new(Some(TaskId::new("1")), Session::anonymous());
    let id = h.send(form.initialize()).await;
    let _ = h.completion(id).await;

    assert!(h.gateway.requests()[0].authorization().is_none());
}
