//! Integration tests for the request worker (`spawn_api`).
//!
//! # Verification Focus
//!
//! - Success toasts use the body's `msg`, or `"Success"` without one
//! - Suppressed requests complete without a toast
//! - Errors always produce an error toast before the completion
//! - Requests run concurrently and completions keep their ids
//! - Shutdown stops the worker

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use taskdesk::api::{self, ApiCommand, ApiEvent, RequestId};
use taskdesk::gateway::loopback::LoopbackGateway;
use taskdesk::gateway::{FetchRequest, GatewayError, ToastKind};
use tokio::sync::mpsc;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn next_event(rx: &mut mpsc::Receiver<ApiEvent>) -> ApiEvent {
    tokio::time::timeout(TIMEOUT, rx.recv())
        .await
        .expect("timeout waiting for api event")
        .expect("event channel closed")
}

async fn fetch(tx: &mpsc::Sender<ApiCommand>, request: FetchRequest) -> RequestId {
    let id = RequestId::next();
    tx.send(ApiCommand::Fetch { id, request })
        .await
        .expect("worker alive");
    id
}

#[tokio::test]
async fn success_toast_carries_message() {
    let gateway = LoopbackGateway::new().with_response(Ok(json!({"msg": "Task created successfully"})));
    let (tx, mut rx) = api::spawn_api(Arc::new(gateway), 8);

    let id = fetch(&tx, FetchRequest::post("/tasks", json!({}))).await;

    match next_event(&mut rx).await {
        ApiEvent::Toast(toast) => {
            assert_eq!(toast.kind, ToastKind::Success);
            assert_eq!(toast.message, "Task created successfully");
        }
        other => panic!("expected toast first, got {other:?}"),
    }
    match next_event(&mut rx).await {
        ApiEvent::Completed { id: done, result } => {
            assert_eq!(done, id);
            assert!(result.is_ok());
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn success_toast_defaults_without_msg() {
    let gateway = LoopbackGateway::new().with_response(Ok(json!({})));
    let (tx, mut rx) = api::spawn_api(Arc::new(gateway), 8);
    fetch(&tx, FetchRequest::get("/tasks")).await;

    let ApiEvent::Toast(toast) = next_event(&mut rx).await else {
        panic!("expected toast");
    };
    assert_eq!(toast.message, "Success");
}

#[tokio::test]
async fn suppressed_success_has_no_toast() {
    let gateway = LoopbackGateway::new().with_response(Ok(json!({"msg": "quiet"})));
    let (tx, mut rx) = api::spawn_api(Arc::new(gateway), 8);
    let id = fetch(&tx, FetchRequest::get("/tasks/1").without_success_toast()).await;

    assert!(matches!(
        next_event(&mut rx).await,
        ApiEvent::Completed { id: done, result: Ok(_) } if done == id
    ));
}

#[tokio::test]
async fn errors_toast_even_when_suppressed() {
    let gateway = LoopbackGateway::new().with_response(Err(GatewayError::Timeout));
    let (tx, mut rx) = api::spawn_api(Arc::new(gateway), 8);
    let id = fetch(&tx, FetchRequest::get("/tasks/1").without_success_toast()).await;

    let ApiEvent::Toast(toast) = next_event(&mut rx).await else {
        panic!("expected error toast");
    };
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "request timed out");

    assert!(matches!(
        next_event(&mut rx).await,
        ApiEvent::Completed { id: done, result: Err(GatewayError::Timeout) } if done == id
    ));
}

#[tokio::test]
async fn every_request_completes_with_its_id() {
    let gateway = LoopbackGateway::new()
        .with_response(Ok(json!({"n": 1})))
        .with_response(Ok(json!({"n": 2})))
        .with_response(Ok(json!({"n": 3})));
    let (tx, mut rx) = api::spawn_api(Arc::new(gateway), 8);

    let mut sent = Vec::new();
    for _ in 0..3 {
        sent.push(fetch(&tx, FetchRequest::get("/tasks").without_success_toast()).await);
    }

    let mut done = Vec::new();
    while done.len() < sent.len() {
        if let ApiEvent::Completed { id, result } = next_event(&mut rx).await {
            assert!(result.is_ok());
            done.push(id);
        }
    }
    for id in sent {
        assert!(done.contains(&id));
    }
}

#[tokio::test]
async fn shutdown_closes_event_channel() {
    let (tx, mut rx) = api::spawn_api(Arc::new(LoopbackGateway::new()), 8);
    tx.send(ApiCommand::Shutdown).await.expect("worker alive");

    let closed = tokio::time::timeout(TIMEOUT, rx.recv())
        .await
        .expect("timeout waiting for close");
    assert!(closed.is_none());
}
