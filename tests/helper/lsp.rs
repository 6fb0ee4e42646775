//! LSP request/notification test utilities

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tower::Service;
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::lsp_types::*;
use tower_lsp::{ClientSocket, LspService};

use verlens_lsp::lsp::backend::Backend;

pub const WORKSPACE_URI: &str = "file:///project/pnpm-workspace.yaml";

/// Create an LSP initialize request
pub fn create_initialize_request(id: i64) -> Request {
    create_initialize_request_with_options(id, None)
}

/// Create an LSP initialize request carrying `initializationOptions`
pub fn create_initialize_request_with_options(id: i64, options: Option<Value>) -> Request {
    Request::build("initialize")
        .id(id)
        .params(
            serde_json::to_value(InitializeParams {
                initialization_options: options,
                ..Default::default()
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP initialized notification
pub fn create_initialized_notification() -> Request {
    Request::build("initialized")
        .params(serde_json::to_value(InitializedParams {}).unwrap())
        .finish()
}

/// Create an LSP didOpen notification
pub fn create_did_open_notification(uri: &str, content: &str) -> Request {
    Request::build("textDocument/didOpen")
        .params(
            serde_json::to_value(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.parse().unwrap(),
                    language_id: "yaml".to_string(),
                    version: 1,
                    text: content.to_string(),
                },
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP didChange notification
pub fn create_did_change_notification(uri: &str, content: &str, version: i32) -> Request {
    Request::build("textDocument/didChange")
        .params(
            serde_json::to_value(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri.parse().unwrap(),
                    version,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: content.to_string(),
                }],
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP didClose notification
pub fn create_did_close_notification(uri: &str) -> Request {
    Request::build("textDocument/didClose")
        .params(
            serde_json::to_value(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier {
                    uri: uri.parse().unwrap(),
                },
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP workspace/didChangeConfiguration notification
pub fn create_did_change_configuration_notification(settings: Value) -> Request {
    Request::build("workspace/didChangeConfiguration")
        .params(serde_json::to_value(DidChangeConfigurationParams { settings }).unwrap())
        .finish()
}

/// Create an LSP codeLens request
pub fn create_code_lens_request(id: i64, uri: &str) -> Request {
    Request::build("textDocument/codeLens")
        .id(id)
        .params(
            serde_json::to_value(CodeLensParams {
                text_document: TextDocumentIdentifier {
                    uri: uri.parse().unwrap(),
                },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP workspace/executeCommand request
pub fn create_execute_command_request(id: i64, command: &str, arguments: Vec<Value>) -> Request {
    Request::build("workspace/executeCommand")
        .id(id)
        .params(
            serde_json::to_value(ExecuteCommandParams {
                command: command.to_string(),
                arguments,
                work_done_progress_params: Default::default(),
            })
            .unwrap(),
        )
        .finish()
}

/// Collect server-to-client messages in background and return a receiver
///
/// `workspace/applyEdit` requests are answered with `{ "applied": true }` so
/// the server side of the edit round trip can complete.
pub fn spawn_notification_collector(mut socket: ClientSocket) -> mpsc::Receiver<Request> {
    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        while let Some(request) = socket.next().await {
            if request.method() == "workspace/applyEdit"
                && let Some(id) = request.id().cloned()
            {
                let response = Response::from_ok(id, json!({ "applied": true }));
                if socket.send(response).await.is_err() {
                    break;
                }
            }
            if tx.send(request).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Wait for a notification with the specified method name from the receiver
pub async fn wait_for_notification(
    rx: &mut mpsc::Receiver<Request>,
    method: &str,
) -> Option<Request> {
    let timeout_duration = Duration::from_secs(5);

    loop {
        match timeout(timeout_duration, rx.recv()).await {
            Ok(Some(notification)) => {
                if notification.method() == method {
                    return Some(notification);
                }
                // Skip other notifications (like log_message)
            }
            _ => return None,
        }
    }
}

/// Send initialize + initialized
pub async fn initialize(service: &mut LspService<Backend>, options: Option<Value>) {
    let response = service
        .call(create_initialize_request_with_options(1, options))
        .await
        .unwrap();
    assert!(response.is_some());

    service
        .call(create_initialized_notification())
        .await
        .unwrap();
}

/// Request code lenses and return the raw `result` value
pub async fn request_code_lenses(service: &mut LspService<Backend>, id: i64, uri: &str) -> Value {
    let response = service
        .call(create_code_lens_request(id, uri))
        .await
        .unwrap()
        .expect("codeLens is a request and must have a response");
    let (_, result) = response.into_parts();
    result.expect("codeLens should succeed")
}

/// Request code lenses and return the lens titles in order
pub async fn request_code_lens_titles(
    service: &mut LspService<Backend>,
    id: i64,
    uri: &str,
) -> Vec<String> {
    let lenses: Vec<CodeLens> =
        serde_json::from_value(request_code_lenses(service, id, uri).await).unwrap();
    lenses
        .into_iter()
        .map(|lens| lens.command.unwrap().title)
        .collect()
}
