//! The central Model Context Protocol engine
//!
//! Decodes JSON-RPC messages, answers `initialize`, and routes tool and resource
//! methods. `invoke` serves the older single-call tool dialect.

use rust_mcp_sdk::schema::{
    CallToolRequest, Implementation, InitializeResult, JsonrpcMessage, JsonrpcRequest,
    ListResourcesRequest, ListResourcesResult, ListToolsRequest, ListToolsResult, PingRequest,
    ProtocolVersion, ReadResourceRequest, ServerCapabilities, ServerCapabilitiesResources,
    ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::{
    resources::{build_resources_list, handle_resources_read},
    tools::{build_tools_list, handle_legacy_invoke, handle_tools_call},
};
use crate::mcp::rpc::{
    app_error_to_json_rpc, is_json_rpc_error, json_rpc_error, json_rpc_result, request_id_to_value,
};
use crate::{errors::AppError, AppState};

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_TITLE: &str = "MCP Git API";

const INSTRUCTIONS: &str = "Tools prefixed with gh_ operate on GitHub repositories with the \
server's token. Call gh_testar_conexao first to check access. Omitting branch uses the \
repository's default branch. Every tool result carries sucesso and mensagem.";

pub async fn handle_json_rpc_value(state: &AppState, payload: Value) -> Option<Value> {
    if !payload.is_object() {
        return Some(json_rpc_error(None, -32600, "Invalid Request"));
    }

    let request_id = payload.get("id").cloned();
    let parsed: JsonrpcMessage = match serde_json::from_value(payload) {
        Ok(message) => message,
        Err(_) => return Some(json_rpc_error(request_id, -32600, "Invalid Request")),
    };

    match parsed {
        JsonrpcMessage::Request(request) => {
            if let Err(error_response) = validate_request_shape(&request) {
                return Some(error_response);
            }

            let request_id = request_id_to_value(request.id);
            if request.method.trim().is_empty() {
                return Some(json_rpc_error(Some(request_id), -32600, "Invalid Request"));
            }

            Some(
                handle_json_rpc_request(
                    state,
                    Some(request_id),
                    request.method,
                    request.params.map(Value::Object),
                )
                .await,
            )
        }
        JsonrpcMessage::Notification(notification) => {
            if notification.method.trim().is_empty() {
                return None;
            }

            let _ = handle_json_rpc_request(
                state,
                None,
                notification.method,
                notification.params.map(Value::Object),
            )
            .await;
            None
        }
        JsonrpcMessage::ResultResponse(_) | JsonrpcMessage::ErrorResponse(_) => {
            Some(json_rpc_error(request_id, -32600, "Invalid Request"))
        }
    }
}

pub fn validate_request_shape(request: &JsonrpcRequest) -> Result<(), Value> {
    let payload = serde_json::to_value(request).expect("jsonrpc request serialization");
    let request_id = Some(request_id_to_value(request.id.clone()));

    let valid = match request.method.as_str() {
        "tools/call" => serde_json::from_value::<CallToolRequest>(payload).is_ok(),
        "resources/read" => serde_json::from_value::<ReadResourceRequest>(payload).is_ok(),
        "tools/list" => serde_json::from_value::<ListToolsRequest>(payload).is_ok(),
        "resources/list" => serde_json::from_value::<ListResourcesRequest>(payload).is_ok(),
        "ping" => serde_json::from_value::<PingRequest>(payload).is_ok(),
        _ => true,
    };

    if valid {
        Ok(())
    } else {
        Err(json_rpc_error(request_id, -32602, "Invalid params"))
    }
}

pub async fn handle_json_rpc_request(
    state: &AppState,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
) -> Value {
    let audit_params = redact_audit_params(params.as_ref());

    let response = match method.as_str() {
        "initialize" => {
            let protocol_version = match negotiate_protocol_version(params.as_ref()) {
                Ok(version) => version,
                Err(err) => return app_error_to_json_rpc(id, err),
            };

            let initialize_result = InitializeResult {
                server_info: Implementation {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    title: Some(SERVER_TITLE.to_string()),
                    description: None,
                    icons: vec![],
                    website_url: None,
                },
                capabilities: ServerCapabilities {
                    tools: Some(ServerCapabilitiesTools {
                        list_changed: Some(false),
                    }),
                    resources: Some(ServerCapabilitiesResources {
                        subscribe: Some(false),
                        list_changed: Some(false),
                    }),
                    prompts: None,
                    ..Default::default()
                },
                protocol_version: protocol_version.into(),
                instructions: Some(INSTRUCTIONS.to_string()),
                meta: None,
            };

            json_rpc_result(
                id,
                serde_json::to_value(initialize_result).expect("initialize result serialization"),
            )
        }
        "ping" => json_rpc_result(id, json!({})),
        "tools/list" => json_rpc_result(
            id,
            serde_json::to_value(ListToolsResult {
                meta: None,
                next_cursor: None,
                tools: build_tools_list(),
            })
            .expect("tools list result serialization"),
        ),
        "tools/call" => handle_tools_call(state, id, params).await,
        "resources/list" => json_rpc_result(
            id,
            serde_json::to_value(ListResourcesResult {
                meta: None,
                next_cursor: None,
                resources: build_resources_list(),
            })
            .expect("resources list result serialization"),
        ),
        "resources/read" => handle_resources_read(state, id, params).await,
        "invoke" => handle_legacy_invoke(state, id, params).await,
        _ => json_rpc_error(id, -32601, "Method not found"),
    };

    info!(
        method = %method,
        params = %audit_params,
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

/// Accepts any offered version and answers with the one this server speaks.
/// `protocolVersion` may be omitted; when given it must be a non-empty string.
pub fn negotiate_protocol_version(params: Option<&Value>) -> Result<ProtocolVersion, AppError> {
    let offered = params
        .and_then(Value::as_object)
        .and_then(|object| object.get("protocolVersion"));

    match offered {
        None | Some(Value::Null) => {}
        Some(Value::String(version)) if !version.trim().is_empty() => {
            if version.trim() != SUPPORTED_PROTOCOL_VERSION {
                debug!(offered = %version, "client offered a different protocol version");
            }
        }
        Some(_) => {
            return Err(AppError::bad_request(
                "invalid_protocol_version",
                "initialize params.protocolVersion must be a non-empty string",
            ))
        }
    }

    Ok(ProtocolVersion::V2024_11_05)
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else if key == "conteudo" {
                        (key.clone(), redact_content(item))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

/// File bodies are logged by size only.
fn redact_content(value: &Value) -> Value {
    match value {
        Value::String(content) => Value::String(format!("[{} bytes]", content.len())),
        Value::Null => Value::Null,
        _ => Value::String("[REDACTED]".to_string()),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "token"
            | "api_token"
            | "access_token"
            | "refresh_token"
            | "authorization"
            | "bearer"
            | "password"
            | "secret"
            | "credentials"
            | "credential"
            | "api_key"
            | "apikey"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}
