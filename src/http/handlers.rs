//! Axum HTTP handlers for the web server
//!
//! Provides the Model Context Protocol endpoint, the status document and the
//! discovery documents.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::mcp::rpc::json_rpc_error;
use crate::mcp::server::{handle_json_rpc_value, SUPPORTED_PROTOCOL_VERSION};
use crate::AppState;

pub const SERVICE_NAME: &str = "MCP Git API";
const SERVICE_DESCRIPTION: &str = "GitHub integration over the Model Context Protocol";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
    pub openapi_endpoint: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusEndpoints {
    pub mcp: String,
    pub openapi: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub protocol: &'static str,
    pub server: String,
    pub environment: String,
    pub endpoints: StatusEndpoints,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let base_url = state.base_url.as_ref();

    Json(StatusResponse {
        status: "online",
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        protocol: "MCP",
        server: base_url.to_string(),
        environment: state.environment.to_string(),
        endpoints: StatusEndpoints {
            mcp: format!("{base_url}/mcp"),
            openapi: format!("{base_url}/.well-known/openapi.json"),
            status: format!("{base_url}/"),
        },
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
        openapi_endpoint: "/.well-known/openapi.json",
    })
}

pub async fn openapi(State(state): State<AppState>) -> Json<Value> {
    Json(openapi_document(&state.base_url))
}

/// OpenAPI 3.1 description of the HTTP surface with the `x-mcp-*` extensions
/// MCP clients look for. Lists exactly one server.
pub fn openapi_document(base_url: &str) -> Value {
    let json_object = json!({
        "content": {
            "application/json": {
                "schema": { "type": "object" }
            }
        }
    });

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "description": SERVICE_DESCRIPTION,
            "x-mcp-version": SUPPORTED_PROTOCOL_VERSION,
            "x-mcp-protocol": true,
            "x-mcp-server": {
                "name": SERVICE_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "protocol": "mcp",
                "url": base_url,
            },
        },
        "servers": [
            {
                "url": base_url,
                "description": "MCP Git API Server",
            }
        ],
        "paths": {
            "/": {
                "get": {
                    "tags": ["Status"],
                    "summary": "Service status",
                    "responses": { "200": json_object.clone() },
                }
            },
            "/health": {
                "get": {
                    "tags": ["Status"],
                    "summary": "Liveness probe",
                    "responses": { "200": json_object.clone() },
                }
            },
            "/.well-known/mcp": {
                "get": {
                    "tags": ["MCP"],
                    "summary": "MCP discovery document",
                    "responses": { "200": json_object.clone() },
                }
            },
            "/mcp": {
                "options": {
                    "tags": ["MCP"],
                    "summary": "CORS preflight",
                    "responses": { "200": json_object.clone() },
                },
                "post": {
                    "tags": ["MCP"],
                    "summary": "JSON-RPC 2.0 endpoint",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "oneOf": [
                                        { "$ref": "#/components/schemas/JsonRpcRequest" },
                                        {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/JsonRpcRequest" }
                                        }
                                    ]
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": json_object,
                        "204": { "description": "Only notifications were sent" },
                        "401": { "description": "Missing or invalid bearer token" },
                        "403": { "description": "Client address not allowed" },
                    },
                }
            },
        },
        "components": {
            "schemas": {
                "JsonRpcRequest": {
                    "type": "object",
                    "required": ["jsonrpc", "method"],
                    "properties": {
                        "jsonrpc": { "type": "string", "const": "2.0" },
                        "id": { "type": ["string", "integer"] },
                        "method": { "type": "string" },
                        "params": { "type": "object" },
                    },
                }
            },
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer" }
            },
        },
    })
}

pub async fn mcp_options() -> Response {
    (
        StatusCode::OK,
        [(header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS")],
        Json(json!({ "message": "OK" })),
    )
        .into_response()
}

pub async fn mcp_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(json_rpc_error(None, -32700, "Parse error")),
            )
                .into_response()
        }
    };

    if let Some(batch) = payload.as_array() {
        if batch.is_empty() {
            return (
                StatusCode::OK,
                Json(vec![json_rpc_error(None, -32600, "Invalid Request")]),
            )
                .into_response();
        }

        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = handle_json_rpc_value(&state, item.clone()).await {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            return StatusCode::NO_CONTENT.into_response();
        }

        return (StatusCode::OK, Json(Value::Array(responses))).into_response();
    }

    match handle_json_rpc_value(&state, payload).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
