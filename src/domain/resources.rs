//! Model Context Protocol resources
//!
//! Read-only GitHub snapshots under `resource://github/` URIs.

use chrono::{SecondsFormat, Utc};
use rust_mcp_sdk::schema::{
    ReadResourceContent, ReadResourceRequestParams, ReadResourceResult, Resource,
    TextResourceContents,
};
use serde_json::{json, Value};

use crate::domain::operations;
use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, json_rpc_result,
};
use crate::AppState;

pub const CONNECTION_RESOURCE_URI: &str = "resource://github/connection";
pub const REPOSITORIES_RESOURCE_URI: &str = "resource://github/repositories";

fn json_resource(uri: &str, name: &str, description: &str) -> Resource {
    Resource {
        annotations: None,
        description: Some(description.to_string()),
        icons: vec![],
        meta: None,
        mime_type: Some("application/json".to_string()),
        name: name.to_string(),
        size: None,
        title: None,
        uri: uri.to_string(),
    }
}

pub fn build_resources_list() -> Vec<Resource> {
    vec![
        json_resource(
            CONNECTION_RESOURCE_URI,
            "GitHub Connection",
            "Account the configured GitHub token authenticates as",
        ),
        json_resource(
            REPOSITORIES_RESOURCE_URI,
            "GitHub Repositories",
            "Repositories of the authenticated account, most recently updated first",
        ),
    ]
}

fn read_result(id: Option<Value>, uri: &str, mut content: Value) -> Value {
    if let Value::Object(fields) = &mut content {
        fields.insert(
            "generated_at_utc".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }

    let result = serde_json::to_value(ReadResourceResult {
        contents: vec![ReadResourceContent::from(TextResourceContents {
            meta: None,
            mime_type: Some("application/json".to_string()),
            text: content.to_string(),
            uri: uri.to_string(),
        })],
        meta: None,
    })
    .expect("read resource result serialization");

    json_rpc_result(id, result)
}

pub async fn handle_resources_read(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, -32602, "Invalid params");
    };

    let resource_read: ReadResourceRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
    };

    let github = state.github.as_ref();

    match resource_read.uri.as_str() {
        CONNECTION_RESOURCE_URI => match operations::test_connection(github).await {
            Ok(user) => read_result(id, CONNECTION_RESOURCE_URI, json!({ "usuario": user })),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        REPOSITORIES_RESOURCE_URI => match operations::list_repositories(github, None).await {
            Ok(repositories) => read_result(
                id,
                REPOSITORIES_RESOURCE_URI,
                json!({ "repositorios": repositories }),
            ),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        _ => json_rpc_error_with_data(
            id,
            -32601,
            "Method not found",
            Some(json!({
                "code": "resource_not_found",
                "message": "unknown resource uri",
                "details": {
                    "uri": resource_read.uri,
                },
            })),
        ),
    }
}
