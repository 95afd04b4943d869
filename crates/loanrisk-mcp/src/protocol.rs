use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Successful `tools/call` result with a text summary and structured payload.
    pub fn tool_output(id: Value, summary: impl Into<String>, structured: Value) -> Self {
        Self::success(
            id,
            json!({
                "content": [{"type": "text", "text": summary.into()}],
                "structuredContent": structured
            }),
        )
    }

    /// `tools/call` result flagged `isError`; the call itself was well-formed.
    pub fn tool_failure(id: Value, code: &str, message: impl Into<String>, detail: Value) -> Self {
        let message = message.into();
        Self::success(
            id,
            json!({
                "content": [{"type": "text", "text": message}],
                "isError": true,
                "structuredContent": {
                    "code": code,
                    "message": message,
                    "detail": detail
                }
            }),
        )
    }

    #[must_use]
    pub fn with_id(mut self, id: Value) -> Self {
        self.id = id;
        self
    }
}
