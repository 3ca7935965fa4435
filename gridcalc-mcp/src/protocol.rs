//! JSON-RPC message types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    /// `None` only when the member is absent; `"id": null` is `Some(Null)`
    #[serde(default, deserialize_with = "deserialize_present")]
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

impl McpRequest {
    /// Parse one input line. Malformed JSON is a parse error; well-formed JSON
    /// that is not a request object is an invalid request. The `Err` side is
    /// the response to send back.
    pub fn parse(line: &str) -> Result<McpRequest, McpResponse> {
        let json: JsonValue = serde_json::from_str(line)
            .map_err(|e| McpResponse::failure(Some(JsonValue::Null), McpError::parse_error(e)))?;

        if !json.is_object() {
            return Err(McpResponse::failure(
                Some(JsonValue::Null),
                McpError::invalid_request("expected a request object"),
            ));
        }
        let id = json.get("id").cloned().or(Some(JsonValue::Null));
        let request: McpRequest = serde_json::from_value(json)
            .map_err(|e| McpResponse::failure(id.clone(), McpError::invalid_request(e)))?;

        if request.jsonrpc != "2.0" {
            return Err(McpResponse::failure(
                id,
                McpError::invalid_request(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
            ));
        }
        Ok(request)
    }

    /// Requests without an id are notifications and get no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    pub fn failure(id: Option<JsonValue>, error: McpError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl McpError {
    pub fn parse_error(details: impl std::fmt::Display) -> Self {
        Self { code: PARSE_ERROR, message: format!("Parse error: {}", details), data: None }
    }

    pub fn invalid_request(details: impl std::fmt::Display) -> Self {
        Self { code: INVALID_REQUEST, message: format!("Invalid request: {}", details), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self { code: METHOD_NOT_FOUND, message: format!("Method not found: {}", method), data: None }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: INVALID_PARAMS, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let request = McpRequest::parse(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#).unwrap();
        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(request.method, "tools/list");
        assert!(!request.is_notification());
    }

    #[test]
    fn test_absent_id_is_notification() {
        let request = McpRequest::parse(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn test_null_id_is_not_notification() {
        let request = McpRequest::parse(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(JsonValue::Null));
        assert!(!request.is_notification());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let response = McpRequest::parse("{not json").unwrap_err();
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
        assert_eq!(response.id, Some(JsonValue::Null));
    }

    #[test]
    fn test_non_request_json_is_invalid_request() {
        for line in ["[]", r#"["2.0", 1, "ping"]"#, "42", r#"{"id":3,"method":"ping"}"#, r#"{"jsonrpc":"2.0","id":3}"#, r#"{"jsonrpc":"2.0","id":3,"method":5}"#] {
            let response = McpRequest::parse(line).unwrap_err();
            assert_eq!(response.error.unwrap().code, INVALID_REQUEST, "{}", line);
        }
    }

    #[test]
    fn test_invalid_request_keeps_id() {
        let response = McpRequest::parse(r#"{"jsonrpc":"2.0","id":"a1"}"#).unwrap_err();
        assert_eq!(response.id, Some(json!("a1")));
    }

    #[test]
    fn test_wrong_version_is_invalid_request() {
        let response = McpRequest::parse(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#).unwrap_err();
        assert_eq!(response.id, Some(json!(1)));
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn test_null_id_serialized_in_response() {
        let response = McpResponse::failure(Some(JsonValue::Null), McpError::parse_error("eof"));
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains(r#""id":null"#));
    }
}
