use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

const DEFAULT_JSON_RPC_VERSION: &str = "2.0";

/// Request envelope accepted on the wire and forwarded to the archive.
///
/// Field presence is enforced by deserialization; beyond that the envelope
/// is not validated (the archive is the authority on method semantics).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Map<String, Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: String, params: Map<String, Value>, id: u64) -> Self {
        Self {
            jsonrpc: DEFAULT_JSON_RPC_VERSION.to_string(),
            method,
            params,
            id,
        }
    }
}

/// Error envelope returned when a request never reaches a usable upstream
/// body. Successful bodies are passed through verbatim and never re-wrapped.
#[derive(Serialize, Clone)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub error: DefinedError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<u64>, error: DefinedError) -> Self {
        Self {
            jsonrpc: DEFAULT_JSON_RPC_VERSION.to_string(),
            id,
            error,
        }
    }
}

impl From<JsonRpcErrorResponse> for HttpResponse {
    fn from(val: JsonRpcErrorResponse) -> Self {
        HttpResponse::Ok().json(val)
    }
}

impl From<JsonRpcErrorResponse> for Result<HttpResponse, actix_web::Error> {
    fn from(val: JsonRpcErrorResponse) -> Self {
        Ok(val.into())
    }
}

/// Source: https://www.jsonrpc.org/specification
#[derive(Debug, Clone)]
pub enum DefinedError {
    InvalidJson,

    InvalidRequest,

    InternalError(Option<Value>),
}

impl DefinedError {
    pub fn code_and_message(&self) -> (i64, String) {
        match self {
            DefinedError::InvalidJson => (-32700, "Invalid JSON".to_string()),
            DefinedError::InvalidRequest => {
                (-32600, "JSON is not a valid request object".to_string())
            }
            DefinedError::InternalError(_) => (-32603, "Internal JSON-RPC error".to_string()),
        }
    }

    pub fn data(&self) -> &Option<Value> {
        match self {
            DefinedError::InvalidJson => &None,
            DefinedError::InvalidRequest => &None,
            DefinedError::InternalError(err) => err,
        }
    }
}

impl Serialize for DefinedError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (code, message) = self.code_and_message();

        let mut error = serde_json::Map::new();

        error.insert("code".to_string(), Value::Number(Number::from(code)));
        error.insert("message".to_string(), Value::String(message));

        if let Some(data) = self.data() {
            error.insert("data".to_string(), data.clone());
        }

        error.serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_envelope_roundtrip() {
        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "validators.get_next_epoch_set",
            "params": {"size": 200},
            "id": 1
        }))
        .unwrap();

        assert_eq!(request.method, "validators.get_next_epoch_set");
        assert_eq!(request.params["size"], json!(200));
        assert_eq!(request.id, 1);

        let serialized = serde_json::to_value(&request).unwrap();
        assert_eq!(
            serialized,
            json!({
                "jsonrpc": "2.0",
                "method": "validators.get_next_epoch_set",
                "params": {"size": 200},
                "id": 1
            })
        );
    }

    #[test]
    fn test_request_requires_all_fields() {
        let missing_params = json!({
            "jsonrpc": "2.0",
            "method": "tokens.get_info",
            "id": 7
        });

        assert!(serde_json::from_value::<JsonRpcRequest>(missing_params).is_err());
    }

    #[test]
    fn test_new_applies_protocol_version() {
        let request = JsonRpcRequest::new("network.get_id".to_string(), Map::new(), 3);
        assert_eq!(request.jsonrpc, "2.0");
    }

    #[test]
    fn test_error_response_shape() {
        let response = JsonRpcErrorResponse::new(Some(4), DefinedError::InvalidRequest);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "error": {
                    "code": -32600,
                    "message": "JSON is not a valid request object"
                }
            })
        );
    }

    #[test]
    fn test_internal_error_carries_data() {
        let error = DefinedError::InternalError(Some(json!({"reason": "boom"})));

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "code": -32603,
                "message": "Internal JSON-RPC error",
                "data": {"reason": "boom"}
            })
        );
    }
}
