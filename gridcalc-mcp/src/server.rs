//! Request dispatch and tool implementations
//!
//! Tools:
//! - compute: Call a matrix function, optionally storing the result by name
//! - help: Documentation for one function, or an index of all of them
//! - list_functions: Functions with their usage, optionally by category

use std::sync::Arc;
use gridcalc_core::Value;
use gridcalc_plugin::{EvalContext, PluginRegistry};
use serde_json::{json, Map, Number as JsonNumber, Value as JsonValue};
use tracing::{debug, info};
use crate::config::ServerConfig;
use crate::protocol::{McpError, McpRequest, McpResponse};

pub const PROTOCOL_VERSION: &str = "2025-11-25";
pub const SERVER_NAME: &str = "gridcalc";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix marking an argument as a reference to a stored result
const VAR_PREFIX: char = '$';

/// One client session. Stored results live in the session's context.
pub struct Server {
    ctx: EvalContext,
}

impl Server {
    pub fn new(registry: Arc<PluginRegistry>, config: ServerConfig) -> Self {
        let ctx = EvalContext::new(registry)
            .with_precision(config.precision)
            .with_cell_policy(config.cell_policy);
        Self { ctx }
    }

    pub fn handle_request(&mut self, request: &McpRequest) -> McpResponse {
        let result = match request.method.as_str() {
            // Lifecycle
            "initialize" => handle_initialize(&request.params),
            "initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => Ok(tools_list()),
            "tools/call" => self.handle_tool_call(&request.params),

            _ => Err(McpError::method_not_found(&request.method)),
        };

        match result {
            Ok(r) => McpResponse::success(request.id.clone(), r),
            Err(e) => McpResponse::failure(request.id.clone(), e),
        }
    }

    fn handle_tool_call(&mut self, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
        let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

        let name = params.get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

        let args = params.get("arguments").cloned().unwrap_or(json!({}));

        match name {
            "compute" => self.tool_compute(&args),
            "help" => Ok(self.tool_help(&args)),
            "list_functions" => Ok(self.tool_list_functions(&args)),
            _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
        }
    }

    fn tool_compute(&mut self, args: &JsonValue) -> Result<JsonValue, McpError> {
        let function = args.get("function")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing function argument")
                .with_data(json!({ "available": self.ctx.registry.function_names() })))?;

        let call_args: Vec<Value> = match args.get("args") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items.iter().map(|a| self.resolve_arg(a)).collect(),
            Some(_) => return Err(McpError::invalid_params("args must be an array")),
        };

        let store_as = match args.get("store_as") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) if is_valid_name(s) => Some(s.as_str()),
            Some(_) => return Err(McpError::invalid_params(
                "store_as must be a name made of letters, digits and underscores",
            )),
        };

        // An unresolved reference short-circuits the call
        let result = match call_args.iter().find(|v| v.is_error()) {
            Some(err) => err.clone(),
            None => self.ctx.call(function, &call_args),
        };

        let is_error = result.is_error();
        let stored = match store_as {
            Some(name) if !is_error => {
                debug!(name, "storing result");
                self.ctx.set_var(name, result.clone());
                Some(name)
            }
            _ => None,
        };

        Ok(json!({
            "content": [{ "type": "text", "text": self.ctx.render(&result) }],
            "value": value_to_json(&result),
            "stored": stored,
            "isError": is_error
        }))
    }

    /// `"$name"` reads a stored result; everything else converts as-is
    fn resolve_arg(&self, arg: &JsonValue) -> Value {
        match arg.as_str().and_then(|s| s.strip_prefix(VAR_PREFIX)) {
            Some(name) => self.ctx.get_var(name),
            None => json_to_value(arg),
        }
    }

    fn tool_help(&self, args: &JsonValue) -> JsonValue {
        let name = args.get("name").and_then(|v| v.as_str());
        let help = self.ctx.registry.help(name);

        json!({
            "content": [{ "type": "text", "text": format_help(&help) }],
            "data": value_to_json(&help),
            "isError": help.is_error()
        })
    }

    fn tool_list_functions(&self, args: &JsonValue) -> JsonValue {
        let category = args.get("category").and_then(|v| v.as_str());
        let functions = self.ctx.registry.list_functions(category);

        let lines: Vec<String> = functions.as_list().unwrap_or_default().iter()
            .filter_map(|f| {
                let usage = f.get("usage");
                let description = f.get("description");
                Some(format!("- `{}`: {}", usage.as_text()?, description.as_text()?))
            })
            .collect();
        let text = if lines.is_empty() { "No functions found".to_string() } else { lines.join("\n") };

        json!({
            "content": [{ "type": "text", "text": text }],
            "data": value_to_json(&functions)
        })
    }
}

fn is_valid_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params.as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params.as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Matrix calculator: arithmetic, determinant, trace, inverse"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Use 'compute' to call matrix functions such as matmul, determinant or inverse. Matrices are nested arrays of numbers or text like \"1 2; 3 4\". Pass store_as to keep a result and refer to it later as \"$name\"."
    }))
}

fn tools_list() -> JsonValue {
    json!({
        "tools": [
            {
                "name": "compute",
                "description": "Call a matrix function. Results can be stored by name and passed to later calls as \"$name\".",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "function": {
                            "type": "string",
                            "description": "Function name, e.g. matmul, determinant, inverse"
                        },
                        "args": {
                            "type": "array",
                            "description": "Arguments: nested arrays of numbers, text matrices, numbers, or \"$name\" references"
                        },
                        "store_as": {
                            "type": "string",
                            "description": "Store the result under this name"
                        }
                    },
                    "required": ["function"]
                }
            },
            {
                "name": "help",
                "description": "Get documentation for a function, or an index of all functions.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Function name. Omit for general help."
                        }
                    }
                }
            },
            {
                "name": "list_functions",
                "description": "List all available functions, optionally by category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Filter by category",
                            "enum": [
                                "matrix/construct",
                                "matrix/arithmetic",
                                "matrix/properties",
                                "matrix/decomposition"
                            ]
                        }
                    }
                }
            }
        ]
    })
}

fn format_help(help: &Value) -> String {
    match help {
        Value::Object(map) => {
            let mut out = String::new();
            if let Some(Value::Text(n)) = map.get("name") { out.push_str(&format!("# {}\n\n", n)); }
            if let Some(Value::Text(d)) = map.get("description") { out.push_str(&format!("{}\n\n", d)); }
            if let Some(Value::Text(u)) = map.get("usage") { out.push_str(&format!("**Usage:** `{}`\n\n", u)); }
            if let Some(Value::List(examples)) = map.get("examples") {
                for ex in examples.iter().filter_map(Value::as_text) {
                    out.push_str(&format!("- `{}`\n", ex));
                }
            }
            if let Some(Value::Object(cats)) = map.get("functions") {
                let mut cats: Vec<_> = cats.iter().collect();
                cats.sort_by(|a, b| a.0.cmp(b.0));
                for (cat, names) in cats {
                    let names: Vec<&str> = names.as_list().unwrap_or_default()
                        .iter()
                        .filter_map(Value::as_text)
                        .collect();
                    out.push_str(&format!("**{}:** {}\n", cat, names.join(", ")));
                }
            }
            if let Some(Value::Text(h)) = map.get("hint") { out.push_str(&format!("\n{}\n", h)); }
            out.trim_end().to_string()
        }
        Value::Error(e) => format!("Error: {}", e.message),
        _ => help.to_string(),
    }
}

pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_f64() {
            Some(x) => Value::Number(x),
            None => Value::Text(n.to_string()),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(arr) => Value::List(arr.iter().map(json_to_value).collect()),
        JsonValue::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect()),
    }
}

pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::List(l) => JsonValue::Array(l.iter().map(value_to_json).collect()),
        Value::Object(o) => JsonValue::Object(o.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect::<Map<_, _>>()),
        Value::Error(e) => json!({"_error": {
            "code": e.code,
            "message": e.message,
            "suggestion": e.suggestion,
            "severity": e.severity,
        }}),
    }
}

/// JSON has no NaN or infinity, so those travel as strings
fn number_to_json(n: f64) -> JsonValue {
    match JsonNumber::from_f64(n) {
        Some(num) => JsonValue::Number(num),
        None if n.is_nan() => JsonValue::String("NaN".to_string()),
        None if n > 0.0 => JsonValue::String("inf".to_string()),
        None => JsonValue::String("-inf".to_string()),
    }
}
