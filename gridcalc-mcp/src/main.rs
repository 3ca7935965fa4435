//! gridcalc MCP Server
//!
//! Line-delimited JSON-RPC over stdin/stdout. Logs go to stderr; set
//! `RUST_LOG` to change the level.
//!
//! Tools:
//! - compute: Call a matrix function (matmul, determinant, inverse, ...)
//! - help: Get documentation for functions
//! - list_functions: List available functions

mod config;
mod logging;
mod protocol;
mod server;

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use gridcalc_plugin::PluginRegistry;
use tracing::{debug, error, info, warn};
use crate::config::ServerConfig;
use crate::protocol::{McpRequest, McpResponse};
use crate::server::{Server, PROTOCOL_VERSION, SERVER_VERSION};

fn main() {
    if let Err(e) = logging::init_tracing() {
        eprintln!("failed to initialise logging: {}", e);
    }

    let config = ServerConfig::from_env();
    let registry = Arc::new(gridcalc_matrix::load_matrix_library(PluginRegistry::new()));
    let mut server = Server::new(registry.clone(), config);

    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "gridcalc MCP server started");
    info!(
        precision = config.precision,
        cell_policy = ?config.cell_policy,
        functions = registry.function_names().len(),
        "configuration loaded"
    );
    debug!(
        stdin_terminal = io::stdin().is_terminal(),
        stdout_terminal = io::stdout().is_terminal(),
        "stdio"
    );

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!(bytes = line.len(), "received request");

                let request = match McpRequest::parse(line) {
                    Ok(r) => r,
                    Err(response) => {
                        warn!(error = ?response.error, "rejected request");
                        if let Err(e) = write_response(&response) {
                            error!(error = %e, "failed to write response");
                            break;
                        }
                        continue;
                    }
                };

                debug!(method = %request.method, "processing");

                let response = server.handle_request(&request);

                if request.is_notification() {
                    debug!(method = %request.method, "notification processed (no response)");
                    continue;
                }

                if let Err(e) = write_response(&response) {
                    error!(error = %e, "failed to write response");
                    break;
                }

                debug!(method = %request.method, "sent response");
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }

    info!("server shutting down");
}

/// Write one response line to stdout and flush it
fn write_response(response: &McpResponse) -> io::Result<()> {
    let json = serde_json::to_string(response)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}
