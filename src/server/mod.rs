//! Stdio server
//!
//! Newline-delimited JSON-RPC over stdin/stdout. Every request runs on its own
//! task against the shared [`CacheContext`]; a single writer emits responses
//! in completion order.

pub mod protocol;
pub mod tools;

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::cache::CacheContext;
use crate::error::Result;
use protocol::{CallToolParams, PROTOCOL_VERSION, Request, Response, RpcError};

pub const SERVER_NAME: &str = "argocd-mcp";

/// Serve requests from stdin until it closes
pub async fn run_stdio(ctx: Arc<CacheContext>) -> Result<()> {
    serve(ctx, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve requests read line by line from `reader`, writing responses to `writer`.
///
/// Returns once the reader hits EOF and every in-flight request has answered.
pub async fn serve<R, W>(ctx: Arc<CacheContext>, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let mut tx = Some(tx);
    let mut reader = reader;
    // Lines are read as raw bytes so invalid UTF-8 gets a parse error reply
    let mut buf = Vec::new();

    info!("Serving on stdio for {}", ctx.endpoint());

    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf), if tx.is_some() => {
                if read? == 0 {
                    debug!("Input closed, draining in-flight requests");
                    tx = None;
                } else {
                    let line = std::mem::take(&mut buf);
                    if let Some(tx) = &tx
                        && !line.iter().all(u8::is_ascii_whitespace)
                    {
                        let tx = tx.clone();
                        let ctx = Arc::clone(&ctx);
                        tokio::spawn(async move {
                            if let Some(response) = handle_line(&ctx, &line).await {
                                let _ = tx.send(response);
                            }
                        });
                    }
                }
            },
            response = rx.recv() => match response {
                Some(response) => write_message(&mut writer, &response).await?,
                None => break,
            },
        }
    }

    writer.flush().await?;
    info!("Server stopped");
    Ok(())
}

async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let mut data = serde_json::to_vec(response)?;
    data.push(b'\n');
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

async fn handle_line(ctx: &CacheContext, line: &[u8]) -> Option<Response> {
    match std::str::from_utf8(line) {
        Ok(text) => handle_message(ctx, text).await,
        Err(e) => {
            warn!("Message is not valid UTF-8: {}", e);
            Some(Response::failure(Value::Null, RpcError::parse_error(e)))
        }
    }
}

/// Handle one inbound line; notifications produce no response.
pub async fn handle_message(ctx: &CacheContext, line: &str) -> Option<Response> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unparsable message: {}", e);
            return Some(Response::failure(Value::Null, RpcError::parse_error(e)));
        }
    };

    let id = value.get("id").cloned();
    let request: Request = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Some(Response::failure(
                id.unwrap_or(Value::Null),
                RpcError::invalid_request(e),
            ));
        }
    };

    let Some(id) = request.id else {
        debug!("Notification: {}", request.method);
        return None;
    };

    debug!("Request {}: {}", id, request.method);
    let outcome = match request.method.as_str() {
        "initialize" => Ok(initialize(&request.params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tools::definitions() })),
        "tools/call" => call_tool(ctx, request.params).await,
        other => Err(RpcError::method_not_found(other)),
    };

    Some(match outcome {
        Ok(result) => Response::success(id, result),
        Err(error) => Response::failure(id, error),
    })
}

fn initialize(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);

    json!({
        "protocolVersion": version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
    })
}

async fn call_tool(ctx: &CacheContext, params: Value) -> std::result::Result<Value, RpcError> {
    let params: CallToolParams = serde_json::from_value(params).map_err(RpcError::invalid_params)?;
    let result = tools::call(ctx, &params.name, params.arguments).await?;
    serde_json::to_value(result).map_err(|e| RpcError::invalid_params(e.to_string()))
}
