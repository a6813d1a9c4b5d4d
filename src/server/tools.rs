//! Tool handlers backed by the shared cache context

use std::time::Instant;

use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::protocol::{RpcError, ToolDefinition, ToolResult};
use crate::cache::CacheContext;
use crate::client::Application;

pub const LIST_CLUSTERS: &str = "argocd_list_clusters";
pub const LIST_APPLICATIONS: &str = "argocd_list_applications";
pub const INVALIDATE_CACHE: &str = "argocd_invalidate_cache";

/// Filters for `argocd_list_applications`; empty values match everything
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListApplicationsInput {
    pub project: Option<String>,
    pub namespace: Option<String>,
    pub cluster: Option<String>,
}

#[derive(Serialize)]
struct ListOutput<'a, T> {
    items: Vec<&'a T>,
}

/// Tools advertised by `tools/list`
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: LIST_CLUSTERS,
            description: "List Argo CD clusters",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: LIST_APPLICATIONS,
            description: "List Argo CD applications, optionally filtered by project, namespace or destination cluster",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project": { "type": "string", "description": "optional project filter" },
                    "namespace": { "type": "string", "description": "optional namespace filter" },
                    "cluster": { "type": "string", "description": "optional destination cluster server URL filter" }
                }
            }),
        },
        ToolDefinition {
            name: INVALIDATE_CACHE,
            description: "Drop cached Argo CD data so the next listing fetches fresh results",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

/// Dispatch a `tools/call`.
///
/// Upstream failures come back as a tool result with `is_error`; only an
/// unknown tool or malformed arguments are protocol errors.
pub async fn call(ctx: &CacheContext, name: &str, arguments: Value) -> Result<ToolResult, RpcError> {
    let started = Instant::now();

    let result = match name {
        LIST_CLUSTERS => list_clusters(ctx).await,
        LIST_APPLICATIONS => {
            let input = parse_arguments::<ListApplicationsInput>(arguments)?;
            list_applications(ctx, &input).await
        }
        INVALIDATE_CACHE => invalidate_cache(ctx),
        other => return Err(RpcError::invalid_params(format!("Unknown tool: {}", other))),
    };

    info!("{} completed in {:?}", name, started.elapsed());
    Ok(result)
}

fn parse_arguments<T: Default + for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, RpcError> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(arguments).map_err(RpcError::invalid_params)
}

async fn list_clusters(ctx: &CacheContext) -> ToolResult {
    match ctx.get_or_refresh_clusters().await {
        Ok(entry) => {
            info!("Returning {} clusters", entry.items.len());
            ToolResult::json(&ListOutput {
                items: entry.items.iter().collect(),
            })
        }
        Err(e) => {
            error!("{} failed: {}", LIST_CLUSTERS, e);
            ToolResult::error(e.to_string())
        }
    }
}

async fn list_applications(ctx: &CacheContext, input: &ListApplicationsInput) -> ToolResult {
    match ctx.get_or_refresh_applications().await {
        Ok(entry) => {
            let items = filter_applications(&entry.items, input);
            info!(
                "Returning {} of {} applications",
                items.len(),
                entry.items.len()
            );
            ToolResult::json(&ListOutput { items })
        }
        Err(e) => {
            error!("{} failed: {}", LIST_APPLICATIONS, e);
            ToolResult::error(e.to_string())
        }
    }
}

fn invalidate_cache(ctx: &CacheContext) -> ToolResult {
    let invalidated = ctx.invalidate_all();
    info!("Invalidated caches: {:?}", invalidated);
    ToolResult::json(&json!({ "invalidated": invalidated }))
}

/// Keep applications matching every non-empty filter
pub fn filter_applications<'a>(
    apps: &'a [Application],
    input: &ListApplicationsInput,
) -> Vec<&'a Application> {
    let project = non_empty(&input.project);
    let namespace = non_empty(&input.namespace);
    let cluster = non_empty(&input.cluster);

    apps.iter()
        .filter(|app| project.is_none_or(|p| app.spec.project == p))
        .filter(|app| namespace.is_none_or(|ns| app.metadata.namespace.as_deref() == Some(ns)))
        .filter(|app| cluster.is_none_or(|c| app.spec.destination.server.as_deref() == Some(c)))
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
