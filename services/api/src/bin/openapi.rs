//! services/api/src/bin/openapi.rs
//!
//! Exports the daily goals REST contract as JSON.
//!
//! Usage: `openapi [OUTPUT]`, where OUTPUT defaults to `openapi.json`.

use api_lib::error::ApiError;
use api_lib::web::rest::ApiDoc;
use std::path::{Path, PathBuf};
use tracing::info;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn export(output: &Path) -> Result<usize, ApiError> {
    let doc = ApiDoc::openapi();
    let route_count = doc.paths.paths.len();
    let json = doc
        .to_pretty_json()
        .map_err(|e| ApiError::Internal(format!("Failed to serialize OpenAPI document: {}", e)))?;

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(output, json)?;
    Ok(route_count)
}

fn main() -> Result<(), ApiError> {
    tracing_subscriber::fmt().with_target(false).init();

    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let route_count = export(&output)?;
    info!(path = %output.display(), route_count, "OpenAPI document exported");
    Ok(())
}
