//! Report data-shape problems in an index.

use super::{describe, resolve_index};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ValidateRequest {
    /// Validate this index file instead of the active one
    #[serde(default)]
    pub index: Option<String>,
}

pub async fn handle_validate(
    state: &Arc<IndexState>,
    request: ValidateRequest,
) -> Result<String, String> {
    let loaded = resolve_index(state, request.index.as_deref()).await?;
    let report = loaded.index.validate();
    Ok(format!("Validation of {}\n\n{}", describe(&loaded), report))
}
