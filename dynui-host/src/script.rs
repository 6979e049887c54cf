//! JSON-lines replay scripts.
//!
//! ```text
//! {"function": "get_loyalty_points", "result": {"success": true, "data": {"points": 120}}}
//! # comment lines and blank lines are skipped
//! {"function": "add_to_cart", "result": {"success": true, "data": {"items": []}}, "delay_ms": 250}
//! ```

use crate::{HostError, HostHandle, HostResult};
use dynui_types::FunctionResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub function: String,
    pub result: FunctionResult,
    /// Pause before this completion is submitted.
    #[serde(default)]
    pub delay_ms: u64,
}

/// Parses a script. Line numbers in errors are 1-based.
pub fn parse_script(contents: &str) -> HostResult<Vec<ScriptLine>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| HostError::Script {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Submits every line in order, honoring delays. Returns how many were sent.
pub async fn replay(handle: &HostHandle, lines: &[ScriptLine]) -> HostResult<usize> {
    for (index, line) in lines.iter().enumerate() {
        if line.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(line.delay_ms)).await;
        }
        debug!(step = index + 1, function = %line.function, "Replaying completion");
        handle.submit(line.function.clone(), line.result.clone()).await?;
    }
    Ok(lines.len())
}
