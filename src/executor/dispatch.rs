//! Runs model-requested tool calls and records their outcomes.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::tools::ToolInvoker;
use crate::types::{ToolCall, ToolCallResult};

/// Invoke each call in order. Failures are recorded, never raised.
pub async fn dispatch_tool_calls(
    tools: &dyn ToolInvoker,
    cancel: &CancellationToken,
    calls: &[ToolCall],
) -> Vec<ToolCallResult> {
    let mut outcomes = Vec::with_capacity(calls.len());
    for call in calls {
        let start = Instant::now();
        let invoked = tools.invoke(cancel, &call.name, &call.input).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (success, result, error) = match invoked {
            Err(e) => {
                warn!(tool = %call.name, duration_ms, error = %e, "tool call errored");
                (false, None, Some(e.to_string()))
            }
            Ok(r) if !r.success => {
                debug!(tool = %call.name, duration_ms, "tool reported failure");
                (false, None, r.error)
            }
            Ok(r) => {
                debug!(tool = %call.name, duration_ms, "tool call succeeded");
                (true, Some(r.payload()), None)
            }
        };

        outcomes.push(ToolCallResult {
            tool: call.name.clone(),
            args: call.input.clone(),
            duration_ms,
            success,
            result,
            error,
        });
    }
    outcomes
}
