//! Observation points around each tool execution.
//!
//! A runtime reports the start of every call and then exactly one
//! [`ToolExecutionReport`] once the call settles, whether it produced output,
//! failed or ran out of time.
//!
//! ```rust
//! use wtooling::{ToolExecutionReport, ToolRuntimeHooks};
//!
//! struct SlowCallLog;
//!
//! impl ToolRuntimeHooks for SlowCallLog {
//!     fn on_execution_finish(&self, report: &ToolExecutionReport<'_>) {
//!         if report.elapsed.as_secs() > 1 {
//!             eprintln!("{} took {:?} ({})", report.tool_call.name, report.elapsed, report.status());
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use wprovider::ToolCall;

use crate::{ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult};

/// How a single tool call settled.
#[derive(Debug, Clone, Copy)]
pub struct ToolExecutionReport<'a> {
    pub tool_call: &'a ToolCall,
    pub context: &'a ToolExecutionContext,
    pub outcome: Result<&'a ToolExecutionResult, &'a ToolError>,
    pub elapsed: Duration,
}

impl ToolExecutionReport<'_> {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.outcome.err().map(|error| error.kind)
    }

    /// `success`, `timeout` or `failure`; timeouts are split out from other errors.
    pub fn status(&self) -> &'static str {
        match self.error_kind() {
            None => "success",
            Some(ToolErrorKind::Timeout) => "timeout",
            Some(_) => "failure",
        }
    }
}

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_finish(&self, _report: &ToolExecutionReport<'_>) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
