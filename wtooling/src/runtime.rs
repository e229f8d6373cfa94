//! Tool runtime trait and default tool-set-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{Either, select};
use wprovider::{ToolCall, ToolDefinition};

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionReport,
    ToolExecutionResult, ToolFuture, ToolRuntimeHooks, ToolSet,
};

pub trait ToolRuntime: Send + Sync {
    /// Definitions advertised to the model alongside the request.
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    tools: Arc<ToolSet>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolSet::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(tools: Arc<ToolSet>) -> Self {
        Self {
            tools,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds every tool invocation; an elapsed timer fails the call with `Timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tools(&self) -> Arc<ToolSet> {
        Arc::clone(&self.tools)
    }

    async fn run(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let tool = self.tools.get(&tool_call.name).ok_or_else(|| {
            ToolError::not_found(format!("tool '{}' is not registered", tool_call.name))
        })?;

        let invocation = tool.invoke(&tool_call.arguments, context);
        let output = match self.timeout {
            None => invocation.await?,
            Some(limit) => match select(invocation, futures_timer::Delay::new(limit)).await {
                Either::Left((output, _)) => output?,
                Either::Right(_) => {
                    return Err(ToolError::timeout(format!(
                        "tool '{}' did not finish within {}ms",
                        tool_call.name,
                        limit.as_millis()
                    )));
                }
            },
        };

        Ok(ToolExecutionResult::from_call(tool_call, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            let outcome = self.run(&tool_call, &context).await.map_err(|error| {
                error
                    .with_tool_name(tool_call.name.clone())
                    .with_tool_call_id(tool_call.id.clone())
            });

            self.hooks.on_execution_finish(&ToolExecutionReport {
                tool_call: &tool_call,
                context: &context,
                outcome: outcome.as_ref(),
                elapsed: started.elapsed(),
            });
            outcome
        })
    }
}
