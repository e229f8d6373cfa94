//! Name-unique collection of tools offered to a model.
//!
//! ```rust
//! use wtooling::{ToolErrorKind, ToolSet};
//!
//! let mut tools = ToolSet::new();
//! tools
//!     .register_sync_fn("ping", "Replies pong", r#"{"type":"object"}"#, |_, _| {
//!         Ok(r#""pong""#.to_string())
//!     })
//!     .expect("first registration");
//!
//! let err = tools
//!     .register_sync_fn("ping", "Again", r#"{"type":"object"}"#, |_, _| Ok(String::new()))
//!     .expect_err("names are unique");
//! assert_eq!(err.kind, ToolErrorKind::Duplicate);
//! assert_eq!(tools.names(), vec!["ping".to_string()]);
//! ```

use std::future::Future;
use std::sync::Arc;

use wcommon::Registry;
use wprovider::ToolDefinition;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext};

/// Cloning is cheap; tools are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_shared(Arc::new(tool))
    }

    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.definition().name;
        if name.trim().is_empty() {
            return Err(ToolError::invalid_arguments("tool name must not be empty"));
        }

        self.tools
            .try_insert(name.clone(), tool)
            .map_err(|_| ToolError::duplicate(name))
    }

    pub fn register_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl Into<String>,
        handler: F,
    ) -> Result<(), ToolError>
    where
        F: Fn(String, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(name, description, input_schema, handler))
    }

    pub fn register_sync_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl Into<String>,
        handler: F,
    ) -> Result<(), ToolError>
    where
        F: Fn(String, ToolExecutionContext) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(name, description, input_schema, move |args_json, context| {
            let output = handler(args_json, context);
            async move { output }
        })
    }

    /// Builder-style registration for literal tool sets.
    pub fn with<T>(mut self, tool: T) -> Result<Self, ToolError>
    where
        T: Tool + 'static,
    {
        self.register(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}
