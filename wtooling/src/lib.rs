//! Tool registration and execution for function-calling models.

mod args;
mod error;
mod hooks;
mod runtime;
mod tool;
mod toolset;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionTool, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionReport, ToolExecutionResult, ToolFuture, ToolRuntime, ToolRuntimeHooks,
        ToolSet, parse_args,
    };
}

pub use args::{
    optional_string, parse_args, parse_json_object, parse_json_value, required_string, to_output,
};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolExecutionReport, ToolRuntimeHooks};
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use toolset::ToolSet;
pub use types::{ToolExecutionContext, ToolExecutionResult};
