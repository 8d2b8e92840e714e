//! Farm assistant command layer.
//!
//! Model tool calls are decoded into typed commands and applied to a farm store.

pub mod executor;
pub mod store;
pub mod tools;

pub use executor::CommandExecutor;
pub use store::{FarmSnapshot, InMemoryFarmStore};
pub use tools::{get_tool_definitions, ToolCall, ToolDefinition, ToolResult};
