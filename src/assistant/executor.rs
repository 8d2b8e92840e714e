//! Applies decoded tool calls to a [`FarmStore`].

use crate::assistant::store::{FarmStore, StoreError};
use crate::assistant::tools::{FarmCommand, ToolCall, ToolResult};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes assistant tool calls against a shared store.
#[derive(Clone)]
pub struct CommandExecutor {
    store: Arc<dyn FarmStore>,
}

fn to_output<T: Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Invalid(e.to_string()))
}

impl CommandExecutor {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn FarmStore> {
        &self.store
    }

    /// Execute a tool call and return the result.
    pub async fn execute(&self, call: &ToolCall, today: NaiveDate) -> ToolResult {
        debug!(
            "Executing tool: {} with args: {:?}",
            call.function.name, call.function.arguments
        );

        let command = match FarmCommand::from_tool_call(call) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected tool call {}: {}", call.function.name, e);
                return ToolResult::error(e);
            }
        };

        match self.apply(command, today).await {
            Ok(output) => ToolResult::success(output),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }

    /// Execute calls in order; later calls see earlier effects.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let today = Utc::now().date_naive();
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call, today).await);
        }
        results
    }

    async fn apply(&self, command: FarmCommand, today: NaiveDate) -> Result<String, StoreError> {
        match command {
            FarmCommand::AddCrops(crops) => to_output(&self.store.add_crops(crops).await?),
            FarmCommand::UpdateCrop { id, update } => {
                to_output(&self.store.update_crop(id, update).await?)
            }
            FarmCommand::RemoveCrop { id } => to_output(&self.store.remove_crop(id).await?),
            FarmCommand::AddTask(task) => to_output(&self.store.add_task(task).await?),
            FarmCommand::CompleteTask { id } => to_output(&self.store.complete_task(id).await?),
            FarmCommand::RecordExpense(expense) => {
                to_output(&self.store.record_expense(expense, today).await?)
            }
        }
    }
}
