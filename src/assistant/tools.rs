//! Tool definitions for the farm assistant.
//!
//! The chat model is offered these tools; each call it makes is decoded
//! into a typed [`FarmCommand`] before anything touches the farm store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool definition in the function-calling format chat models expect.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool call made by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: &str, arguments: Value) -> Self {
        Self {
            function: FunctionCall {
                name: name.to_string(),
                arguments,
            },
        }
    }
}

/// Result of executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    #[default]
    Planned,
    Planted,
    Growing,
    Harvested,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCrop {
    pub name: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub area_hectares: Option<f64>,
    #[serde(default)]
    pub planted_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<CropStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropUpdate {
    pub status: Option<CropStatus>,
    pub field: Option<String>,
    pub area_hectares: Option<f64>,
}

impl CropUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.field.is_none() && self.area_hectares.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub crop_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// A validated farm mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum FarmCommand {
    AddCrops(Vec<NewCrop>),
    UpdateCrop { id: u64, update: CropUpdate },
    RemoveCrop { id: u64 },
    AddTask(NewTask),
    CompleteTask { id: u64 },
    RecordExpense(NewExpense),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AddCropsArgs {
    crops: Vec<NewCrop>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateCropArgs {
    id: u64,
    #[serde(default)]
    status: Option<CropStatus>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    area_hectares: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IdArgs {
    id: u64,
}

fn decode<T: serde::de::DeserializeOwned>(name: &str, arguments: &Value) -> Result<T, String> {
    // Some models send arguments as a JSON-encoded string.
    let value = match arguments {
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| format!("Invalid arguments for {}: {}", name, e))?,
        Value::Null => json!({}),
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| format!("Invalid arguments for {}: {}", name, e))
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(())
}

fn require_area(area: Option<f64>) -> Result<(), String> {
    match area {
        Some(a) if !a.is_finite() || a < 0.0 => {
            Err(format!("area_hectares must be a non-negative number, got {}", a))
        }
        _ => Ok(()),
    }
}

impl FarmCommand {
    /// Decode and validate a tool call. Never panics on model output.
    pub fn from_tool_call(call: &ToolCall) -> Result<Self, String> {
        let name = call.function.name.as_str();
        let args = &call.function.arguments;

        let command = match name {
            "add_crops" => {
                let parsed: AddCropsArgs = decode(name, args)?;
                if parsed.crops.is_empty() {
                    return Err("add_crops needs at least one crop".to_string());
                }
                for crop in &parsed.crops {
                    require_text("name", &crop.name)?;
                    require_area(crop.area_hectares)?;
                }
                FarmCommand::AddCrops(parsed.crops)
            }
            "update_crop" => {
                let parsed: UpdateCropArgs = decode(name, args)?;
                let update = CropUpdate {
                    status: parsed.status,
                    field: parsed.field,
                    area_hectares: parsed.area_hectares,
                };
                if update.is_empty() {
                    return Err("update_crop needs at least one field to change".to_string());
                }
                require_area(update.area_hectares)?;
                FarmCommand::UpdateCrop {
                    id: parsed.id,
                    update,
                }
            }
            "remove_crop" => {
                let parsed: IdArgs = decode(name, args)?;
                FarmCommand::RemoveCrop { id: parsed.id }
            }
            "add_task" => {
                let task: NewTask = decode(name, args)?;
                require_text("title", &task.title)?;
                FarmCommand::AddTask(task)
            }
            "complete_task" => {
                let parsed: IdArgs = decode(name, args)?;
                FarmCommand::CompleteTask { id: parsed.id }
            }
            "record_expense" => {
                let expense: NewExpense = decode(name, args)?;
                require_text("description", &expense.description)?;
                if !expense.amount.is_finite() || expense.amount <= 0.0 {
                    return Err(format!(
                        "amount must be a positive number, got {}",
                        expense.amount
                    ));
                }
                FarmCommand::RecordExpense(expense)
            }
            _ => return Err(format!("Unknown tool: {}", name)),
        };

        Ok(command)
    }
}

fn tool(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        },
    }
}

/// Get the tool catalog offered to the chat model.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    let status = json!({
        "type": "string",
        "enum": ["planned", "planted", "growing", "harvested", "failed"],
        "description": "Lifecycle status of the crop"
    });

    vec![
        tool(
            "add_crops",
            "Add one or more crops to the farm. Use when the farmer says they planted or plan to plant something.",
            json!({
                "type": "object",
                "properties": {
                    "crops": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string", "description": "Crop name, e.g. maize"},
                                "field": {"type": "string", "description": "Field or plot name"},
                                "area_hectares": {"type": "number", "description": "Planted area in hectares"},
                                "planted_on": {"type": "string", "format": "date", "description": "Planting date (YYYY-MM-DD)"},
                                "status": status
                            },
                            "required": ["name"]
                        }
                    }
                },
                "required": ["crops"]
            }),
        ),
        tool(
            "update_crop",
            "Change the status, field or area of an existing crop.",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "description": "Crop id from the farm snapshot"},
                    "status": status,
                    "field": {"type": "string"},
                    "area_hectares": {"type": "number"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "remove_crop",
            "Remove a crop from the farm. Tasks linked to it are kept and unlinked.",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "description": "Crop id from the farm snapshot"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "add_task",
            "Add a farm task such as irrigation, spraying or soil sampling.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "What needs doing"},
                    "due": {"type": "string", "format": "date", "description": "Due date (YYYY-MM-DD)"},
                    "crop_id": {"type": "integer", "description": "Related crop id, if any"}
                },
                "required": ["title"]
            }),
        ),
        tool(
            "complete_task",
            "Mark a task as done.",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "description": "Task id from the farm snapshot"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "record_expense",
            "Record money spent on the farm.",
            json!({
                "type": "object",
                "properties": {
                    "description": {"type": "string"},
                    "amount": {"type": "number", "description": "Amount spent, positive"},
                    "category": {"type": "string", "description": "e.g. seed, fertilizer, labour"},
                    "date": {"type": "string", "format": "date", "description": "Expense date (YYYY-MM-DD)"}
                },
                "required": ["description", "amount"]
            }),
        ),
    ]
}
