//! Farm record storage behind the assistant.

use crate::assistant::tools::{CropStatus, CropUpdate, NewCrop, NewExpense, NewTask};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_hectares: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planted_on: Option<NaiveDate>,
    pub status: CropStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_id: Option<u64>,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: u64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

/// Point-in-time copy of every farm record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSnapshot {
    pub crops: Vec<Crop>,
    pub tasks: Vec<Task>,
    pub expenses: Vec<Expense>,
    pub total_expenses: f64,
}

/// Persistence seam for farm records.
///
/// `today` is supplied by the caller so stores never read the clock.
#[async_trait]
pub trait FarmStore: Send + Sync {
    async fn add_crops(&self, crops: Vec<NewCrop>) -> Result<Vec<Crop>, StoreError>;

    async fn update_crop(&self, id: u64, update: CropUpdate) -> Result<Crop, StoreError>;

    /// Removes a crop; tasks linked to it are kept and detached.
    async fn remove_crop(&self, id: u64) -> Result<Crop, StoreError>;

    async fn add_task(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn complete_task(&self, id: u64) -> Result<Task, StoreError>;

    async fn record_expense(
        &self,
        expense: NewExpense,
        today: NaiveDate,
    ) -> Result<Expense, StoreError>;

    async fn snapshot(&self) -> FarmSnapshot;
}

#[derive(Debug, Default)]
struct FarmRecords {
    next_id: u64,
    crops: Vec<Crop>,
    tasks: Vec<Task>,
    expenses: Vec<Expense>,
}

impl FarmRecords {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store. Ids are shared across record kinds and never reused.
#[derive(Debug, Default)]
pub struct InMemoryFarmStore {
    records: RwLock<FarmRecords>,
}

impl InMemoryFarmStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FarmStore for InMemoryFarmStore {
    async fn add_crops(&self, crops: Vec<NewCrop>) -> Result<Vec<Crop>, StoreError> {
        let mut records = self.records.write().await;
        let mut added = Vec::with_capacity(crops.len());

        for new in crops {
            let status = new.status.unwrap_or(if new.planted_on.is_some() {
                CropStatus::Planted
            } else {
                CropStatus::Planned
            });
            let crop = Crop {
                id: records.next_id(),
                name: new.name.trim().to_string(),
                field: new.field,
                area_hectares: new.area_hectares,
                planted_on: new.planted_on,
                status,
            };
            records.crops.push(crop.clone());
            added.push(crop);
        }

        Ok(added)
    }

    async fn update_crop(&self, id: u64, update: CropUpdate) -> Result<Crop, StoreError> {
        let mut records = self.records.write().await;
        let crop = records
            .crops
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound { kind: "crop", id })?;

        if let Some(status) = update.status {
            crop.status = status;
        }
        if let Some(field) = update.field {
            crop.field = Some(field);
        }
        if let Some(area) = update.area_hectares {
            crop.area_hectares = Some(area);
        }

        Ok(crop.clone())
    }

    async fn remove_crop(&self, id: u64) -> Result<Crop, StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .crops
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound { kind: "crop", id })?;

        for task in records.tasks.iter_mut().filter(|t| t.crop_id == Some(id)) {
            task.crop_id = None;
        }
        Ok(records.crops.remove(index))
    }

    async fn add_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut records = self.records.write().await;

        if let Some(crop_id) = task.crop_id {
            if !records.crops.iter().any(|c| c.id == crop_id) {
                return Err(StoreError::NotFound {
                    kind: "crop",
                    id: crop_id,
                });
            }
        }

        let task = Task {
            id: records.next_id(),
            title: task.title.trim().to_string(),
            due: task.due,
            crop_id: task.crop_id,
            done: false,
        };
        records.tasks.push(task.clone());
        Ok(task)
    }

    async fn complete_task(&self, id: u64) -> Result<Task, StoreError> {
        let mut records = self.records.write().await;
        let task = records
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { kind: "task", id })?;

        if task.done {
            return Err(StoreError::Invalid(format!("task {} is already done", id)));
        }
        task.done = true;
        Ok(task.clone())
    }

    async fn record_expense(
        &self,
        expense: NewExpense,
        today: NaiveDate,
    ) -> Result<Expense, StoreError> {
        let mut records = self.records.write().await;

        let expense = Expense {
            id: records.next_id(),
            description: expense.description.trim().to_string(),
            amount: expense.amount,
            category: expense.category.unwrap_or_else(|| "general".to_string()),
            date: expense.date.unwrap_or(today),
        };
        records.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn snapshot(&self) -> FarmSnapshot {
        let records = self.records.read().await;
        FarmSnapshot {
            crops: records.crops.clone(),
            tasks: records.tasks.clone(),
            expenses: records.expenses.clone(),
            total_expenses: records.expenses.iter().map(|e| e.amount).sum(),
        }
    }
}
