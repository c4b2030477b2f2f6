use serde::{Deserialize, Serialize};

/// Processing state of a submitted expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpressionStatus {
    Processing,
    Completed,
    Error,
}

/// A client-submitted arithmetic expression and its processing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Expression {
    pub id: String,
    /// Original text as submitted.
    pub expression: String,
    pub status: ExpressionStatus,
    /// Present only once the expression is `COMPLETED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
}

impl Expression {
    /// New expression record in the `PROCESSING` state with a time-ordered id.
    pub fn new(text: &str) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            expression: text.to_string(),
            status: ExpressionStatus::Processing,
            result: None,
        }
    }

    pub fn complete(&mut self, value: f64) {
        self.status = ExpressionStatus::Completed;
        self.result = Some(value);
    }

    pub fn fail(&mut self) {
        self.status = ExpressionStatus::Error;
        self.result = None;
    }

    pub fn is_finished(&self) -> bool {
        self.status != ExpressionStatus::Processing
    }
}
