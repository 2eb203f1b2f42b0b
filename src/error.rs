use thiserror::Error;

/// Problems with form input. These block a submission before anything is
/// sent to the backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} is not a valid date: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} cannot be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("paid amount {paid:.2} exceeds amount {amount:.2}")]
    Overpayment { amount: f64, paid: f64 },

    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange { field: &'static str, value: f64, max: f64 },
}

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("No {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("A submission is already in progress")]
    Busy,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CmsError>;
