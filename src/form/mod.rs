pub mod controller;
pub mod state;
pub mod validation;

use thiserror::Error;

pub use controller::{FormController, Phase};
pub use state::{Chain, FetchTicket, FieldState, FieldView};
pub use validation::Rules;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown dependent field: {0}")]
    UnknownField(String),

    #[error("Invalid dependency chain: {0}")]
    InvalidChain(String),
}
