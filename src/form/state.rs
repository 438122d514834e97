use serde::{Deserialize, Serialize};

use crate::lookup::{LookupOption, OptionId};

/// A (parent, dependent) pair: the dependent's options are a function of the parent's value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chain {
    pub parent: String,
    pub dependent: String,
}

impl Chain {
    pub fn new(parent: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            dependent: dependent.into(),
        }
    }
}

/// Option-list lifecycle of one dependent field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    /// Parent is empty; nothing is fetched
    Idle,
    Fetching { parent: OptionId },
    Loaded { parent: OptionId, options: Vec<LookupOption> },
    Error { parent: OptionId, message: String },
}

impl FieldState {
    pub fn parent(&self) -> Option<&OptionId> {
        match self {
            FieldState::Idle => None,
            FieldState::Fetching { parent }
            | FieldState::Loaded { parent, .. }
            | FieldState::Error { parent, .. } => Some(parent),
        }
    }

    pub fn options(&self) -> &[LookupOption] {
        match self {
            FieldState::Loaded { options, .. } => options,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FieldState::Fetching { .. })
    }
}

/// Request to load `field`'s options for `parent`.
///
/// The generation ties a response back to the fetch that asked for it, so
/// responses for superseded parents are dropped on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub field: String,
    pub parent: OptionId,
    pub(crate) generation: u64,
}

/// What a form renders for one dependent field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldView<'a> {
    pub options: &'a [LookupOption],
    pub is_loading: bool,
    pub value: Option<&'a OptionId>,
    pub error: Option<&'a str>,
}
