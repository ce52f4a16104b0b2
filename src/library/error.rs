use thiserror::Error;

/// Reasons the library declines an action.
///
/// None of these are fatal. The front-end shows the message and waits for the
/// next command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("A reflection cycle is already in progress")]
    CycleInFlight,

    #[error("No reflection cycle is in progress")]
    NoCycleInFlight,

    #[error("No knowledge is selected")]
    NoSelection,

    #[error("There is no thought to crystallize")]
    NoThought,

    #[error("There is no memory crystal to integrate")]
    NoPendingCrystal,

    #[error("Integration is already in progress")]
    IntegrationInFlight,

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Not a knowledge file: {0}")]
    NotAFile(String),

    #[error("Knowledge is in the abyss: {0}")]
    Archived(String),

    #[error("Knowledge is not in the abyss: {0}")]
    NotArchived(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
