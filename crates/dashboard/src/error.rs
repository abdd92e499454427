use agentdesk_api_client::ClientError;
use agentdesk_core::{AgentId, ValidationError};
use thiserror::Error;

/// Errors raised before an action touches the store or the network.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("agent #{0} is not loaded")]
    UnknownAgent(AgentId),

    #[error("an action on agent #{0} is still in flight")]
    InFlight(AgentId),

    #[error("no dialog is open")]
    NoModal,

    /// Only for non-mutating calls; failed state changes roll back instead.
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown view preset: {0}")]
    UnknownPreset(String),

    #[error(transparent)]
    Filter(#[from] ValidationError),

    #[error("No data to export")]
    NothingToExport,
}
