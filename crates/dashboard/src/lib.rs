//! Dashboard state for the agent review workflow.
//!
//! [`Dashboard`] owns the in-memory [`RecordStore`], the current view query,
//! the preset registry and the single active modal. State-changing actions go
//! through the coordinator in [`actions`]: `begin` validates and applies the
//! optimistic mutation, the caller sends the request through an
//! [`AdminBackend`], and `settle` reconciles or rolls back.

pub mod actions;
pub mod backend;
pub mod document;
pub mod error;
pub mod modal;
pub mod optimistic;
pub mod state;
pub mod store;

pub use actions::{Action, ActionKind, ActionOutcome, ActionRequest, PendingAction};
pub use backend::AdminBackend;
pub use document::AgreementDocument;
pub use error::{ActionError, ViewError};
pub use modal::ActiveModal;
pub use state::{Dashboard, DashboardSettings, Notice, NoticeLevel};
pub use store::RecordStore;
