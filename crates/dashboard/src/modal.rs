//! The one dialog that can be open at a time, with its draft input.

use agentdesk_core::{AccountStatus, AgentId, EditForm, SupportId};

use crate::actions::{Action, PendingAction};
use crate::document::AgreementDocument;
use crate::error::ActionError;
use crate::state::Dashboard;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveModal {
    #[default]
    None,
    Reject {
        agent: AgentId,
        reason: String,
        notes: String,
    },
    Edit {
        agent: AgentId,
        form: EditForm,
    },
    Status {
        agent: AgentId,
        target: AccountStatus,
        reason: String,
    },
    Assign {
        agent: AgentId,
        support: Option<SupportId>,
    },
    ApproveWithDocument {
        agent: AgentId,
        document: Option<AgreementDocument>,
        notes: String,
    },
}

impl ActiveModal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Self::None => None,
            Self::Reject { agent, .. }
            | Self::Edit { agent, .. }
            | Self::Status { agent, .. }
            | Self::Assign { agent, .. }
            | Self::ApproveWithDocument { agent, .. } => Some(*agent),
        }
    }

    /// The action the current draft would submit.
    pub fn to_action(&self) -> Option<(AgentId, Action)> {
        let action = match self {
            Self::None => return None,
            Self::Reject { reason, notes, .. } => Action::Reject {
                reason: reason.clone(),
                notes: notes.clone(),
            },
            Self::Edit { form, .. } => Action::Edit { form: form.clone() },
            Self::Status { target, reason, .. } => Action::ChangeStatus {
                target: *target,
                reason: reason.clone(),
            },
            Self::Assign { support, .. } => Action::AssignSupport { support: *support },
            Self::ApproveWithDocument {
                document, notes, ..
            } => Action::ApproveWithDocument {
                document: document.clone(),
                notes: Some(notes.clone()),
            },
        };
        self.agent().map(|agent| (agent, action))
    }
}

impl Dashboard {
    fn open(&mut self, id: AgentId, modal: ActiveModal) -> Result<(), ActionError> {
        if !self.store.contains(id) {
            return Err(ActionError::UnknownAgent(id));
        }
        self.modal = modal;
        Ok(())
    }

    pub fn open_reject(&mut self, id: AgentId) -> Result<(), ActionError> {
        self.open(
            id,
            ActiveModal::Reject {
                agent: id,
                reason: String::new(),
                notes: String::new(),
            },
        )
    }

    /// Seeds the form with the record's current profile.
    pub fn open_edit(&mut self, id: AgentId) -> Result<(), ActionError> {
        let form = self
            .store
            .get(id)
            .map(EditForm::from_record)
            .ok_or(ActionError::UnknownAgent(id))?;
        self.open(id, ActiveModal::Edit { agent: id, form })
    }

    /// Preselects the first status the account is not already in.
    pub fn open_status(&mut self, id: AgentId) -> Result<(), ActionError> {
        let current = self
            .store
            .get(id)
            .ok_or(ActionError::UnknownAgent(id))?
            .account_status;
        let target = AccountStatus::ALL
            .into_iter()
            .find(|status| Some(*status) != current)
            .unwrap_or(AccountStatus::Active);
        self.open(
            id,
            ActiveModal::Status {
                agent: id,
                target,
                reason: String::new(),
            },
        )
    }

    pub fn open_assign(&mut self, id: AgentId) -> Result<(), ActionError> {
        let support = self
            .store
            .get(id)
            .ok_or(ActionError::UnknownAgent(id))?
            .sales_support_id;
        self.open(id, ActiveModal::Assign { agent: id, support })
    }

    pub fn open_approve_with_document(&mut self, id: AgentId) -> Result<(), ActionError> {
        self.open(
            id,
            ActiveModal::ApproveWithDocument {
                agent: id,
                document: None,
                notes: String::new(),
            },
        )
    }

    pub fn close_modal(&mut self) {
        self.modal = ActiveModal::None;
    }

    /// Begin the drafted action. The dialog closes only when the action
    /// starts; a validation failure leaves the draft open for correction.
    pub fn submit_modal(&mut self) -> Result<PendingAction, ActionError> {
        let (id, action) = self.modal.to_action().ok_or(ActionError::NoModal)?;
        let pending = self.begin(id, action)?;
        self.modal = ActiveModal::None;
        Ok(pending)
    }
}
