//! Action coordinator.
//!
//! An action runs in two halves so that several can be outstanding at once:
//!
//! 1. [`Dashboard::begin`] validates the input, refuses the action when the
//!    record already has one in flight (if guarded), snapshots the record,
//!    applies the optimistic mutation and builds the one outbound request.
//! 2. [`Dashboard::settle`] takes the backend's answer and either reconciles
//!    the store with it or restores the snapshot.
//!
//! [`Dashboard::perform`] chains both around a single backend call.

use agentdesk_api::{
    ActionResponse, ApproveRequest, AssignSupportRequest, RejectRequest, SendAgreementRequest,
    StatusChangeRequest, UpdateAgentRequest, paths,
};
use agentdesk_api_client::ClientError;
use agentdesk_core::validate::{validate_edit_form, validate_rejection, validate_status_change};
use agentdesk_core::{
    AccountStatus, AgentId, AgentRecord, ApplicationStatus, EditForm, SupportId, SupportMember,
    ValidationError, support_name,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::backend::AdminBackend;
use crate::document::AgreementDocument;
use crate::error::ActionError;
use crate::optimistic::{self, Reconciled, Snapshot, timestamp};
use crate::state::{Dashboard, DashboardSettings};

/// A state-changing action on one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blank notes fall back to the configured default.
    Approve { notes: Option<String> },
    ApproveWithDocument {
        document: Option<AgreementDocument>,
        notes: Option<String>,
    },
    Reject { reason: String, notes: String },
    Edit { form: EditForm },
    ChangeStatus { target: AccountStatus, reason: String },
    /// `None` unassigns.
    AssignSupport { support: Option<SupportId> },
    SendAgreement,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Approve { .. } => ActionKind::Approve,
            Self::ApproveWithDocument { .. } => ActionKind::ApproveWithDocument,
            Self::Reject { .. } => ActionKind::Reject,
            Self::Edit { .. } => ActionKind::Edit,
            Self::ChangeStatus { .. } => ActionKind::ChangeStatus,
            Self::AssignSupport { .. } => ActionKind::AssignSupport,
            Self::SendAgreement => ActionKind::SendAgreement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Approve,
    ApproveWithDocument,
    Reject,
    Edit,
    ChangeStatus,
    AssignSupport,
    SendAgreement,
}

impl ActionKind {
    /// Used in failure notices: "Failed to {verb} agent #1".
    pub fn verb(self) -> &'static str {
        match self {
            Self::Approve | Self::ApproveWithDocument => "approve",
            Self::Reject => "reject",
            Self::Edit => "update",
            Self::ChangeStatus => "change status of",
            Self::AssignSupport => "assign",
            Self::SendAgreement => "send agreement to",
        }
    }

    /// Used in success notices: "Agent #1 {done}".
    pub fn done(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::ApproveWithDocument => "approved with agreement",
            Self::Reject => "rejected",
            Self::Edit => "updated",
            Self::ChangeStatus => "status changed",
            Self::AssignSupport => "reassigned",
            Self::SendAgreement => "agreement sent",
        }
    }
}

/// The single outbound request an action issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Update(UpdateAgentRequest),
    Assign(AssignSupportRequest),
    Approve(ApproveRequest),
    Reject(RejectRequest),
    ChangeStatus(StatusChangeRequest),
    SendAgreement(SendAgreementRequest),
}

impl ActionRequest {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Update(_) | Self::Assign(_) => paths::UPDATE,
            Self::Approve(_) => paths::APPROVE,
            Self::Reject(_) => paths::REJECT,
            Self::ChangeStatus(_) => paths::STATUS,
            Self::SendAgreement(_) => paths::SEND_AGREEMENT,
        }
    }

    pub fn agent(&self) -> AgentId {
        match self {
            Self::Update(req) => req.id,
            Self::Assign(req) => req.id,
            Self::Approve(req) => req.id,
            Self::Reject(req) => req.id,
            Self::ChangeStatus(req) => req.id,
            Self::SendAgreement(req) => req.id,
        }
    }
}

/// An action whose optimistic mutation is applied and whose request has not
/// been settled yet. Only [`Dashboard::begin`] creates one.
#[derive(Debug)]
pub struct PendingAction {
    pub agent: AgentId,
    pub kind: ActionKind,
    pub request: ActionRequest,
    snapshot: Snapshot,
}

impl PendingAction {
    /// The record as it was before the optimistic mutation.
    pub fn snapshot(&self) -> &AgentRecord {
        self.snapshot.before()
    }
}

#[derive(Debug)]
pub enum ActionOutcome {
    Succeeded(Reconciled),
    /// `restored` is false when the record had already left the store.
    RolledBack { error: ClientError, restored: bool },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

fn resolve_notes(notes: &Option<String>, fallback: &str) -> String {
    notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn validate(
    record: &AgentRecord,
    action: &Action,
    settings: &DashboardSettings,
    roster: &[SupportMember],
) -> Result<(), ValidationError> {
    match action {
        Action::Approve { .. } | Action::SendAgreement => Ok(()),
        Action::ApproveWithDocument { document, .. } => document
            .as_ref()
            .ok_or(ValidationError::MissingDocument)?
            .validate(settings.max_document_bytes),
        Action::Reject { reason, .. } => validate_rejection(reason),
        Action::Edit { form } => validate_edit_form(form),
        Action::ChangeStatus { target, reason } => {
            validate_status_change(record.account_status, *target, reason)
        }
        Action::AssignSupport { support: None } => Ok(()),
        Action::AssignSupport {
            support: Some(support),
        } => match support_name(roster, *support) {
            Some(_) => Ok(()),
            None => Err(ValidationError::UnknownSupportMember(support.to_string())),
        },
    }
}

fn build_request(id: AgentId, action: &Action, settings: &DashboardSettings) -> ActionRequest {
    let by = settings.reviewer.clone();
    match action {
        Action::Approve { notes } => ActionRequest::Approve(ApproveRequest {
            id,
            reviewed_by: by,
            application_notes: resolve_notes(notes, &settings.approve_notes),
            agreement_pdf: None,
            agreement_filename: None,
        }),
        Action::ApproveWithDocument { document, notes } => ActionRequest::Approve(ApproveRequest {
            id,
            reviewed_by: by,
            application_notes: resolve_notes(notes, &settings.approve_notes),
            agreement_pdf: document.as_ref().map(AgreementDocument::encode),
            agreement_filename: document.as_ref().map(|d| d.filename.clone()),
        }),
        Action::Reject { reason, notes } => ActionRequest::Reject(RejectRequest {
            id,
            reviewed_by: by,
            rejection_reason: reason.clone(),
            application_notes: notes.clone(),
        }),
        Action::Edit { form } => ActionRequest::Update(UpdateAgentRequest::from_form(id, form, &by)),
        Action::ChangeStatus { target, reason } => {
            ActionRequest::ChangeStatus(StatusChangeRequest {
                id,
                status: *target,
                reason: reason.trim().to_string(),
                updated_by: by,
            })
        }
        Action::AssignSupport { support } => ActionRequest::Assign(AssignSupportRequest {
            id,
            sales_support_id: *support,
            updated_by: by,
        }),
        Action::SendAgreement => {
            ActionRequest::SendAgreement(SendAgreementRequest { id, sent_by: by })
        }
    }
}

/// Touch only the fields the action is expected to change.
fn mutate(
    record: &mut AgentRecord,
    action: &Action,
    settings: &DashboardSettings,
    roster: &[SupportMember],
    now: DateTime<Utc>,
) {
    let review = |record: &mut AgentRecord, status: ApplicationStatus| {
        record.application_status = status;
        record.reviewed_at = Some(timestamp(now));
        record.reviewed_by = Some(settings.reviewer.clone());
    };
    match action {
        Action::Approve { notes } => {
            review(record, ApplicationStatus::Approved);
            record.application_notes = Some(resolve_notes(notes, &settings.approve_notes));
        }
        Action::ApproveWithDocument { notes, .. } => {
            review(record, ApplicationStatus::Approved);
            record.application_notes = Some(resolve_notes(notes, &settings.approve_notes));
            record.agreement_sent = true;
        }
        Action::Reject { reason, notes } => {
            review(record, ApplicationStatus::Rejected);
            record.rejection_reason = Some(reason.clone());
            record.application_notes = (!notes.trim().is_empty()).then(|| notes.clone());
        }
        Action::Edit { form } => {
            form.apply_to(record);
            record.updated_at = Some(timestamp(now));
        }
        Action::ChangeStatus { target, .. } => record.account_status = Some(*target),
        Action::AssignSupport { support } => {
            record.sales_support_id = *support;
            record.sales_support_name = support
                .and_then(|id| support_name(roster, id))
                .map(str::to_string);
        }
        Action::SendAgreement => record.agreement_sent = true,
    }
}

impl Dashboard {
    pub fn begin(&mut self, id: AgentId, action: Action) -> Result<PendingAction, ActionError> {
        self.begin_at(id, action, Utc::now())
    }

    /// [`Dashboard::begin`] with an explicit clock. Nothing is mutated when
    /// this returns an error.
    pub fn begin_at(
        &mut self,
        id: AgentId,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<PendingAction, ActionError> {
        let record = self.store.get(id).ok_or(ActionError::UnknownAgent(id))?;
        if self.settings.guard_in_flight && self.is_in_flight(id) {
            return Err(ActionError::InFlight(id));
        }
        validate(record, &action, &self.settings, &self.roster)?;

        let request = build_request(id, &action, &self.settings);
        let (settings, roster) = (&self.settings, &self.roster);
        let snapshot = optimistic::apply(&mut self.store, id, |record| {
            mutate(record, &action, settings, roster, now)
        })
        .ok_or(ActionError::UnknownAgent(id))?;

        *self.in_flight.entry(id).or_default() += 1;
        debug!("Agent #{id}: {:?} optimistic, sending {}", action.kind(), request.path());

        Ok(PendingAction {
            agent: id,
            kind: action.kind(),
            request,
            snapshot,
        })
    }

    pub fn settle(
        &mut self,
        pending: PendingAction,
        result: Result<ActionResponse, ClientError>,
    ) -> ActionOutcome {
        self.settle_at(pending, result, Utc::now())
    }

    /// Fold the backend's answer into the store and set the notice.
    pub fn settle_at(
        &mut self,
        pending: PendingAction,
        result: Result<ActionResponse, ClientError>,
        now: DateTime<Utc>,
    ) -> ActionOutcome {
        let PendingAction {
            agent,
            kind,
            snapshot,
            ..
        } = pending;
        self.release(agent);

        match result {
            Ok(response) => {
                let reconciled =
                    optimistic::reconcile(&mut self.store, &snapshot, response.agent, now);
                if reconciled == Reconciled::Replaced {
                    self.fill_support_name(agent);
                }
                let mut message = format!("Agent #{agent} {}", kind.done());
                if kind == ActionKind::SendAgreement
                    && let Some(file_type) = response.file_type.filter(|t| !t.trim().is_empty())
                {
                    message = format!("{message} ({file_type})");
                }
                if let Some(extra) = response.message.filter(|m| !m.trim().is_empty()) {
                    message = format!("{message}: {extra}");
                }
                info!("{message}");
                self.flash_success(message);
                ActionOutcome::Succeeded(reconciled)
            }
            Err(error) => {
                let restored = optimistic::revert(&mut self.store, snapshot);
                warn!("Agent #{agent}: {:?} failed, rolled back: {error}", kind);
                self.flash_error(format!("Failed to {} agent #{agent}: {error}", kind.verb()));
                ActionOutcome::RolledBack { error, restored }
            }
        }
    }

    /// Begin, send through `backend`, settle.
    pub async fn perform<B: AdminBackend>(
        &mut self,
        backend: &B,
        id: AgentId,
        action: Action,
    ) -> Result<ActionOutcome, ActionError> {
        let pending = self.begin(id, action)?;
        let result = backend.submit(&pending.request).await;
        Ok(self.settle(pending, result))
    }

    fn release(&mut self, id: AgentId) {
        if let Some(count) = self.in_flight.get_mut(&id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(&id);
            }
        }
    }

    /// Server records sometimes carry the id without the display name.
    fn fill_support_name(&mut self, id: AgentId) {
        let roster = &self.roster;
        if let Some(record) = self.store.get_mut(id)
            && record.sales_support_name.is_none()
            && let Some(support) = record.sales_support_id
        {
            record.sales_support_name = support_name(roster, support).map(str::to_string);
        }
    }
}
