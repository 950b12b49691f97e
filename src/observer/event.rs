use crate::database::models::{Message, Project, Proposal, Review};

/// Discriminant used by observers to declare which events they handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ProjectCreated,
    ProposalCreated,
    MessageSent,
    ReviewCreated,
}

/// A persisted write that may produce notifications.
///
/// Events carry the entity as stored plus the display names the
/// notification text needs, so observers don't re-read them.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    ProjectCreated {
        project: Project,
    },
    ProposalCreated {
        proposal: Proposal,
        project_owner: i64,
        project_title: String,
        freelancer_name: String,
    },
    MessageSent {
        message: Message,
    },
    ReviewCreated {
        review: Review,
        reviewer_name: String,
        project_title: String,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::ProjectCreated { .. } => EventKind::ProjectCreated,
            DomainEvent::ProposalCreated { .. } => EventKind::ProposalCreated,
            DomainEvent::MessageSent { .. } => EventKind::MessageSent,
            DomainEvent::ReviewCreated { .. } => EventKind::ReviewCreated,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            EventKind::ProjectCreated => "project_created",
            EventKind::ProposalCreated => "proposal_created",
            EventKind::MessageSent => "message_sent",
            EventKind::ReviewCreated => "review_created",
        }
    }

    /// Id of the entity whose write raised this event
    pub fn entity_id(&self) -> i64 {
        match self {
            DomainEvent::ProjectCreated { project } => project.id,
            DomainEvent::ProposalCreated { proposal, .. } => proposal.id,
            DomainEvent::MessageSent { message } => message.id,
            DomainEvent::ReviewCreated { review, .. } => review.id,
        }
    }
}
