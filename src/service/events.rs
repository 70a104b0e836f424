//! Domain events emitted after committed mutations.
//!
//! There is no real bus behind this yet; [`NoopPublisher`] only logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TeamCreated,
    TeamDeleted,
    MemberAdded,
    MemberRemoved,
    ProjectUpserted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TeamCreated => "team_created",
            EventKind::TeamDeleted => "team_deleted",
            EventKind::MemberAdded => "member_added",
            EventKind::MemberRemoved => "member_removed",
            EventKind::ProjectUpserted => "project_upserted",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub team_id: i64,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(kind: EventKind, team_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            team_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Outbound side of the event bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), AppError>;
}

/// Publisher that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), AppError> {
        tracing::trace!(event = event.kind.as_str(), team_id = event.team_id, "event dropped");
        Ok(())
    }
}
