//! Domain events for agreements service
//!
//! Events record agreement lifecycle changes for auditing. Publishing is
//! best-effort: a failed publish is logged and never fails the write that
//! produced it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain event types for agreements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AgreementEvent {
    /// Agreement was created
    AgreementCreated(AgreementChangedEvent),
    /// Agreement fields were edited
    AgreementUpdated(AgreementChangedEvent),
    /// Agreement was soft-deleted
    AgreementDeleted(AgreementChangedEvent),
    /// Expiration date was moved by a renewal
    AgreementRenewed(AgreementRenewedEvent),
    /// Contractual years were regenerated
    YearsReconciled(YearsReconciledEvent),
}

/// Event data for create/update/delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementChangedEvent {
    pub agreement_id: Uuid,
    /// Version after the change
    pub version: i32,
    pub timestamp: DateTime<Utc>,
}

/// Event data for renewals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementRenewedEvent {
    pub agreement_id: Uuid,
    pub renewal_id: Uuid,
    pub old_expiration_date: Option<NaiveDate>,
    pub new_expiration_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

/// Event data for year regeneration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearsReconciledEvent {
    pub agreement_id: Uuid,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub timestamp: DateTime<Utc>,
}

/// Event publisher trait for publishing domain events
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an audit event
    async fn publish(&self, event: AgreementEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: AgreementEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Publisher that writes every event to the `audit` tracing target as JSON
pub struct TracingEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: AgreementEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(target: "audit", event = %payload, "agreement event");
        Ok(())
    }
}

impl AgreementEvent {
    pub fn created(agreement_id: Uuid, version: i32) -> Self {
        Self::AgreementCreated(AgreementChangedEvent {
            agreement_id,
            version,
            timestamp: Utc::now(),
        })
    }

    pub fn updated(agreement_id: Uuid, version: i32) -> Self {
        Self::AgreementUpdated(AgreementChangedEvent {
            agreement_id,
            version,
            timestamp: Utc::now(),
        })
    }

    pub fn deleted(agreement_id: Uuid, version: i32) -> Self {
        Self::AgreementDeleted(AgreementChangedEvent {
            agreement_id,
            version,
            timestamp: Utc::now(),
        })
    }

    pub fn renewed(
        agreement_id: Uuid,
        renewal_id: Uuid,
        old_expiration_date: Option<NaiveDate>,
        new_expiration_date: NaiveDate,
    ) -> Self {
        Self::AgreementRenewed(AgreementRenewedEvent {
            agreement_id,
            renewal_id,
            old_expiration_date,
            new_expiration_date,
            timestamp: Utc::now(),
        })
    }

    pub fn years_reconciled(
        agreement_id: Uuid,
        inserted: usize,
        updated: usize,
        deleted: usize,
    ) -> Self {
        Self::YearsReconciled(YearsReconciledEvent {
            agreement_id,
            inserted,
            updated,
            deleted,
            timestamp: Utc::now(),
        })
    }

    pub fn agreement_id(&self) -> Uuid {
        match self {
            Self::AgreementCreated(e) | Self::AgreementUpdated(e) | Self::AgreementDeleted(e) => {
                e.agreement_id
            }
            Self::AgreementRenewed(e) => e.agreement_id,
            Self::YearsReconciled(e) => e.agreement_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewed_event_serializes_with_tag() {
        let agreement_id = Uuid::new_v4();
        let event = AgreementEvent::renewed(
            agreement_id,
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 15),
            NaiveDate::from_ymd_opt(2028, 3, 15).unwrap(),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "agreement_renewed");
        assert_eq!(json["new_expiration_date"], "2028-03-15");
        assert_eq!(event.agreement_id(), agreement_id);
    }

    #[tokio::test]
    async fn test_publishers_accept_events() {
        let event = AgreementEvent::years_reconciled(Uuid::new_v4(), 2, 0, 1);
        assert!(NoOpEventPublisher.publish(event.clone()).await.is_ok());
        assert!(TracingEventPublisher.publish(event).await.is_ok());
    }
}
