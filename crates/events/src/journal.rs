//! Append-only in-memory journal of applied events.
//!
//! The journal is the audit trail this system hands back to whichever
//! persistence layer sits outside the core: every state change that went
//! through an aggregate is recorded here in order, with its payload encoded
//! as plain json. Single-writer; no locking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use ventapos_core::{Aggregate, DomainError, DomainResult};

use crate::event::Event;

/// One journaled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based position in the journal.
    pub sequence: u64,
    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
    pub payload: JsonValue,
}

/// Ordered in-memory event log.
#[derive(Debug, Default, Clone)]
pub struct Journal {
    records: Vec<EventRecord>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single applied event.
    pub fn record<E>(&mut self, event: &E) -> DomainResult<()>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event)
            .map_err(|e| DomainError::validation(format!("event payload encoding: {e}")))?;
        self.records.push(EventRecord {
            sequence: self.records.len() as u64 + 1,
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        });
        Ok(())
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Run a command against an aggregate and journal what happened.
///
/// `handle` decides, `apply` evolves, and each emitted event lands in the
/// journal in application order. On a rejected command nothing is applied and
/// nothing is journaled.
pub fn commit<A>(
    aggregate: &mut A,
    command: &A::Command,
    journal: &mut Journal,
) -> Result<Vec<A::Event>, A::Error>
where
    A: Aggregate<Error = DomainError>,
    A::Event: Event + Serialize,
{
    let events = aggregate.handle(command)?;
    for event in &events {
        aggregate.apply(event);
        journal.record(event)?;
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Ping {
        occurred_at: DateTime<Utc>,
    }

    impl Event for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }
    }

    #[test]
    fn records_are_sequenced_from_one() {
        let mut journal = Journal::new();
        let ping = Ping {
            occurred_at: Utc::now(),
        };
        journal.record(&ping).unwrap();
        journal.record(&ping).unwrap();

        let sequences: Vec<u64> = journal.records().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(journal.records()[0].event_type, "test.ping");
    }
}
