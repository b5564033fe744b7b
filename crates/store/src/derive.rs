//! Materialise events and tickets from rule execution records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use luxpulse_core::{EventRecord, EventSeverity, EventStatus, Ticket, TicketPriority, TicketStatus};
use luxpulse_rules::{RuleExecutionRecord, TelemetrySnapshot};

use crate::error::StoreError;
use crate::store::Store;

/// What [`Store::record_executions`] wrote.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivedOutputs {
    pub events: Vec<EventRecord>,
    pub tickets: Vec<Ticket>,
}

fn priority_for(severity: EventSeverity) -> TicketPriority {
    match severity {
        EventSeverity::Critical => TicketPriority::Critical,
        EventSeverity::Warning | EventSeverity::Info => TicketPriority::Medium,
    }
}

fn derive(
    input: &TelemetrySnapshot,
    records: &[RuleExecutionRecord],
) -> Result<DerivedOutputs, StoreError> {
    let mut out = DerivedOutputs::default();
    for record in records.iter().filter(|r| r.is_match()) {
        let Some(event_id) = record.output_event_id.clone() else {
            continue;
        };
        let event_type = record.event_type.clone().ok_or_else(|| {
            StoreError::Validation(format!("matched record for {} has no eventType", record.rule_id))
        })?;
        let severity: EventSeverity = record
            .severity
            .ok_or_else(|| {
                StoreError::Validation(format!("matched record for {} has no severity", record.rule_id))
            })?
            .into();
        let detected_at: DateTime<Utc> = record.executed_at.parse().map_err(|e| {
            StoreError::Validation(format!("executedAt {:?}: {e}", record.executed_at))
        })?;

        out.events.push(EventRecord {
            id: event_id.clone(),
            tenant_id: input.tenant_id.clone(),
            site_id: input.site_id.clone(),
            zone_id: input.zone_id.clone(),
            asset_id: input.asset_id.clone(),
            event_type,
            severity,
            status: EventStatus::Open,
            detected_at,
            acknowledged_at: None,
            rule_id: Some(record.rule_id.clone()),
            rule_version: Some(record.rule_version),
            correlation_id: record.input_ref.clone(),
            raw_payload_ref: None,
        });

        if let Some(ticket_id) = &record.output_ticket_id {
            out.tickets.push(Ticket {
                id: ticket_id.clone(),
                tenant_id: input.tenant_id.clone(),
                site_id: input.site_id.clone(),
                zone_id: input.zone_id.clone(),
                asset_id: input.asset_id.clone(),
                source_event_id: Some(event_id),
                status: TicketStatus::Open,
                priority: priority_for(severity),
                opened_at: detected_at,
                assigned_to: None,
                sla_due_at: None,
                closed_at: None,
                resolution_summary: None,
            });
        }
    }
    Ok(out)
}

fn has_duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

impl Store {
    /// Write one event per matched record and one ticket per record that
    /// carries a ticket id. All-or-nothing: any id already present is a
    /// conflict and nothing is written.
    pub fn record_executions(
        &self,
        input: &TelemetrySnapshot,
        records: &[RuleExecutionRecord],
    ) -> Result<DerivedOutputs, StoreError> {
        let derived = derive(input, records)?;

        self.write(|t| {
            let event_ids = derived.events.iter().map(|e| e.id.as_str());
            let taken = event_ids
                .clone()
                .find(|id| t.events.iter().any(|e| e.id == *id))
                .or_else(|| has_duplicates(event_ids));
            if let Some(id) = taken {
                return Err(StoreError::Conflict(format!("event {id} already recorded")));
            }

            let ticket_ids = derived.tickets.iter().map(|k| k.id.as_str());
            let taken = ticket_ids
                .clone()
                .find(|id| t.tickets.iter().any(|k| k.id == *id))
                .or_else(|| has_duplicates(ticket_ids));
            if let Some(id) = taken {
                return Err(StoreError::Conflict(format!("ticket {id} already recorded")));
            }

            t.events.extend(derived.events.iter().cloned());
            t.tickets.extend(derived.tickets.iter().cloned());
            Ok(())
        })?;

        info!(
            asset_id = %input.asset_id,
            events = derived.events.len(),
            tickets = derived.tickets.len(),
            "rule outputs recorded"
        );
        Ok(derived)
    }
}
