//! # Clock and Event Sink Wiring
//!
//! merit-core is silent and clock-free: timestamps enter through the
//! `Clock` seam and committed mutations leave through the `EventSink`
//! seam. This module plugs both seams with the binary's collaborators,
//! the wall clock and the tracing log.

use merit_core::{AppraisalEvent, Clock, EventSink, Timestamp};

// =============================================================================
// SYSTEM CLOCK
// =============================================================================

/// The wall clock, in whole epoch seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(chrono::Utc::now().timestamp())
    }
}

// =============================================================================
// TRACING SINK
// =============================================================================

/// An event sink that writes every committed mutation to the tracing log.
///
/// Events land under the `merit::audit` target with the serialized payload
/// attached, so a JSON log pipeline captures the full audit trail.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &AppraisalEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        tracing::info!(
            target: "merit::audit",
            event = event.name(),
            appraisal = event.appraisal_id().0,
            payload = %payload,
            "appraisal event"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use merit_core::{AppraisalId, AppraisalKind, EmployeeId};

    #[test]
    fn system_clock_reads_epoch_seconds() {
        let now = SystemClock.now();
        // Any instant after 2023 counts as a sane wall-clock reading.
        assert!(now.value() > 1_700_000_000);
    }

    #[test]
    fn tracing_sink_accepts_every_event() {
        let sink = TracingSink;
        sink.record(&AppraisalEvent::Created {
            appraisal: AppraisalId(1),
            kind: AppraisalKind::Annual,
            appraisee: EmployeeId(1),
            appraiser: EmployeeId(2),
            reviewer: EmployeeId(3),
        });
        sink.record(&AppraisalEvent::ReviewerEvaluationRecorded {
            appraisal: AppraisalId(1),
        });
    }
}
