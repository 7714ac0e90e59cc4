use std::fmt;
use taplink_network::DeliveryOutcome;

/// Counters kept by the reader loop. Logged at shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Presence probes made.
    pub polls: u64,
    /// Presence probes or reads that failed with a reader error.
    pub reader_errors: u64,
    /// Cards detected but gone before their serial was read.
    pub read_failures: u64,
    /// Serials read successfully.
    pub reads: u64,
    pub suppressed: u64,
    pub accepted: u64,
    pub delivered: u64,
    pub rejected: u64,
    pub transport_failures: u64,
    pub link_unavailable: u64,
    pub liveness_checks: u64,
}

impl LoopStats {
    pub fn record_delivery(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered(_) => self.delivered += 1,
            DeliveryOutcome::RejectedByServer(_) => self.rejected += 1,
            DeliveryOutcome::TransportFailed(_) => self.transport_failures += 1,
            DeliveryOutcome::LinkUnavailable => self.link_unavailable += 1,
        }
    }

    /// Accepted reads that did not reach the backend.
    pub fn dropped(&self) -> u64 {
        self.rejected + self.transport_failures + self.link_unavailable
    }
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "polls={} reads={} accepted={} suppressed={} delivered={} dropped={} read_failures={} reader_errors={}",
            self.polls,
            self.reads,
            self.accepted,
            self.suppressed,
            self.delivered,
            self.dropped(),
            self.read_failures,
            self.reader_errors,
        )
    }
}
