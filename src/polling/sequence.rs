//! Ordering of overlapping poll responses.

/// Tags outgoing fetches and rejects responses that arrive after a newer one.
///
/// Sequence numbers start at 1. A response is applied only if its number is higher than
/// the last applied one, so a slow fetch can never overwrite the result of a later fetch.
#[derive(Debug, Default)]
pub struct SequenceGate {
    issued: u64,
    applied: u64,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for the next outgoing fetch.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Records `seq` as applied if it is newer than everything applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}
