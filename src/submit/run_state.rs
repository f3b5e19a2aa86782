/// Bookkeeping for submission runs of one wizard: at most one in flight, and
/// every run gets a fresh id so late answers can be recognised.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRunState {
    in_flight: Option<u64>,
    attempts: usize,
    sequence: u64,
}

impl SubmissionRunState {
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Starts a run, or returns `None` while another one is in flight.
    pub fn try_start(&mut self) -> Option<u64> {
        if self.in_flight.is_some() {
            return None;
        }
        self.sequence = self.sequence.saturating_add(1);
        self.in_flight = Some(self.sequence);
        self.attempts = self.attempts.saturating_add(1);
        Some(self.sequence)
    }

    /// Closes `run_id` if it is the current run. Stale ids return false.
    pub fn finish(&mut self, run_id: u64) -> bool {
        if self.in_flight != Some(run_id) {
            return false;
        }
        self.in_flight = None;
        true
    }

    pub fn abandon(&mut self) -> Option<u64> {
        self.in_flight.take()
    }
}
