use crate::state::step::StepStatus;

/// Position of the wizard within its steps, plus per-step statuses for progress UIs.
#[derive(Debug, Clone)]
pub struct Flow {
    current: usize,
    statuses: Vec<StepStatus>,
}

impl Flow {
    pub fn new(len: usize, start: usize) -> Self {
        let current = start.min(len.saturating_sub(1));
        let mut statuses = vec![StepStatus::Pending; len];
        for status in statuses.iter_mut().take(current) {
            *status = StepStatus::Done;
        }
        if let Some(status) = statuses.get_mut(current) {
            *status = StepStatus::Active;
        }
        Self { current, statuses }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn statuses(&self) -> &[StepStatus] {
        &self.statuses
    }

    pub fn next_index(&self, skipped: impl Fn(usize) -> bool) -> Option<usize> {
        (self.current + 1..self.statuses.len()).find(|idx| !skipped(*idx))
    }

    pub fn previous_index(&self, skipped: impl Fn(usize) -> bool) -> Option<usize> {
        (0..self.current).rev().find(|idx| !skipped(*idx))
    }

    /// Moves to `index`. `completed` marks the step being left as done.
    pub fn move_to(&mut self, index: usize, completed: bool) -> bool {
        if index >= self.statuses.len() || index == self.current {
            return false;
        }
        if let Some(status) = self.statuses.get_mut(self.current) {
            if completed {
                *status = StepStatus::Done;
            } else if *status == StepStatus::Active {
                *status = StepStatus::Pending;
            }
        }
        self.current = index;
        self.statuses[index] = StepStatus::Active;
        true
    }

    pub fn complete_current(&mut self) {
        if let Some(status) = self.statuses.get_mut(self.current) {
            *status = StepStatus::Done;
        }
    }

    pub fn restart(&mut self) {
        *self = Self::new(self.statuses.len(), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::Flow;
    use crate::state::step::StepStatus;

    #[test]
    fn start_index_is_clamped_and_earlier_steps_done() {
        let flow = Flow::new(3, 7);
        assert_eq!(flow.current_index(), 2);
        assert_eq!(flow.statuses()[0], StepStatus::Done);
        assert_eq!(flow.statuses()[2], StepStatus::Active);
    }

    #[test]
    fn leaving_backwards_keeps_step_pending() {
        let mut flow = Flow::new(3, 0);
        assert!(flow.move_to(1, true));
        assert!(flow.move_to(0, false));

        assert_eq!(flow.statuses(), &[StepStatus::Active, StepStatus::Pending, StepStatus::Pending]);
    }

    #[test]
    fn neighbours_pass_over_skipped_steps() {
        let flow = Flow::new(5, 2);
        assert_eq!(flow.next_index(|idx| idx == 3), Some(4));
        assert_eq!(flow.next_index(|idx| idx > 2), None);
        assert_eq!(flow.previous_index(|idx| idx == 1), Some(0));
        assert_eq!(Flow::new(5, 0).previous_index(|_| false), None);
    }

    #[test]
    fn move_to_rejects_out_of_range() {
        let mut flow = Flow::new(2, 0);
        assert!(!flow.move_to(2, false));
        assert!(!flow.move_to(0, false));
        assert_eq!(flow.current_index(), 0);
    }
}
