//! Paint trigger state machine.

/// Whether the trigger is currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Idle,
    Painting,
}

/// Tracks engage/release of the paint gesture.
///
/// Engaging while already painting, or releasing while idle, changes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaintTrigger {
    state: TriggerState,
}

impl PaintTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `selectstart`. Returns `true` if this moved the trigger to `Painting`.
    pub fn select_start(&mut self) -> bool {
        self.transition(TriggerState::Painting)
    }

    /// Handle `selectend`. Returns `true` if this moved the trigger to `Idle`.
    pub fn select_end(&mut self) -> bool {
        self.transition(TriggerState::Idle)
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    #[must_use]
    pub fn is_painting(&self) -> bool {
        self.state == TriggerState::Painting
    }

    fn transition(&mut self, next: TriggerState) -> bool {
        let changed = self.state != next;
        self.state = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let trigger = PaintTrigger::new();
        assert_eq!(trigger.state(), TriggerState::Idle);
        assert!(!trigger.is_painting());
    }

    #[test]
    fn select_start_begins_painting() {
        let mut trigger = PaintTrigger::new();
        assert!(trigger.select_start());
        assert!(trigger.is_painting());
    }

    #[test]
    fn select_end_returns_to_idle() {
        let mut trigger = PaintTrigger::new();
        trigger.select_start();
        assert!(trigger.select_end());
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn repeated_events_are_noops() {
        let mut trigger = PaintTrigger::new();
        assert!(!trigger.select_end());
        assert!(trigger.select_start());
        assert!(!trigger.select_start());
        assert!(trigger.is_painting());
    }
}
