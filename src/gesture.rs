//! Tap versus long-press recognition for one pointer.
//!
//! `press` arms the detector. A release before the timeout is a tap, staying
//! down past it is a long-press. One press/release sequence yields at most one
//! gesture.

use std::time::{Duration, Instant};

pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture<T> {
    Tap(T),
    LongPress(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState<T> {
    Idle,
    Pressed { target: T, since: Instant },
    LongPressFired,
}

#[derive(Debug)]
pub struct GestureDetector<T> {
    long_press_timeout: Duration,
    state: PressState<T>,
}

impl<T: Copy + PartialEq> GestureDetector<T> {
    pub fn new(long_press_timeout: Duration) -> Self {
        Self {
            long_press_timeout,
            state: PressState::Idle,
        }
    }

    pub fn press(&mut self, target: T, now: Instant) {
        self.state = PressState::Pressed { target, since: now };
    }

    /// Fires the long-press once the pointer has been held long enough.
    pub fn tick(&mut self, now: Instant) -> Option<Gesture<T>> {
        match self.state {
            PressState::Pressed { target, since }
                if now.saturating_duration_since(since) >= self.long_press_timeout =>
            {
                self.state = PressState::LongPressFired;
                Some(Gesture::LongPress(target))
            }
            _ => None,
        }
    }

    /// `under_pointer` is the target at the release position, if any.
    pub fn release(&mut self, under_pointer: Option<T>, now: Instant) -> Option<Gesture<T>> {
        let state = std::mem::replace(&mut self.state, PressState::Idle);
        match state {
            PressState::Pressed { target, since } => {
                if now.saturating_duration_since(since) >= self.long_press_timeout {
                    Some(Gesture::LongPress(target))
                } else if under_pointer == Some(target) {
                    Some(Gesture::Tap(target))
                } else {
                    None
                }
            }
            PressState::Idle | PressState::LongPressFired => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = PressState::Idle;
    }

    /// When the pending long-press would fire.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            PressState::Pressed { since, .. } => Some(since + self.long_press_timeout),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> GestureDetector<usize> {
        GestureDetector::new(DEFAULT_LONG_PRESS)
    }

    #[test]
    fn quick_release_is_a_tap() {
        let mut gestures = detector();
        let start = Instant::now();

        gestures.press(2, start);
        assert_eq!(gestures.tick(start + Duration::from_millis(100)), None);

        assert_eq!(
            gestures.release(Some(2), start + Duration::from_millis(120)),
            Some(Gesture::Tap(2))
        );
        assert_eq!(gestures.deadline(), None);
    }

    #[test]
    fn holding_fires_long_press_and_suppresses_the_tap() {
        let mut gestures = detector();
        let start = Instant::now();

        gestures.press(0, start);
        assert_eq!(gestures.deadline(), Some(start + DEFAULT_LONG_PRESS));
        assert_eq!(gestures.tick(start + DEFAULT_LONG_PRESS), Some(Gesture::LongPress(0)));
        assert_eq!(gestures.tick(start + DEFAULT_LONG_PRESS * 2), None);

        assert_eq!(gestures.release(Some(0), start + DEFAULT_LONG_PRESS * 2), None);
    }

    #[test]
    fn late_release_without_tick_is_still_a_long_press() {
        let mut gestures = detector();
        let start = Instant::now();

        gestures.press(1, start);

        assert_eq!(
            gestures.release(Some(1), start + Duration::from_secs(1)),
            Some(Gesture::LongPress(1))
        );
    }

    #[test]
    fn releasing_elsewhere_is_not_a_tap() {
        let mut gestures = detector();
        let start = Instant::now();

        gestures.press(1, start);
        assert_eq!(gestures.release(Some(3), start), None);

        gestures.press(1, start);
        assert_eq!(gestures.release(None, start), None);
    }

    #[test]
    fn release_without_press_does_nothing() {
        let mut gestures = detector();

        assert_eq!(gestures.release(Some(1), Instant::now()), None);
    }

    #[test]
    fn cancel_disarms() {
        let mut gestures = detector();
        let start = Instant::now();

        gestures.press(4, start);
        gestures.cancel();

        assert_eq!(gestures.tick(start + Duration::from_secs(2)), None);
        assert_eq!(gestures.deadline(), None);
    }
}
