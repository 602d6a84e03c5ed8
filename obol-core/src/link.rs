//! Wireless link bring-up
//!
//! Tick-driven rendition of the association wait: the caller polls the
//! radio on a fixed interval and feeds the status here; the manager
//! tracks the hard deadline and produces the final verdict. There is no
//! partial failure and no backoff - association either completes inside
//! the deadline or the device restarts.

use crate::config::LINK_DEADLINE_MS;

/// Wireless association state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No association, no attempt in progress
    Disconnected,
    /// Association attempt in progress
    Connecting,
    /// Associated with the access point
    Connected,
}

impl LinkState {
    /// Check if the link is associated
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// Check if an attempt is in flight
    pub fn is_connecting(&self) -> bool {
        matches!(self, LinkState::Connecting)
    }
}

/// Outcome of one bring-up poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUp {
    /// Not associated yet, deadline not reached; poll again after
    /// [`crate::config::LINK_POLL_INTERVAL_MS`]
    Retry,
    /// Association established
    Up,
    /// Deadline expired without association. The only recovery for this
    /// class of failure is a full device restart, issued by the caller.
    GiveUp,
}

/// Tracks one wireless bring-up attempt against a hard deadline.
///
/// The manager never touches the radio itself; the caller owns the join
/// commands and feeds association status into [`poll`](Self::poll)
/// together with a monotonic millisecond clock.
#[derive(Debug, Clone)]
pub struct LinkManager {
    state: LinkState,
    started_at_ms: u64,
}

impl LinkManager {
    pub const fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            started_at_ms: 0,
        }
    }

    /// Start tracking a station-mode association attempt at `now_ms`.
    ///
    /// The deadline is measured from this call.
    pub fn begin(&mut self, now_ms: u64) {
        self.state = LinkState::Connecting;
        self.started_at_ms = now_ms;
    }

    /// Feed the current association status.
    ///
    /// Returns [`BringUp::Up`] as soon as `associated` is true,
    /// [`BringUp::GiveUp`] once the deadline has expired, and
    /// [`BringUp::Retry`] otherwise.
    pub fn poll(&mut self, now_ms: u64, associated: bool) -> BringUp {
        if associated {
            self.state = LinkState::Connected;
            return BringUp::Up;
        }

        if now_ms.saturating_sub(self.started_at_ms) >= LINK_DEADLINE_MS {
            self.state = LinkState::Disconnected;
            return BringUp::GiveUp;
        }

        BringUp::Retry
    }

    /// Current association status. Pure query, no side effects.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }
}

impl Default for LinkManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LINK_POLL_INTERVAL_MS;
    use proptest::prelude::*;

    /// Drive a full bring-up loop the way the orchestrator does: poll on
    /// the fixed interval, stop on the first verdict. Returns the number
    /// of restarts a caller would have issued and the final verdict.
    fn drive(link: &mut LinkManager, associated_at_ms: Option<u64>) -> (u32, BringUp) {
        link.begin(0);
        let mut now_ms = 0;
        let mut restarts = 0;
        loop {
            let associated = associated_at_ms.is_some_and(|at| now_ms >= at);
            match link.poll(now_ms, associated) {
                BringUp::Retry => now_ms += LINK_POLL_INTERVAL_MS,
                BringUp::Up => return (restarts, BringUp::Up),
                BringUp::GiveUp => {
                    restarts += 1;
                    return (restarts, BringUp::GiveUp);
                }
            }
        }
    }

    #[test]
    fn test_connect_before_deadline() {
        let mut link = LinkManager::new();
        let (restarts, verdict) = drive(&mut link, Some(10_000));
        assert_eq!(verdict, BringUp::Up);
        assert_eq!(restarts, 0);
        assert!(link.is_connected());
        assert_eq!(link.state(), LinkState::Connected);
    }

    #[test]
    fn test_immediate_association() {
        let mut link = LinkManager::new();
        link.begin(0);
        assert_eq!(link.poll(0, true), BringUp::Up);
        assert!(link.is_connected());
    }

    #[test]
    fn test_deadline_restarts_exactly_once() {
        let mut link = LinkManager::new();
        let (restarts, verdict) = drive(&mut link, None);
        assert_eq!(verdict, BringUp::GiveUp);
        assert_eq!(restarts, 1);
        assert!(!link.is_connected());
    }

    #[test]
    fn test_association_on_the_deadline_edge() {
        // Association observed on the same poll the deadline would expire
        // wins: the status check comes first.
        let mut link = LinkManager::new();
        link.begin(0);
        assert_eq!(link.poll(LINK_DEADLINE_MS, true), BringUp::Up);
    }

    #[test]
    fn test_states_while_connecting() {
        let mut link = LinkManager::new();
        assert_eq!(link.state(), LinkState::Disconnected);
        link.begin(0);
        assert_eq!(link.state(), LinkState::Connecting);
        assert!(link.state().is_connecting());
        assert!(!link.is_connected());
        link.poll(500, false);
        assert_eq!(link.state(), LinkState::Connecting);
    }

    #[test]
    fn test_deadline_measured_from_begin() {
        // A manager started late still gets the full window.
        let mut link = LinkManager::new();
        link.begin(5_000);
        assert_eq!(link.poll(5_000 + LINK_DEADLINE_MS - 1, false), BringUp::Retry);
        assert_eq!(link.poll(5_000 + LINK_DEADLINE_MS, false), BringUp::GiveUp);
    }

    proptest! {
        #[test]
        fn prop_association_inside_window_never_gives_up(at in 0u64..LINK_DEADLINE_MS) {
            let mut link = LinkManager::new();
            let (restarts, verdict) = drive(&mut link, Some(at));
            prop_assert_eq!(verdict, BringUp::Up);
            prop_assert_eq!(restarts, 0);
            prop_assert!(link.is_connected());
        }

        #[test]
        fn prop_no_association_gives_up_once(extra in 0u64..120_000) {
            // However late the clock runs past the deadline, a single
            // verdict comes out and it is GiveUp.
            let mut link = LinkManager::new();
            link.begin(0);
            prop_assert_eq!(link.poll(LINK_DEADLINE_MS + extra, false), BringUp::GiveUp);

            let (restarts, verdict) = drive(&mut link, None);
            prop_assert_eq!(verdict, BringUp::GiveUp);
            prop_assert_eq!(restarts, 1);
        }
    }
}
