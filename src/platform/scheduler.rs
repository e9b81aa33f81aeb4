//! Fixed-delay timer on a virtual millisecond clock
//!
//! Holds at most one pending wakeup. When it falls due the scheduler calls
//! `GameState::advance` and books whatever `Next` comes back, which gives
//! the repeating tick and the one-shot life-lost reset without the
//! simulation ever scheduling itself.

use crate::sim::{GameState, Key, Next, RandomSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wakeup {
    at_ms: u64,
    next: Next,
}

/// Drives a game from an external clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    pending: Option<Wakeup>,
    halted: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Time of the pending wakeup, if any
    pub fn pending_at(&self) -> Option<u64> {
        self.pending.map(|w| w.at_ms)
    }

    /// True once the game reached a terminal phase
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Book the wakeup requested by the simulation
    pub fn schedule(&mut self, next: Next) {
        self.pending = match next {
            Next::Tick { delay_ms } | Next::Reset { delay_ms } => Some(Wakeup {
                at_ms: self.now_ms + delay_ms,
                next,
            }),
            Next::AwaitStart => None,
            Next::Halt => {
                self.halted = true;
                None
            }
        };
    }

    /// Deliver a key press; a press that starts play books the first tick
    pub fn press<R: RandomSource>(&mut self, key: Key, state: &mut GameState<R>) {
        if let Some(next) = state.handle_input(key) {
            self.schedule(next);
        }
    }

    /// Move the clock forward to `now_ms`, firing every wakeup due on the
    /// way. Returns the number of `advance` calls made.
    pub fn run_until<R: RandomSource>(&mut self, now_ms: u64, state: &mut GameState<R>) -> usize {
        let mut fired = 0;
        loop {
            let Some(wakeup) = self.pending else {
                break;
            };
            if wakeup.at_ms > now_ms {
                break;
            }
            self.now_ms = wakeup.at_ms;
            self.pending = None;
            if matches!(wakeup.next, Next::Reset { .. }) {
                log::debug!("Serving new ball at {} ms", self.now_ms);
            }
            let next = state.advance();
            self.schedule(next);
            fired += 1;
        }
        self.now_ms = self.now_ms.max(now_ms);
        fired
    }
}
