use core::ops::ControlFlow;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

// longest uninterrupted sleep between cancellation checks
const SLICE: Duration = Duration::from_millis(100);

/// Shared stop signal, set from a Ctrl-C handler or another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A tick returned `ControlFlow::Break`.
    Finished { iterations: u64 },
    Cancelled { iterations: u64 },
    /// `max_iterations` ticks ran.
    Exhausted { iterations: u64 },
}

/// Runs a tick, waits `interval`, repeats.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    max_iterations: Option<u64>,
    cancel: CancelFlag,
}

impl Poller {
    pub fn new(interval: Duration, cancel: CancelFlag) -> Self {
        Self {
            interval,
            max_iterations: None,
            cancel,
        }
    }

    pub fn max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// The tick gets the zero-based iteration number. An `Err` stops the loop and is returned.
    pub fn run<F, E>(&self, mut tick: F) -> Result<PollOutcome, E>
    where
        F: FnMut(u64) -> Result<ControlFlow<()>, E>,
    {
        let mut iterations = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(PollOutcome::Cancelled { iterations });
            }

            let flow = tick(iterations)?;
            iterations += 1;

            if flow.is_break() {
                return Ok(PollOutcome::Finished { iterations });
            }
            if self.max_iterations.is_some_and(|max| iterations >= max) {
                return Ok(PollOutcome::Exhausted { iterations });
            }

            if !self.sleep() {
                return Ok(PollOutcome::Cancelled { iterations });
            }
        }
    }

    // false when cancelled while waiting
    fn sleep(&self) -> bool {
        // None: interval too large to represent, wait for cancellation only
        let deadline = Instant::now().checked_add(self.interval);
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            match deadline {
                Some(deadline) if now >= deadline => return true,
                Some(deadline) => thread::sleep(SLICE.min(deadline - now)),
                None => thread::sleep(SLICE),
            }
        }
    }
}
