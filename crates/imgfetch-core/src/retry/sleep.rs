//! "Wait for a duration" capability used between attempts.

use std::time::Duration;

pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSleeper {
    pub delays: Vec<Duration>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}
