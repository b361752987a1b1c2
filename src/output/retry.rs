//! Retry policy for file-system operations
//!
//! Only contention-style failures (locked or busy files, interrupted calls)
//! are retried. Any other error, or the last failed attempt, is returned.

use crate::config::RetryConfig;
use std::io;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Raw OS codes that signal a busy or locked file
const CONTENTION_CODES: &[i32] = &[
    11, // EAGAIN
    16, // EBUSY
    26, // ETXTBSY
    32, // ERROR_SHARING_VIOLATION
    33, // ERROR_LOCK_VIOLATION
];

/// Returns true when an I/O error is worth retrying
pub fn is_contention(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    ) || err
        .raw_os_error()
        .is_some_and(|code| CONTENTION_CODES.contains(&code))
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.attempts, Duration::from_millis(config.delay_ms))
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op`, retrying contention failures with a fixed delay
    ///
    /// # Arguments
    ///
    /// * `what` - Short description used in log output
    /// * `op` - The operation; called at most `attempts` times
    pub fn run<T, F>(&self, what: &str, mut op: F) -> io::Result<T>
    where
        F: FnMut() -> io::Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts && is_contention(&e) => {
                    warn!(
                        "{} failed (attempt {}/{}): {}",
                        what, attempt, self.attempts, e
                    );
                    thread::sleep(self.delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
