//! Warnings raised while a drill owns the terminal.
//!
//! A drill asks questions on stdout and reads answers from stdin, so a warning
//! about a skipped scenario record or an unsaved attempt would land in the
//! middle of a question. While a [`HeldWarnings`] guard is alive, warnings
//! queue up and come out when the drill is over.

use std::sync::{Mutex, MutexGuard};

static QUEUE: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn queue() -> MutexGuard<'static, Option<Vec<String>>> {
    QUEUE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps warnings queued until released. Dropping it without calling
/// [`HeldWarnings::release`] prints whatever was queued.
#[must_use = "warnings print as soon as the guard is dropped"]
pub struct HeldWarnings {
    _private: (),
}

/// Start queueing warnings.
pub fn hold() -> HeldWarnings {
    *queue() = Some(Vec::new());
    HeldWarnings { _private: () }
}

impl HeldWarnings {
    /// Stop queueing and return the queued warnings, oldest first.
    pub fn release(self) -> Vec<String> {
        let mut guard = queue();
        let queued = guard.take().unwrap_or_default();
        drop(guard);
        queued
    }
}

impl Drop for HeldWarnings {
    fn drop(&mut self) {
        let queued = queue().take().unwrap_or_default();
        for warning in queued {
            eprintln!("{}", warning);
        }
    }
}

/// Print a warning now, or queue it while a drill holds warnings.
/// The same warning is only queued once.
pub fn warn(msg: String) {
    let mut guard = queue();
    match guard.as_mut() {
        Some(queued) => {
            if !queued.contains(&msg) {
                queued.push(msg);
            }
        }
        None => {
            drop(guard);
            eprintln!("{}", msg);
        }
    }
}

/// `eprintln!` for warnings that may have to wait until a drill finishes.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}
