#![forbid(unsafe_code)]

//! Stop signal for background monitors.
//!
//! A [`CancelSource`] is held by whoever started the work; each worker gets a
//! [`CancelToken`] and checks it between units of work. Cancellation never
//! interrupts a render in progress.
//!
//! ```
//! use bimview_views::cancellation::CancelSource;
//! use std::time::Duration;
//!
//! let source = CancelSource::new();
//! let token = source.token();
//! let worker = std::thread::spawn(move || {
//!     let mut ticks = 0;
//!     while !token.wait_timeout(Duration::from_millis(5)) {
//!         ticks += 1;
//!     }
//!     ticks
//! });
//! source.cancel();
//! let _ = worker.join();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use web_time::{Duration, Instant};

struct Shared {
    cancelled: AtomicBool,
    wake: (Mutex<()>, Condvar),
}

/// Cloneable view of a cancellation flag.
#[derive(Clone)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

/// Owner side of a cancellation flag.
///
/// Dropping the source does not cancel; call [`cancel`](Self::cancel).
pub struct CancelSource {
    shared: Arc<Shared>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancelled: AtomicBool::new(false),
                wake: (Mutex::new(()), Condvar::new()),
            }),
        }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Request cancellation and wake every sleeping waiter.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
        let (lock, cvar) = &self.shared.wake;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Sleep up to `timeout`, waking early on cancellation.
    ///
    /// Returns `true` if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &self.shared.wake;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = cvar
                .wait_timeout(guard, deadline - now)
                .map(|(g, _)| g)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
