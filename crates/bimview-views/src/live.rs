#![forbid(unsafe_code)]

//! Periodic frames for live monitoring.
//!
//! A [`LiveMonitor`] owns a background thread that renders the same request
//! on a fixed interval and offers each frame to a bounded queue without
//! blocking. When the consumer falls behind, new frames are dropped and
//! counted. The thread stops between ticks once its [`CancelToken`] fires or
//! the receiver is dropped.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use bimview_core::config::RendererConfig;
use bimview_render::ansi::CLEAR_SCREEN;
use chrono::Utc;
use web_time::Duration;

use crate::cancellation::CancelToken;
use crate::error::RenderError;
use crate::request::RenderRequest;
use crate::router::ViewRouter;

/// Dropped frames are logged on the first drop and then every this many.
const DROP_LOG_EVERY: u64 = 100;

/// Frame counters shared with the worker thread.
#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    dropped: AtomicU64,
}

/// Header line for frame `n`.
pub fn frame_header(n: u64) -> String {
    format!(
        "Live — {} — frame {n}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Handle to a running live monitor.
#[derive(Debug)]
pub struct LiveMonitor {
    frames: Receiver<String>,
    counters: Arc<Counters>,
    handle: Option<JoinHandle<()>>,
}

impl LiveMonitor {
    /// Start rendering `request` every `config.refresh_interval()`.
    ///
    /// The request is validated up front; a request the router would reject
    /// fails here with [`io::ErrorKind::InvalidInput`] instead of on every tick.
    pub fn spawn(
        router: ViewRouter,
        request: RenderRequest,
        config: &RendererConfig,
        token: CancelToken,
    ) -> io::Result<Self> {
        router
            .validate(&request)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

        let level = router.level_for(&request);
        let (tx, rx) = mpsc::sync_channel(config.live_queue_capacity.max(1));
        let counters = Arc::new(Counters::default());
        let interval = config.refresh_interval();
        let worker_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("bimview-live".into())
            .spawn(move || run(&router, &request, interval, &tx, &worker_counters, &token))?;

        tracing::info!(
            level = %level,
            interval_ms = interval.as_millis() as u64,
            "live monitor started"
        );
        Ok(Self {
            frames: rx,
            counters,
            handle: Some(handle),
        })
    }

    /// The frame queue.
    pub fn frames(&self) -> &Receiver<String> {
        &self.frames
    }

    /// Next frame if one is queued.
    pub fn try_next(&self) -> Option<String> {
        self.frames.try_recv().ok()
    }

    /// Wait up to `timeout` for the next frame. `None` on timeout or once the
    /// monitor has stopped and the queue is empty.
    pub fn next_timeout(&self, timeout: Duration) -> Option<String> {
        match self.frames.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Frames delivered to the queue.
    pub fn sent(&self) -> u64 {
        self.counters.sent.load(Ordering::Relaxed)
    }

    /// Frames discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker to exit. Cancel its token first.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    router: &ViewRouter,
    request: &RenderRequest,
    interval: Duration,
    tx: &SyncSender<String>,
    counters: &Counters,
    token: &CancelToken,
) {
    let mut frame: u64 = 0;
    while !token.is_cancelled() {
        frame += 1;
        match router.render(request) {
            Ok(body) => {
                let text = format!("{CLEAR_SCREEN}{}\n{body}", frame_header(frame));
                match tx.try_send(text) {
                    Ok(()) => {
                        counters.sent.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Full(_)) => {
                        let dropped = counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                        if dropped == 1 || dropped % DROP_LOG_EVERY == 0 {
                            tracing::warn!(dropped, frame, "live consumer behind; frame dropped");
                        }
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
            Err(err) => log_render_error(&err),
        }
        if token.wait_timeout(interval) {
            break;
        }
    }
    tracing::info!(
        frames = frame,
        sent = counters.sent.load(Ordering::Relaxed),
        dropped = counters.dropped.load(Ordering::Relaxed),
        "live monitor stopped"
    );
}

fn log_render_error(err: &RenderError) {
    tracing::warn!(error = %err, "live frame failed to render");
}

#[cfg(test)]
mod tests {
    use bimview_core::config::ViewLevel;
    use bimview_core::model::Building;

    use super::*;
    use crate::cancellation::CancelSource;

    fn config(interval_ms: u64, capacity: usize) -> RendererConfig {
        RendererConfig {
            refresh_interval_ms: interval_ms,
            live_queue_capacity: capacity,
            ..RendererConfig::default()
        }
    }

    fn building() -> Building {
        Building {
            id: "b1".into(),
            name: "HQ".into(),
            floors: Vec::new(),
        }
    }

    #[test]
    fn frames_carry_clear_and_header() {
        let source = CancelSource::new();
        let cfg = config(10, 4);
        let monitor = LiveMonitor::spawn(
            ViewRouter::new(cfg.clone()),
            RenderRequest::building(building()),
            &cfg,
            source.token(),
        )
        .unwrap();
        let frame = monitor.next_timeout(Duration::from_secs(5)).unwrap();
        source.cancel();
        assert!(frame.starts_with(CLEAR_SCREEN));
        assert!(frame.contains("Live — "));
        assert!(frame.contains(" UTC — frame 1\nBuilding: HQ (b1)"));
        monitor.join();
    }

    #[test]
    fn slow_consumer_drops_frames() {
        let source = CancelSource::new();
        let cfg = config(1, 1);
        let monitor = LiveMonitor::spawn(
            ViewRouter::new(cfg.clone()),
            RenderRequest::building(building()),
            &cfg,
            source.token(),
        )
        .unwrap();
        let start = std::time::Instant::now();
        while monitor.dropped() == 0 && start.elapsed() < std::time::Duration::from_secs(5) {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        source.cancel();
        assert!(monitor.dropped() > 0);
        assert_eq!(monitor.sent(), 1);
        monitor.join();
    }

    #[test]
    fn invalid_request_fails_before_spawning() {
        let cfg = config(10, 1);
        let err = LiveMonitor::spawn(
            ViewRouter::new(cfg.clone()),
            RenderRequest::new(ViewLevel::Spatial),
            &cfg,
            CancelSource::new().token(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("spatial view requires spatial anchor data"));
    }

    #[test]
    fn cancel_stops_the_worker() {
        let source = CancelSource::new();
        let cfg = config(60_000, 2);
        let monitor = LiveMonitor::spawn(
            ViewRouter::new(cfg.clone()),
            RenderRequest::building(building()),
            &cfg,
            source.token(),
        )
        .unwrap();
        assert!(monitor.next_timeout(Duration::from_secs(5)).is_some());
        source.cancel();
        let start = std::time::Instant::now();
        while !monitor.is_finished() && start.elapsed() < std::time::Duration::from_secs(5) {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(monitor.is_finished());
        assert_eq!(monitor.try_next(), None);
    }
}
