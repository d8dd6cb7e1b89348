//! One-shot and periodic callbacks bound to the lifetime of a handle.
//!
//! Each timer runs on its own thread and waits on a cancel channel with
//! `recv_timeout`. Cancelling the handle, or dropping it, disconnects the
//! channel and the callback never runs again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::trace;

#[derive(Debug)]
pub struct TimerHandle {
    cancel: Option<mpsc::Sender<()>>,
    finished: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn cancel(mut self) {
        self.stop();
    }

    /// True once the callback has run to completion (one-shot) or the loop has ended.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn stop(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn schedule_once<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<()>();
    let finished = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&finished);
    thread::spawn(move || {
        if let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(delay) {
            callback();
        } else {
            trace!("one-shot timer cancelled");
        }
        done.store(true, Ordering::Release);
    });
    TimerHandle {
        cancel: Some(tx),
        finished,
    }
}

/// Calls `tick` with the number of elapsed periods until it returns `false`
/// or the handle is cancelled.
pub fn schedule_every<F>(period: Duration, mut tick: F) -> TimerHandle
where
    F: FnMut(u64) -> bool + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<()>();
    let finished = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&finished);
    thread::spawn(move || {
        let mut ticks = 0u64;
        while let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(period) {
            ticks += 1;
            if !tick(ticks) {
                break;
            }
        }
        done.store(true, Ordering::Release);
    });
    TimerHandle {
        cancel: Some(tx),
        finished,
    }
}
