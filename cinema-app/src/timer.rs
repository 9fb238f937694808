use chrono::{DateTime, Utc};
use cinema_core::countdown::{format_countdown, remaining_seconds};
use cinema_core::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Ticking "MM:SS" countdown for one unpaid booking.
///
/// Publishes immediately, then once a second until `00:00`. It only reports
/// time; removing the expired booking is the caller's decision.
pub struct PaymentTimer {
    rx: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl PaymentTimer {
    pub fn start(booked_at: DateTime<Utc>, window_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        let initial = remaining_seconds(booked_at, window_seconds, clock.now());
        let (tx, rx) = watch::channel(format_countdown(initial));

        // Anchored here, not when the task first runs
        let mut ticks = tokio::time::interval(Duration::from_secs(1));
        let task = tokio::spawn(async move {
            let mut remaining = initial;
            // First tick completes immediately
            ticks.tick().await;

            while remaining > 0 {
                ticks.tick().await;
                remaining = remaining_seconds(booked_at, window_seconds, clock.now());
                if tx.send(format_countdown(remaining)).is_err() {
                    return;
                }
            }
            debug!("Payment window elapsed");
        });

        Self { rx, task }
    }

    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PaymentTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
