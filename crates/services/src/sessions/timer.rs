use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Whole-second counter that only advances while its session is active.
#[derive(Debug, Clone, Default)]
pub struct ElapsedTimer {
    seconds: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
}

impl ElapsedTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seconds(&self) -> u64 {
        self.seconds.load(Ordering::Relaxed)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.seconds.store(0, Ordering::Relaxed);
    }

    /// Count one second if the timer is active.
    pub fn tick(&self) {
        if self.active.load(Ordering::Relaxed) {
            self.seconds.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Drive [`ElapsedTimer::tick`] once per second on the current runtime.
    #[must_use]
    pub fn spawn(&self) -> JoinHandle<()> {
        let timer = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                timer.tick();
            }
        })
    }

    #[must_use]
    pub fn display(&self) -> String {
        format_elapsed(self.seconds())
    }
}

/// `"<m>m <s>s"`, e.g. `"2m 05s"`.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}m {:02}s", seconds / 60, seconds % 60)
}
