//! The Resync Trigger: decides when a resync pass runs, coalescing signal
//! and timer-driven requests into single passes and handing each pass off
//! to whatever closure the runtime supplies.

mod coalesce;
mod signal;
mod timer;

pub use coalesce::Scheduler;
pub use timer::{build_interval, effective_interval};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Ties the coalescing scheduler to its two request sources: a periodic
/// timer at [`effective_interval`] and a `SIGUSR2` handler. `install` spawns
/// both sources and returns a handle the caller can drop (or abort) to stop
/// listening; `run` then drives passes forever with the supplied closure.
pub struct ResyncTrigger {
    scheduler: Arc<Scheduler>,
    user_interval: Duration,
    provider_query_interval: Duration,
}

impl ResyncTrigger {
    pub fn new(user_interval: Duration, provider_query_interval: Duration) -> Self {
        ResyncTrigger {
            scheduler: Arc::new(Scheduler::new()),
            user_interval,
            provider_query_interval,
        }
    }

    /// Installs the `SIGUSR2` handler and requests an immediate first pass,
    /// per spec.md §4.6's "a resync pass always runs once at startup."
    pub fn install(&self) -> std::io::Result<tokio::task::JoinHandle<()>> {
        let handle = signal::install_sigusr2(Arc::clone(&self.scheduler))?;
        self.scheduler.request();
        Ok(handle)
    }

    /// Drives `pass` forever: once immediately (via [`install`]'s initial
    /// request), then once per timer tick or coalesced batch of `SIGUSR2`
    /// deliveries, for as long as the returned future is polled.
    ///
    /// [`install`]: ResyncTrigger::install
    pub async fn run<F, Fut>(&self, mut pass: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut interval = timer::build_interval(self.user_interval, self.provider_query_interval);
        let scheduler = Arc::clone(&self.scheduler);
        let ticker = {
            let scheduler = Arc::clone(&scheduler);
            async move {
                loop {
                    interval.tick().await;
                    scheduler.request();
                }
            }
        };

        tokio::select! {
            _ = ticker => {}
            _ = scheduler.run(&mut pass) => {}
        }
    }

    /// Requests a pass out of band, e.g. from a CLI command or a test.
    pub fn request(&self) {
        self.scheduler.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn install_requests_an_immediate_first_pass() {
        let trigger = ResyncTrigger::new(Duration::from_secs(3600), Duration::from_secs(3600));
        let _handle = trigger.install().unwrap();

        let pass_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pass_count);
        let run = trigger.run(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::select! {
            _ = run => {}
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }

        assert_eq!(pass_count.load(Ordering::SeqCst), 1);
    }
}
