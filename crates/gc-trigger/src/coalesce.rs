use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, Notify};

/// Coalesces any number of pending resync requests arriving while a pass is
/// in flight into exactly one additional pass, per spec.md §5 and the
/// signal-coalescing scenario in §8: the pipeline lock (`Mutex<()>`) holds
/// at most one pass at a time; the `again` flag, set by every [`request`]
/// and observed at pass end, decides whether another pass immediately
/// follows.
///
/// [`request`]: Scheduler::request
pub struct Scheduler {
    again: AtomicBool,
    notify: Notify,
    lock: Mutex<()>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler {
            again: AtomicBool::new(false),
            notify: Notify::new(),
            lock: Mutex::new(()),
        }
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a resync pass. Safe to call from a signal handler routing
    /// thread or a timer tick; any number of calls made while a pass is
    /// already running collapse into a single additional pass.
    pub fn request(&self) {
        self.again.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Runs `pass` forever, once per coalesced batch of requests. Exits
    /// only if `pass` itself never returns (it's meant to be spawned as a
    /// long-lived task and dropped/aborted on shutdown).
    pub async fn run<F, Fut>(&self, mut pass: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            self.notify.notified().await;
            while self.again.swap(false, Ordering::SeqCst) {
                let _guard = self.lock.lock().await;
                pass().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn three_coalesced_requests_during_one_pass_yield_exactly_one_more() {
        let scheduler = Arc::new(Scheduler::new());
        let pass_count = Arc::new(AtomicUsize::new(0));

        let sched = Arc::clone(&scheduler);
        let counter = Arc::clone(&pass_count);
        let runner = tokio::spawn(async move {
            sched
                .run(|| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        // hold the "pass" open long enough for three more
                        // requests to coalesce behind it.
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                })
                .await;
        });

        scheduler.request();
        tokio::time::sleep(Duration::from_millis(10)).await;
        scheduler.request();
        scheduler.request();
        scheduler.request();

        tokio::time::sleep(Duration::from_millis(200)).await;
        runner.abort();

        // One pass for the initial request, exactly one more for the three
        // coalesced requests that arrived mid-pass.
        assert_eq!(pass_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_single_request_runs_exactly_one_pass() {
        let scheduler = Arc::new(Scheduler::new());
        let pass_count = Arc::new(AtomicUsize::new(0));

        let sched = Arc::clone(&scheduler);
        let counter = Arc::clone(&pass_count);
        let runner = tokio::spawn(async move {
            sched
                .run(|| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .await;
        });

        scheduler.request();
        tokio::time::sleep(Duration::from_millis(50)).await;
        runner.abort();

        assert_eq!(pass_count.load(Ordering::SeqCst), 1);
    }
}
