use crate::coalesce::Scheduler;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};

/// Spawns a task that listens for `SIGUSR2` and routes each delivery into
/// `scheduler.request()`. Per spec.md §5, the handler path does no I/O of
/// its own — routing is the only thing it does, letting the scheduler's
/// coalescing logic absorb however many signals arrive before the running
/// pass checks back in.
pub fn install_sigusr2(scheduler: Arc<Scheduler>) -> std::io::Result<tokio::task::JoinHandle<()>> {
    let mut stream = signal(SignalKind::user_defined2())?;
    Ok(tokio::spawn(async move {
        loop {
            match stream.recv().await {
                Some(()) => {
                    tracing::debug!("SIGUSR2 received, requesting a resync pass");
                    scheduler.request();
                }
                None => break,
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn a_raised_sigusr2_reaches_the_scheduler() {
        let scheduler = Arc::new(Scheduler::new());
        let _handle = install_sigusr2(Arc::clone(&scheduler)).unwrap();

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

        unsafe {
            libc::raise(libc::SIGUSR2);
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        runner.abort();

        assert!(pass_count.load(Ordering::SeqCst) >= 1);
    }
}
