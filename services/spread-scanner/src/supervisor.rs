use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Restart rate limiting: at most `max_restarts` within a rolling `window`,
/// with the delay between restarts doubling from `base_delay` up to
/// `max_delay`. Without this a worker stuck in a crash loop would thrash the
/// venues it polls; this is not something the pipeline can recover from on
/// its own, so past the budget it gives up and leaves the stage down.
#[derive(Debug, Clone, Copy)]
pub struct RestartPolicy {
    pub max_restarts: usize,
    pub window: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: 5,
            window: Duration::from_secs(60),
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Runs `make_task` (a fresh future on every spawn) as an isolated tokio
/// task, restarting it with backoff if it panics. A clean return (reached
/// only when the worker observes `cancel` and exits its own loop) stops
/// supervision without restarting.
pub async fn supervise<F, Fut>(
    name: &'static str,
    cancel: CancellationToken,
    policy: RestartPolicy,
    mut make_task: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut restart_times: VecDeque<Instant> = VecDeque::new();

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let handle = tokio::spawn(make_task());
        match handle.await {
            Ok(()) => {
                info!(worker = name, "worker exited cleanly");
                break;
            }
            Err(join_err) => {
                error!(worker = name, error = %join_err, "worker crashed");

                let now = Instant::now();
                while let Some(&front) = restart_times.front() {
                    if now.duration_since(front) > policy.window {
                        restart_times.pop_front();
                    } else {
                        break;
                    }
                }

                if restart_times.len() >= policy.max_restarts {
                    error!(
                        worker = name,
                        "exceeded {} restarts within {:?}, giving up",
                        policy.max_restarts,
                        policy.window
                    );
                    break;
                }

                let attempt = restart_times.len() as u32;
                restart_times.push_back(now);
                let delay = policy
                    .base_delay
                    .saturating_mul(1 << attempt)
                    .min(policy.max_delay);
                warn!(worker = name, ?delay, "restarting worker after backoff");

                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = cancel.cancelled() => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn restarts_a_panicking_worker_until_the_cancel_signal_fires() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let policy = RestartPolicy {
            max_restarts: 10,
            window: Duration::from_secs(60),
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };

        let cancel_for_task = cancel.clone();
        let attempts_for_task = attempts.clone();
        let supervise_fut = supervise("test-worker", cancel.clone(), policy, move || {
            let attempts = attempts_for_task.clone();
            let cancel = cancel_for_task.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    panic!("synthetic crash {n}");
                }
                cancel.cancel();
            }
        });

        tokio::time::timeout(Duration::from_secs(5), supervise_fut)
            .await
            .expect("supervisor did not converge in time");

        assert!(attempts.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn gives_up_after_exceeding_the_restart_budget() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let policy = RestartPolicy {
            max_restarts: 2,
            window: Duration::from_secs(60),
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };

        let attempts_for_task = attempts.clone();
        let supervise_fut = supervise("always-crashes", cancel, policy, move || {
            let attempts = attempts_for_task.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                panic!("always crashes");
            }
        });

        tokio::time::timeout(Duration::from_secs(5), supervise_fut)
            .await
            .expect("supervisor did not give up in time");

        // One initial run plus at most max_restarts retries.
        assert!(attempts.load(Ordering::SeqCst) <= 3);
    }
}
