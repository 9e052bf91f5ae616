use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Drive `tick` every `period`, starting after `start_delay`.
///
/// Ticks never overlap: the next one is not polled until the previous
/// future resolves. A late tick delays the schedule instead of bursting.
/// The loop ends when `tick` returns [`ControlFlow::Break`]. A zero `period`
/// is raised to one millisecond.
pub async fn run_periodic<F, Fut>(start_delay: Duration, period: Duration, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    let period = period.max(MIN_PERIOD);
    let mut interval = tokio::time::interval_at(Instant::now() + start_delay, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if tick().await.is_break() {
            break;
        }
    }
}

/// Sleep for `delay`, then run `f` once.
pub async fn run_after<F>(delay: Duration, f: F)
where
    F: FnOnce(),
{
    tokio::time::sleep(delay).await;
    f();
}
