use std::sync::Weak;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::controller::{ControllerInner, ExamController};

const TICK: Duration = Duration::from_secs(1);

/// Spawn the one-second countdown driver.
///
/// Holds only a weak reference, so dropping every controller handle ends it
/// at the next tick. Cancellation ends it immediately.
pub(crate) fn spawn_countdown(inner: Weak<ControllerInner>, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(inner) = inner.upgrade() else { break };
                    if inner.tick(TICK.as_secs()) {
                        info!("time expired, submitting");
                        let controller = ExamController::from_inner(inner);
                        // Failures are recorded in the persistence status.
                        let _ = controller.finish().await;
                        break;
                    }
                }
            }
        }
    });
}
