//! Background reclamation of idle client state.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::admission::AdmissionController;

/// Spawns a task sweeping `controller` every `sweep_interval` until
/// `cancel` fires.
///
/// The first sweep runs immediately. Must be called from within a tokio
/// runtime.
pub fn spawn_reclaimer(
    controller: Arc<AdmissionController>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let period = controller.config().sweep_interval;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Reclaimer stopped");
                    break;
                }
                _ = interval.tick() => {
                    let removed = controller.sweep();
                    if removed > 0 {
                        tracing::debug!(
                            "Reclaimed {removed} idle clients, {} remaining",
                            controller.len()
                        );
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::LimiterConfig;
    use std::time::Duration;

    fn controller() -> (Arc<AdmissionController>, ManualClock) {
        let clock = ManualClock::new();
        let ctrl =
            AdmissionController::with_clock(LimiterConfig::default(), Arc::new(clock.clone()))
                .unwrap();
        (Arc::new(ctrl), clock)
    }

    #[tokio::test(start_paused = true)]
    async fn reclaimer_removes_stale_clients() {
        let (ctrl, clock) = controller();
        ctrl.check_admission("10.0.0.1");
        clock.advance(Duration::from_secs(181));

        let cancel = CancellationToken::new();
        let handle = spawn_reclaimer(Arc::clone(&ctrl), cancel.clone());

        for _ in 0..10 {
            if ctrl.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        assert!(ctrl.is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reclaimer_keeps_active_clients() {
        let (ctrl, clock) = controller();
        ctrl.check_admission("active");

        let cancel = CancellationToken::new();
        let handle = spawn_reclaimer(Arc::clone(&ctrl), cancel.clone());

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_secs(60)).await;
            clock.advance(Duration::from_secs(60));
            ctrl.check_admission("active");
        }
        assert!(ctrl.contains("active"));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn reclaimer_stops_on_cancel() {
        let (ctrl, _clock) = controller();
        let cancel = CancellationToken::new();
        let handle = spawn_reclaimer(ctrl, cancel.clone());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reclaimer did not stop")
            .unwrap();
    }
}
