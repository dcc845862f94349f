use crate::game::session::MatchSession;
use crate::game::types::MatchSnapshot;
use crate::registry::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

/// Receives what a running match produces. The network layer broadcasts;
/// tests record.
pub trait MatchObserver: Send + Sync {
    /// Called after every tick with the state that tick produced, including
    /// the tick that ends the match.
    fn on_tick(&self, snapshot: &MatchSnapshot);

    /// Called once, after the match has been unregistered because it ended.
    /// Skipped when a disconnect already tore the match down.
    fn on_finished(&self, snapshot: &MatchSnapshot);
}

#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    registry: Arc<SessionRegistry>,
}

impl TickScheduler {
    pub fn new(period: Duration, registry: Arc<SessionRegistry>) -> Self {
        Self { period, registry }
    }

    /// Drives `session` until it is over or nothing else holds it. Only a
    /// weak handle is kept between firings, so unregistering the match is
    /// enough to stop the loop.
    pub fn start(
        &self,
        session: &Arc<MatchSession>,
        observer: Arc<dyn MatchObserver>,
    ) -> JoinHandle<()> {
        let handle = Arc::downgrade(session);
        let registry = Arc::clone(&self.registry);
        let period = self.period;
        let match_id = session.id();

        tokio::spawn(async move {
            let mut interval = tick_interval(period);
            loop {
                interval.tick().await;
                let Some(session) = handle.upgrade() else {
                    tracing::debug!(%match_id, "match discarded, stopping tick loop");
                    break;
                };

                if session.is_game_over() {
                    if registry.unregister(&session) {
                        let snapshot = session.snapshot();
                        tracing::info!(%match_id, winner = snapshot.winner, "match finished");
                        observer.on_finished(&snapshot);
                    }
                    break;
                }

                session.tick();
                let snapshot = session.snapshot();
                tracing::debug!(
                    %match_id,
                    len1 = snapshot.snakes[0].body.len(),
                    len2 = snapshot.snakes[1].body.len(),
                    game_over = snapshot.game_over,
                    "tick"
                );
                observer.on_tick(&snapshot);
            }
        })
    }
}

/// A stalled loop resumes one period later instead of firing the missed
/// ticks back to back.
fn tick_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
