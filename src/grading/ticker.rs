// src/grading/ticker.rs

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::session::TickOutcome;
use super::workspace::SharedWorkspace;

/// Drives the session countdown from a real clock.
///
/// Calls `tick()` once per `period`. Ticks are no-ops unless an attempt is
/// running, so the task can live for the whole process.
pub fn spawn_ticker(workspace: SharedWorkspace, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut ws = workspace.lock().await;
            if ws.tick() == TickOutcome::Expired {
                if let Some(result) = ws.session().result() {
                    tracing::info!(
                        "Time expired, attempt graded {}/{}",
                        result.correct_count,
                        result.total_questions
                    );
                }
            }
        }
    })
}
