use crate::crossing::arrival::Arrival;
use crate::crossing::formation::{assign_role, Role};
use crate::crossing::random_below;
use crate::crossing::state::Crossing;
use crate::crossing::transcript::Action;
use tokio::time::sleep;
use tracing::debug;

/// Result of a single attempt to get onto the pier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted(Role),
    Rejected,
}

impl Crossing {
    /// One admission attempt, atomic with its transcript record.
    ///
    /// A full pier logs `leaves queue`. Otherwise the arrival takes a pier
    /// slot, logs `waits` and is immediately checked for quorum.
    pub async fn try_enter(&self, arrival: &Arrival) -> Admission {
        let mut state = self.state.lock().await;

        if state.pier.total() >= self.config.pier_capacity {
            state.stats.rejections += 1;
            state.emit(arrival, Action::LeavesQueue);
            return Admission::Rejected;
        }

        state.pier[arrival.class] += 1;
        state.unassigned[arrival.class] += 1;
        state.emit(arrival, Action::Waits);

        Admission::Admitted(assign_role(&mut state.unassigned, arrival.class))
    }

    /// Retry admission until it succeeds. Between attempts the arrival is away
    /// for a random time below the pier return bound.
    pub async fn enter(&self, arrival: &Arrival) -> Role {
        loop {
            match self.try_enter(arrival).await {
                Admission::Admitted(role) => return role,
                Admission::Rejected => {
                    let away = random_below(self.config.pier_return_bound);
                    debug!(arrival = %arrival, ?away, "Pier full");
                    sleep(away).await;
                    self.state.lock().await.emit(arrival, Action::IsBack);
                }
            }
        }
    }
}
