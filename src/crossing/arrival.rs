use crate::core::errors::Result;
use crate::crossing::formation::Role;
use crate::crossing::state::{Class, Crossing};
use crate::crossing::transcript::Action;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One member of either population, identified by class and per-class id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arrival {
    pub class: Class,
    pub id: u32,
}

impl Arrival {
    pub fn new(class: Class, id: u32) -> Self {
        Self { class, id }
    }

    /// Full lifecycle: announce, get onto the pier, then board as captain or
    /// crew and disembark.
    pub async fn run(self, crossing: Arc<Crossing>) -> Result<()> {
        crossing.state.lock().await.emit(&self, Action::Starts);

        let role = crossing.enter(&self).await;
        debug!(arrival = %self, ?role, "Admitted to pier");

        match role {
            Role::Captain(composition) => crossing.captain(&self, composition).await,
            Role::Crew => crossing.crew(&self).await,
        }
    }
}

impl fmt::Display for Arrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.class, self.id)
    }
}
