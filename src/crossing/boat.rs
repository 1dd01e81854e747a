use crate::core::errors::Result;
use crate::crossing::arrival::Arrival;
use crate::crossing::formation::{Composition, CREW_SIZE};
use crate::crossing::random_below;
use crate::crossing::state::{Class, Crossing};
use crate::crossing::transcript::Action;
use tokio::time::sleep;
use tracing::{debug, info};

impl Crossing {
    /// Captain lifecycle.
    ///
    /// Takes the formation lock, boards, lets exactly its crew onto the boat,
    /// waits for all three to be aboard, cruises, releases the crew and
    /// disembarks after the last of them. The formation lock is held until
    /// the captain's exit record is written, so no other group boards or
    /// exits in between.
    pub async fn captain(&self, arrival: &Arrival, composition: Composition) -> Result<()> {
        let command = self.formation.lock().await;

        {
            let mut state = self.state.lock().await;
            state.pier[arrival.class] -= 1;
            state.emit(arrival, Action::Boards);
        }

        let permits = composition.crew_permits(arrival.class);
        for class in Class::ALL {
            if permits[class] > 0 {
                self.permits(class).release(permits[class]);
            }
        }

        self.onboard_complete.wait().await?;

        if !self.config.cruise_duration.is_zero() {
            let cruise = random_below(self.config.cruise_duration);
            debug!(captain = %arrival, ?cruise, "Cruising");
            sleep(cruise).await;
        }

        // The captain does not wait on its own broadcast
        self.cruise_finished.release(CREW_SIZE);
        self.captain_last.wait().await?;

        {
            let mut state = self.state.lock().await;
            state.emit(arrival, Action::CaptainExits);
            state.onboard = 0;
            state.exited = 0;
            state.stats.record_group(composition);
            info!(
                captain = %arrival,
                ?composition,
                groups = state.stats.groups(),
                "Crossing complete"
            );
        }

        drop(command);
        Ok(())
    }

    /// Crew lifecycle: wait for a permit of its class, board, wait for the
    /// cruise to end, disembark. The third crew member to board and the third
    /// to disembark each hand the turn back to the captain.
    pub async fn crew(&self, arrival: &Arrival) -> Result<()> {
        self.permits(arrival.class).wait().await?;

        {
            let mut state = self.state.lock().await;
            state.pier[arrival.class] -= 1;
            state.emit(arrival, Action::Boards);
            state.onboard += 1;
            if state.onboard == CREW_SIZE {
                self.onboard_complete.release(1);
            }
        }

        self.cruise_finished.wait().await?;

        let mut state = self.state.lock().await;
        state.emit(arrival, Action::MemberExits);
        state.exited += 1;
        if state.exited == CREW_SIZE {
            self.captain_last.release(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::crossing::state::ClassCounts;
    use crate::crossing::transcript::MemoryTranscript;
    use std::sync::Arc;
    use std::time::Duration;

    async fn seated(crossing: &Crossing, pier: ClassCounts) {
        crossing.state.lock().await.pier = pier;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_captain_exits_after_its_crew() {
        let config = SimulationConfig::builder()
            .cruise_duration(Duration::from_millis(5))
            .build()
            .unwrap();
        let memory = MemoryTranscript::new();
        let crossing = Arc::new(Crossing::new(config, Box::new(memory.clone())));
        seated(&crossing, ClassCounts::new(2, 2)).await;

        let mut handles = Vec::new();
        for crew in [
            Arrival::new(Class::Hacker, 1),
            Arrival::new(Class::Serf, 1),
            Arrival::new(Class::Serf, 2),
        ] {
            let crossing = crossing.clone();
            handles.push(tokio::spawn(async move { crossing.crew(&crew).await }));
        }
        let captain = Arrival::new(Class::Hacker, 2);
        crossing.captain(&captain, Composition::Mixed).await.unwrap();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = memory.records();
        let actions: Vec<Action> = records.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![
                Action::Boards,
                Action::Boards,
                Action::Boards,
                Action::Boards,
                Action::MemberExits,
                Action::MemberExits,
                Action::MemberExits,
                Action::CaptainExits,
            ]
        );
        assert_eq!(records[0].class, Class::Hacker);
        assert_eq!(records[0].id, 2);
        assert_eq!(records[7].id, 2);

        let state = crossing.state.lock().await;
        assert_eq!(state.pier, ClassCounts::default());
        assert_eq!((state.onboard, state.exited), (0, 0));
        assert_eq!(state.stats.mixed_groups, 1);
        assert_eq!(crossing.hacker_permits.pending(), 0);
        assert_eq!(crossing.serf_permits.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_groups_do_not_interleave() {
        let memory = MemoryTranscript::new();
        let crossing = Arc::new(Crossing::new(
            SimulationConfig::default(),
            Box::new(memory.clone()),
        ));
        seated(&crossing, ClassCounts::new(4, 4)).await;

        let mut handles = Vec::new();
        for class in Class::ALL {
            for id in 1..=3 {
                let crossing = crossing.clone();
                let arrival = Arrival::new(class, id);
                handles.push(tokio::spawn(async move { crossing.crew(&arrival).await }));
            }
            let crossing = crossing.clone();
            let captain = Arrival::new(class, 4);
            handles.push(tokio::spawn(async move {
                crossing
                    .captain(&captain, Composition::SameClass(captain.class))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = memory.records();
        assert_eq!(records.len(), 16);
        for group in records.chunks(8) {
            let class = group[0].class;
            assert!(group.iter().all(|r| r.class == class));
            assert_eq!(group[0].action, Action::Boards);
            assert_eq!(group[7].action, Action::CaptainExits);
            assert_eq!(group[7].id, 4);
        }
    }

    #[tokio::test]
    async fn test_closed_signal_fails_crew() {
        let crossing = Crossing::new(
            SimulationConfig::default(),
            Box::new(MemoryTranscript::new()),
        );
        crossing.close_signals();
        assert!(crossing.crew(&Arrival::new(Class::Serf, 1)).await.is_err());
    }
}
