//! End-to-end checks of the crossing protocol.
//!
//! Every test runs a full simulation and then verifies the transcript it
//! produced: numbering, pier capacity, group composition, exit order, retry
//! pairing and liveness.

use pretty_assertions::assert_eq;
use river_crossing::{
    Action, ActionRecord, Class, Composition, FileTranscript, MemoryTranscript, Simulation,
    SimulationConfig, SimulationReport,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

type ArrivalKey = (Class, u32);

fn key(record: &ActionRecord) -> ArrivalKey {
    (record.class, record.id)
}

async fn simulate(config: SimulationConfig) -> (SimulationReport, Vec<ActionRecord>) {
    let memory = MemoryTranscript::new();
    let simulation = Simulation::new(config, memory.clone()).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(60), simulation.run())
        .await
        .expect("simulation did not terminate")
        .unwrap();
    simulation.teardown();
    (report, memory.records())
}

/// Checks every transcript property and returns the groups that crossed
fn verify(config: &SimulationConfig, records: &[ActionRecord]) -> Vec<Composition> {
    let total = config.total_persons as usize;

    // Numbering: 1..=N, no gaps, no duplicates
    let seqs: Vec<u64> = records.iter().map(|r| r.seq).collect();
    let expected: Vec<u64> = (1..=records.len() as u64).collect();
    assert_eq!(seqs, expected);

    // Pier capacity is never exceeded
    for record in records {
        if let Some(snapshot) = record.snapshot {
            assert!(
                snapshot.total() <= config.pier_capacity,
                "pier over capacity at {}",
                record
            );
        }
        assert_eq!(record.snapshot.is_some(), record.action.carries_snapshot());
    }

    // Liveness counts
    let count = |action: Action| records.iter().filter(|r| r.action == action).count();
    assert_eq!(count(Action::Starts), total);
    assert_eq!(count(Action::Waits), total);
    assert_eq!(count(Action::Boards), total);
    assert_eq!(count(Action::MemberExits) + count(Action::CaptainExits), total);
    assert_eq!(count(Action::CaptainExits) * 4, total);
    assert_eq!(count(Action::LeavesQueue), count(Action::IsBack));

    // Each arrival's own history
    let mut histories: HashMap<ArrivalKey, Vec<Action>> = HashMap::new();
    for record in records {
        histories.entry(key(record)).or_default().push(record.action);
    }
    assert_eq!(histories.len(), total);
    for class in Class::ALL {
        for id in 1..=config.per_class_population() {
            assert!(histories.contains_key(&(class, id)), "{} {} never started", class, id);
        }
    }
    for (arrival, history) in &histories {
        assert_eq!(history[0], Action::Starts, "{:?}", arrival);

        // Every rejection is answered by exactly one return before the next attempt
        let attempts = &history[1..history.len() - 2];
        let (retries, admitted) = attempts.split_at(attempts.len() - 1);
        assert_eq!(admitted, [Action::Waits], "{:?}: {:?}", arrival, history);
        for pair in retries.chunks(2) {
            assert_eq!(pair, [Action::LeavesQueue, Action::IsBack], "{:?}", arrival);
        }

        assert_eq!(history[history.len() - 2], Action::Boards, "{:?}", arrival);
        assert!(history[history.len() - 1].is_exit(), "{:?}", arrival);
    }

    // Group lifecycles never interleave and the captain always leaves last
    let lifecycle: Vec<&ActionRecord> = records
        .iter()
        .filter(|r| matches!(r.action, Action::Boards) || r.action.is_exit())
        .collect();
    let mut groups = Vec::new();
    for group in lifecycle.chunks(8) {
        let actions: Vec<Action> = group.iter().map(|r| r.action).collect();
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

        let captain = key(group[0]);
        assert_eq!(key(group[7]), captain, "captain must board first and exit last");

        let boarders: HashSet<ArrivalKey> = group[..4].iter().map(|r| key(r)).collect();
        let leavers: HashSet<ArrivalKey> = group[4..].iter().map(|r| key(r)).collect();
        assert_eq!(boarders.len(), 4);
        assert_eq!(boarders, leavers);

        let mut members = river_crossing::crossing::ClassCounts::default();
        for (class, _) in &boarders {
            members[*class] += 1;
        }
        let composition = Composition::from_members(members)
            .unwrap_or_else(|| panic!("invalid group composition {:?}", members));
        groups.push(composition);
    }
    groups
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scenario_a_eight_persons_no_delays() {
    let config = SimulationConfig::from_args(&["8", "0", "0", "0", "20", "5"]).unwrap();
    let (report, records) = simulate(config.clone()).await;

    let groups = verify(&config, &records);
    assert_eq!(groups.len(), 2);
    assert_eq!(report.stats.groups(), 2);
    assert_eq!(report.records as usize, records.len());
    assert_eq!(report.stats.rejections, records.iter().filter(|r| r.action == Action::LeavesQueue).count());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scenario_b_crowd_overflows_pier() {
    let config = SimulationConfig::from_args(&["40", "0", "0", "50", "20", "5"]).unwrap();
    let (report, records) = simulate(config.clone()).await;

    let groups = verify(&config, &records);
    assert_eq!(groups.len(), 10);
    assert!(report.stats.rejections > 0, "expected the pier to fill up");

    let first_leave = records
        .iter()
        .position(|r| r.action == Action::LeavesQueue)
        .unwrap();
    let leaver = key(&records[first_leave]);
    assert!(records[first_leave..]
        .iter()
        .any(|r| r.action == Action::IsBack && key(r) == leaver));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_randomized_intervals() {
    let config = SimulationConfig::builder()
        .total_persons(24)
        .intervals(Duration::from_millis(15), Duration::from_millis(5))
        .cruise_duration(Duration::from_millis(10))
        .pier_return_bound(Duration::from_millis(25))
        .pier_capacity(6)
        .build()
        .unwrap();
    let (report, records) = simulate(config.clone()).await;

    let groups = verify(&config, &records);
    assert_eq!(groups.len(), 6);
    assert_eq!(
        report.stats.same_class_groups + report.stats.mixed_groups,
        groups.len()
    );
    let mixed = groups.iter().filter(|g| **g == Composition::Mixed).count();
    assert_eq!(report.stats.mixed_groups, mixed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_repeated_runs_hold_invariants() {
    for _ in 0..20 {
        let config = SimulationConfig::from_args(&["16", "0", "1", "1", "20", "5"]).unwrap();
        let (_, records) = simulate(config.clone()).await;
        verify(&config, &records);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_single_worker_thread() {
    let config = SimulationConfig::from_args(&["12", "0", "0", "0", "20", "5"]).unwrap();
    let (_, records) = simulate(config.clone()).await;
    assert_eq!(verify(&config, &records).len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_transcript_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proj2.out");
    let config = SimulationConfig::from_args(&["8", "2", "2", "2", "20", "5"]).unwrap();

    let simulation = Simulation::new(config.clone(), FileTranscript::create(&path).unwrap()).unwrap();
    let report = simulation.run().await.unwrap();
    simulation.teardown();
    simulation.teardown();

    let contents = std::fs::read_to_string(&path).unwrap();
    let records: Vec<ActionRecord> = contents
        .lines()
        .map(|line| ActionRecord::parse(line).unwrap_or_else(|| panic!("bad line {:?}", line)))
        .collect();

    assert_eq!(records.len() as u64, report.records);
    verify(&config, &records);
    assert!(contents.lines().next().unwrap().ends_with(": starts"));
}
