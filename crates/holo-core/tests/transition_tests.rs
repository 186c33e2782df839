use holo_core::config::{HoloConfig, TransitionTuning};
use holo_core::transition::{TransitionEvent, TransitionPhase, TransitionSequencer};
use holo_core::{Clock, HoloError, ManualClock};

fn sequencer(phase_ms: f64) -> TransitionSequencer {
    let config = HoloConfig::default();
    let tuning = TransitionTuning {
        phase_duration_ms: phase_ms,
    };
    TransitionSequencer::new(&config.states, &config.initial_state, &tuning).unwrap()
}

fn started(events: &[TransitionEvent]) -> Vec<TransitionPhase> {
    events
        .iter()
        .filter_map(|e| match e {
            TransitionEvent::PhaseStarted { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect()
}

#[test]
fn phases_run_in_order_on_schedule() {
    let clock = ManualClock::new(0.0);
    let mut seq = sequencer(400.0);
    let first = seq.request_transition("tech", clock.now_ms()).unwrap();
    assert_eq!(started(&first), vec![TransitionPhase::Collapsing]);
    assert!(seq.is_locked());

    clock.set(399.0);
    assert!(seq.update(clock.now_ms()).is_empty());

    clock.set(400.0);
    let events = seq.update(clock.now_ms());
    assert_eq!(
        events,
        vec![
            TransitionEvent::PhaseCompleted(TransitionPhase::Collapsing),
            TransitionEvent::PhaseStarted {
                phase: TransitionPhase::Fading,
                style: TransitionPhase::Fading.preset().with_transition(400.0),
            },
        ]
    );
    assert_eq!(seq.current_state().name, "home");

    clock.set(800.0);
    let events = seq.update(clock.now_ms());
    assert_eq!(
        started(&events),
        vec![TransitionPhase::Shifting, TransitionPhase::Blooming]
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, TransitionEvent::StateApplied(b) if b.name == "tech")));
    assert_eq!(seq.current_state().name, "tech");
    assert_eq!(seq.phase(), TransitionPhase::Blooming);

    clock.set(1200.0);
    assert_eq!(started(&seq.update(clock.now_ms())), vec![TransitionPhase::Expanding]);

    clock.set(1600.0);
    let events = seq.update(clock.now_ms());
    assert_eq!(
        events.last(),
        Some(&TransitionEvent::Completed {
            from: "home".to_string(),
            to: "tech".to_string(),
        })
    );
    assert!(!seq.is_locked());
    assert_eq!(seq.phase(), TransitionPhase::Idle);
}

#[test]
fn a_completed_transition_unlocks_the_next_request() {
    let mut seq = sequencer(400.0);
    seq.request_transition("tech", 0.0).unwrap();
    let mut now = 0.0;
    while seq.is_locked() {
        now += 100.0;
        seq.update(now);
    }
    assert_eq!(seq.current_state().name, "tech");

    let next = seq.request_transition("media", now).unwrap();
    assert_eq!(started(&next), vec![TransitionPhase::Collapsing]);
    assert!(seq.is_locked());

    while seq.is_locked() {
        now += 100.0;
        seq.update(now);
    }
    assert_eq!(seq.current_state().name, "media");
}

#[test]
fn time_jumps_never_skip_phases() {
    let mut seq = sequencer(400.0);
    let mut phases = started(&seq.request_transition("media", 0.0).unwrap());
    let mut now = 0.0;
    let mut completed = false;
    for _ in 0..20 {
        now += 10_000.0;
        let events = seq.update(now);
        phases.extend(started(&events));
        completed |= events
            .iter()
            .any(|e| matches!(e, TransitionEvent::Completed { .. }));
        if completed {
            break;
        }
    }
    assert!(completed);
    assert_eq!(
        phases,
        vec![
            TransitionPhase::Collapsing,
            TransitionPhase::Fading,
            TransitionPhase::Shifting,
            TransitionPhase::Blooming,
            TransitionPhase::Expanding,
        ]
    );
}

#[test]
fn requests_are_rejected_while_locked() {
    let mut seq = sequencer(400.0);
    seq.request_transition("tech", 0.0).unwrap();
    assert_eq!(seq.request_transition("media", 10.0), Err(HoloError::TransitionLocked));
    // The running transition is unaffected.
    assert_eq!(seq.target_state().map(|s| s.name.as_str()), Some("tech"));
}

#[test]
fn invalid_targets_are_rejected() {
    let mut seq = sequencer(400.0);
    assert_eq!(
        seq.request_transition("home", 0.0),
        Err(HoloError::AlreadyInState("home".to_string()))
    );
    assert_eq!(
        seq.request_transition("nowhere", 0.0),
        Err(HoloError::UnknownState("nowhere".to_string()))
    );
    assert!(!seq.is_locked());
}

#[test]
fn zero_length_phases_finish_in_one_update() {
    let mut seq = sequencer(0.0);
    seq.request_transition("archive", 0.0).unwrap();
    let events = seq.update(0.0);
    assert_eq!(started(&events).len(), 4);
    assert!(matches!(events.last(), Some(TransitionEvent::Completed { .. })));
    assert_eq!(seq.current_state().geometry, 7);
}

#[test]
fn bundle_carries_state_colors() {
    let seq = sequencer(400.0);
    let research = seq.state("research").unwrap();
    assert_eq!(research.accent, [1.0, 1.0, 1.0]);
    assert_eq!(research.parameter_values()[0], ("geometry", 4.0));
    assert_eq!(seq.state_names().count(), 8);
}
