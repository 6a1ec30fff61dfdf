//! End-to-end timer scenarios against the SQLite adapters.

use std::sync::Arc;

use questtimer_core::{
    format_time, Clock, Collaborators, Database, EngineOptions, Event, FocusOptions, ManualClock,
    NotificationKind, TimerMode, TimerSettingsPatch, TimerState, TimerStore,
};

const T0: u64 = 1_760_000_000_000;

fn setup() -> (TimerStore, Arc<Database>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let db = Arc::new(Database::open_memory().unwrap().with_clock(clock.clone()));
    let store = TimerStore::open(
        Collaborators {
            clock: clock.clone(),
            quests: db.clone(),
            notifier: db.clone(),
            storage: db.clone(),
        },
        EngineOptions::default(),
    )
    .unwrap();
    (store, db, clock)
}

#[test]
fn test_pomodoro_runs_to_completion() {
    let (mut store, db, clock) = setup();
    store
        .update_settings(&TimerSettingsPatch {
            pomodoro_duration: Some(25),
            ..Default::default()
        })
        .unwrap();

    store.start_timer(TimerMode::Pomodoro, None, None, None).unwrap();
    assert_eq!(store.current_session().unwrap().duration_minutes, 25);

    clock.advance_ms(25 * 60 * 1000);
    assert_eq!(store.remaining_ms(), 0);

    let event = store.tick().expect("completion event");
    assert!(matches!(event, Event::TimerCompleted { .. }));
    assert_eq!(store.timer_state(), TimerState::Idle);

    let history = store.get_session_history();
    assert_eq!(history.len(), 1);
    assert!(history[0].completed);

    let inbox = db.notifications().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::Timer);
    assert_eq!(inbox[0].title, "Timer Completed!");
    assert_eq!(
        inbox[0].message,
        "Your pomodoro session of 25 minutes is complete."
    );
}

#[test]
fn test_pause_gap_excluded_from_elapsed() {
    let (mut store, _db, clock) = setup();
    store.start_timer(TimerMode::Custom, Some(10), None, None).unwrap();

    clock.advance_min(2);
    store.pause_timer().unwrap();
    clock.advance_min(3);
    store.resume_timer().unwrap();
    clock.advance_min(6);

    assert_eq!(store.remaining_ms(), 120_000);
    assert_eq!(format_time(store.remaining_ms()), "02:00");
    assert_eq!(
        store.current_session().unwrap().total_paused_duration_ms,
        180_000
    );
}

#[test]
fn test_quest_accrual_follows_session() {
    let (mut store, db, clock) = setup();
    store
        .start_timer(TimerMode::Focus, Some(30), Some("quest-7".into()), None)
        .unwrap();
    assert_eq!(store.get_active_quest(), Some("quest-7"));
    assert!(db.time_entries("quest-7").unwrap()[0].is_open());

    clock.advance_min(12);
    store.stop_timer(false).unwrap();

    let entries = db.time_entries("quest-7").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration_minutes, 12);
    assert_eq!(
        entries[0].description.as_deref(),
        Some("focus session - 12 minutes")
    );
    assert_eq!(db.quest_total_minutes("quest-7").unwrap(), 12);
    assert!(db.notifications().unwrap().is_empty());
}

#[test]
fn test_reset_rolls_back_open_entry() {
    let (mut store, db, clock) = setup();
    store
        .start_timer(TimerMode::Pomodoro, None, Some("quest-1".into()), None)
        .unwrap();
    clock.advance_min(9);
    store.reset_timer().unwrap();

    assert!(db.time_entries("quest-1").unwrap().is_empty());
    assert!(store.get_session_history().is_empty());

    store.start_timer(TimerMode::Pomodoro, None, None, None).unwrap();
    let session = store.current_session().unwrap();
    assert_eq!(session.total_paused_duration_ms, 0);
    assert_eq!(session.quest_id, None);
    assert_eq!(session.start_time, clock.now_ms());
}

#[test]
fn test_pause_when_idle_is_silent() {
    let (mut store, _db, _clock) = setup();
    assert!(store.pause_timer().is_none());
    assert!(store.resume_timer().is_none());
    assert!(store.stop_timer(true).is_none());
    assert_eq!(store.timer_state(), TimerState::Idle);
    assert!(store.get_session_history().is_empty());
}

#[test]
fn test_focus_mode_round_trip() {
    let (mut store, db, clock) = setup();
    store.enable_focus_mode(vec!["q1".into(), "q2".into()], FocusOptions::default());
    assert!(store.focus_mode().is_active);
    assert_eq!(store.focus_mode().quest_ids, vec!["q1", "q2"]);

    clock.advance_min(5);
    store.disable_focus_mode().unwrap();
    assert!(!store.focus_mode().is_active);
    assert!(store.focus_mode().start_time.is_none());

    let inbox = db.notifications().unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].title, "Focus Session Complete");
    assert!(inbox[0].message.contains('5'));
    assert_eq!(inbox[1].title, "Focus Mode Activated");
}

#[test]
fn test_history_stats_after_mixed_sessions() {
    let (mut store, _db, clock) = setup();

    store.start_timer(TimerMode::Pomodoro, None, None, None).unwrap();
    clock.advance_min(25);
    store.tick().unwrap();

    store.start_timer(TimerMode::Break, None, None, None).unwrap();
    clock.advance_min(5);
    store.tick().unwrap();

    store.start_timer(TimerMode::Custom, Some(20), None, None).unwrap();
    clock.advance_min(4);
    store.stop_timer(false).unwrap();

    let stats = store.history_stats();
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.completed_sessions, 2);
    assert_eq!(stats.completed_pomodoros, 1);
    assert_eq!(stats.total_focus_minutes, 29);

    store.clear_session_history();
    assert_eq!(store.history_stats().total_sessions, 0);
}
