//! Property tests for the wall-clock timer arithmetic.

use std::sync::Arc;

use proptest::prelude::*;
use questtimer_core::error::Result;
use questtimer_core::{
    format_time, Collaborators, EngineOptions, ManualClock, MemoryStore, NotificationRequest, Notifier,
    QuestTracker, TimerMode, TimerState, TimerStore,
};

struct Silent;

impl QuestTracker for Silent {
    fn begin_accrual(&self, _: &str) -> Result<()> {
        Ok(())
    }
    fn end_accrual(&self, _: &str, _: u64, _: Option<&str>) -> Result<()> {
        Ok(())
    }
    fn cancel_accrual(&self, _: &str) -> Result<()> {
        Ok(())
    }
}

impl Notifier for Silent {
    fn notify(&self, _: &NotificationRequest) -> Result<()> {
        Ok(())
    }
}

fn store(clock: Arc<ManualClock>) -> TimerStore {
    TimerStore::open(
        Collaborators {
            clock,
            quests: Arc::new(Silent),
            notifier: Arc::new(Silent),
            storage: Arc::new(MemoryStore::new()),
        },
        EngineOptions::default(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn remaining_decreases_while_running(
        minutes in 1u32..120,
        steps in prop::collection::vec(1u64..90_000, 1..40),
    ) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let mut timer = store(clock.clone());
        timer.start_timer(TimerMode::Custom, Some(minutes), None, None).unwrap();

        let mut previous = timer.remaining_ms();
        prop_assert_eq!(previous, u64::from(minutes) * 60_000);
        for step in steps {
            clock.advance_ms(step);
            let remaining = timer.remaining_ms();
            if previous > 0 {
                prop_assert!(remaining < previous);
            } else {
                prop_assert_eq!(remaining, 0);
            }
            previous = remaining;
        }
    }

    #[test]
    fn pause_gap_shifts_completion(
        minutes in 1u32..60,
        before_pause in 0u64..60_000,
        gap in 0u64..3_600_000,
    ) {
        let clock = Arc::new(ManualClock::new(0));
        let mut timer = store(clock.clone());
        timer.start_timer(TimerMode::Custom, Some(minutes), None, None).unwrap();
        let total = u64::from(minutes) * 60_000;

        clock.advance_ms(before_pause);
        timer.pause_timer().unwrap();
        let frozen = timer.remaining_ms();
        clock.advance_ms(gap);
        prop_assert_eq!(timer.remaining_ms(), frozen);
        timer.resume_timer().unwrap();

        clock.advance_ms(total - before_pause - 1);
        prop_assert!(timer.tick().is_none());
        prop_assert_eq!(timer.remaining_ms(), 1);

        clock.advance_ms(1);
        prop_assert!(timer.tick().is_some());
        prop_assert!(timer.tick().is_none());
        prop_assert_eq!(timer.timer_state(), TimerState::Idle);

        let session = &timer.get_session_history()[0];
        prop_assert_eq!(session.total_paused_duration_ms, gap);
        prop_assert!(session.completed);
    }

    #[test]
    fn format_time_matches_minutes_and_seconds(ms in 0u64..10_000_000) {
        let secs = ms / 1000;
        let expected = format!("{:02}:{:02}", secs / 60, secs % 60);
        prop_assert_eq!(format_time(ms), expected);
    }
}
