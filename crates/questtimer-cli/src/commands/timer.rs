use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use questtimer_core::{format_time, Config, Event, TimerMode, TimerSettings, TimerState, TimerStore};
use tokio::time::MissedTickBehavior;

use crate::context::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a session
    Start {
        /// pomodoro, focus, break or custom
        #[arg(default_value = "pomodoro")]
        mode: TimerMode,
        /// Session length; defaults depend on the mode
        #[arg(long)]
        minutes: Option<u32>,
        /// Quest to credit the time to
        #[arg(long)]
        quest: Option<String>,
        /// What the session is for; recorded on the quest's time entry
        #[arg(long)]
        description: Option<String>,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Stop and archive the session
    Stop {
        /// Record the session as completed
        #[arg(long)]
        completed: bool,
    },
    /// Discard the session without archiving it
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Poll the timer until it finishes, chaining auto-start sessions
    Watch {
        /// Exit after the first completion (an auto-started follow-up is still started)
        #[arg(long)]
        once: bool,
    },
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let (mut store, _db) = open_store(config)?;

    match action {
        TimerAction::Start {
            mode,
            minutes,
            quest,
            description,
        } => {
            let event = store.start_timer(mode, minutes, quest, description)?;
            print_json(&event)?;
        }
        TimerAction::Pause => {
            let event = store.pause_timer();
            print_or_snapshot(&store, event)?;
        }
        TimerAction::Resume => {
            let event = store.resume_timer();
            print_or_snapshot(&store, event)?;
        }
        TimerAction::Stop { completed } => {
            let event = store.stop_timer(completed);
            print_or_snapshot(&store, event)?;
        }
        TimerAction::Reset => {
            let event = store.reset_timer();
            print_or_snapshot(&store, event)?;
        }
        TimerAction::Status => {
            // Tick first so an expired session is reported as completed.
            let completed = store.tick();
            print_json(&store.snapshot())?;
            if let Some(event) = completed {
                print_json(&event)?;
            }
        }
        TimerAction::Watch { once } => watch(&mut store, config, once)?,
    }
    Ok(())
}

/// Print `event`, or the current snapshot when the command was a no-op.
fn print_or_snapshot(store: &TimerStore, event: Option<Event>) -> CliResult {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&store.snapshot()),
    }
}

fn watch(store: &mut TimerStore, config: &Config, once: bool) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop(store, config, once))
}

/// Poll `tick()` until the timer is idle. Each tick re-reads the stored
/// state, so commands run from another shell are picked up.
async fn watch_loop(store: &mut TimerStore, config: &Config, once: bool) -> CliResult {
    let period = Duration::from_millis(config.watch.poll_interval_ms.max(10));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(event) = store.tick() else {
                    if store.timer_state() == TimerState::Idle {
                        print_json(&store.snapshot())?;
                        return Ok(());
                    }
                    progress_line(store);
                    continue;
                };
                eprintln!();
                print_json(&event)?;
                announce_completion(store.settings(), config, &event)?;

                let next = event
                    .finished_session()
                    .and_then(|session| store.next_auto_start(session));
                match next {
                    Some(auto) => {
                        tracing::info!(mode = %auto.mode, minutes = auto.duration_minutes, "auto-starting next session");
                        let started =
                            store.start_timer(auto.mode, Some(auto.duration_minutes), None, None)?;
                        print_json(&started)?;
                        if once {
                            return Ok(());
                        }
                    }
                    None => return Ok(()),
                }
            }
            _ = &mut ctrl_c => {
                eprintln!();
                return Ok(());
            }
        }
    }
}

/// Terminal alerts for a completed session. `show_notifications` gates the
/// message line; `sound_enabled` and the `watch.bell` config gate the bell.
/// The terminal has nothing to vibrate, so `vibration_enabled` is ignored.
fn announce_completion(settings: &TimerSettings, config: &Config, event: &Event) -> CliResult {
    let Some(session) = event.finished_session() else {
        return Ok(());
    };
    if settings.show_notifications {
        eprintln!(
            "Timer Completed! Your {} session of {} minutes is complete.",
            session.mode, session.duration_minutes
        );
    }
    if settings.sound_enabled && config.watch.bell {
        print!("\x07");
        std::io::stdout().flush()?;
    }
    Ok(())
}

fn progress_line(store: &TimerStore) {
    let Some(session) = store.current_session() else {
        return;
    };
    let paused = if session.is_paused() { " (paused)" } else { "" };
    eprint!(
        "\r{} {}{paused}   ",
        session.mode,
        format_time(store.remaining_ms())
    );
}
