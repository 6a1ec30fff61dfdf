use clap::{Parser, Subcommand};
use questtimer_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "questtimer", version, about = "Quest timer CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Focus mode
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Timer settings (durations, auto-start, sound)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Finished sessions
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Time tracked against quests
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Notification inbox
    Notifications {
        #[command(subcommand)]
        action: commands::notifications::NotificationsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = Config::load();
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => Config::default().logging.level,
    };
    init_tracing(&level);
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default configuration");
        Config::default()
    });

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Focus { action } => commands::focus::run(action, &config),
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::History { action } => commands::history::run(action, &config),
        Commands::Quest { action } => commands::quest::run(action),
        Commands::Notifications { action } => commands::notifications::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable.
///
/// `QUESTTIMER_LOG` takes precedence over `logging.level` from config.toml.
fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_env("QUESTTIMER_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
