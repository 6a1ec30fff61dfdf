pub mod completions;
pub mod config;
pub mod focus;
pub mod history;
pub mod notifications;
pub mod quest;
pub mod settings;
pub mod timer;
