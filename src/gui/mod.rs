mod app;
mod message;
mod screens;
mod state;
mod widgets;

pub use app::{ScorerApp, run};
pub use message::Message;
pub use screens::viewer::{LoadedImage, ViewerMessage, ViewerScreen, load_and_score};
pub use state::AppState;
