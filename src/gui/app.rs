use std::path::PathBuf;

use iced::{Element, Task};

use super::screens::{Screen, ScreenMessage, viewer::{ViewerMessage, ViewerScreen}};
use super::{AppState, Message};
use crate::scoring::Scorer;

pub struct ScorerApp {
    state: AppState,
    viewer: ViewerScreen,
}

impl ScorerApp {
    /// Build the app; with `initial` set it starts browsing that image's folder
    pub fn new(scorer: Scorer, initial: Option<PathBuf>) -> (Self, Task<Message>) {
        let app = Self {
            state: AppState::new(scorer),
            viewer: ViewerScreen::default(),
        };
        let task = match initial {
            Some(path) => Task::done(Message::Viewer(ScreenMessage::ScreenMessage(
                ViewerMessage::ImagePicked(path),
            ))),
            None => Task::none(),
        };
        (app, task)
    }

    pub fn title(&self) -> String {
        match self.state.session.current_name() {
            Some(name) => format!("Image Scoring - {name}"),
            None => "Image Scoring".to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Viewer(ScreenMessage::ScreenMessage(msg)) => self
                .viewer
                .update(msg, &mut self.state)
                .map(Message::Viewer),
            Message::Viewer(ScreenMessage::ParentMessage(never)) => match never {},
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        self.viewer.view(&self.state).map(Message::Viewer)
    }
}

/// Open the viewer window and block until it is closed
pub fn run(scorer: Scorer, initial: Option<PathBuf>) -> iced::Result {
    iced::application(
        move || ScorerApp::new(scorer.clone(), initial.clone()),
        ScorerApp::update,
        ScorerApp::view,
    )
    .title(ScorerApp::title)
    .run()
}
