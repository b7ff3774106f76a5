use std::convert::Infallible;
use std::path::{Path, PathBuf};

use anyhow::Result;
use iced::{
    Alignment::Center,
    Color, Element, Length, Task,
    widget::{button, column, container, image::Handle, row, scrollable, text},
};
use image::imageops::FilterType;
use rfd::AsyncFileDialog;

use crate::detection::decode_image;
use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
    widgets::{indicator, layout, status_label},
};
use crate::models::ScoreReport;
use crate::scoring::Scorer;
use crate::session::IMAGE_EXTENSIONS;

pub const PREVIEW_WIDTH: u32 = 400;
pub const PREVIEW_HEIGHT: u32 = 300;

/// Decoded preview plus the score for one image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub name: String,
    pub preview: Handle,
    pub report: ScoreReport,
}

/// Decode `path`, build its fixed-size preview and score it
pub fn load_and_score(path: &Path, scorer: &Scorer) -> Result<LoadedImage> {
    let img = decode_image(path)?;
    let preview = img
        .resize_exact(PREVIEW_WIDTH, PREVIEW_HEIGHT, FilterType::Triangle)
        .to_rgba8();

    let report = scorer.score(&img)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::info!("{}", report.summary_line(&name));

    Ok(LoadedImage {
        name,
        preview: Handle::from_rgba(PREVIEW_WIDTH, PREVIEW_HEIGHT, preview.into_raw()),
        report,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ViewerScreen {
    /// Bumped per load request; stale results are dropped
    generation: u64,
    loading: bool,
    displayed: Option<LoadedImage>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ViewerMessage {
    OpenImage,
    ImagePicked(PathBuf),
    PickCancelled,
    Next,
    Previous,
    Loaded(u64, Result<LoadedImage, String>),
}

impl ViewerScreen {
    pub fn displayed(&self) -> Option<&LoadedImage> {
        self.displayed.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn load_current(&mut self, state: &AppState) -> Task<ScreenMessage<Self>> {
        let Some(path) = state.session.current() else {
            return Task::none();
        };

        self.generation += 1;
        self.loading = true;
        let generation = self.generation;
        let scorer = state.scorer.clone();
        log::debug!("Loading {} (request {})", path.display(), generation);

        Task::perform(
            async move {
                match tokio::task::spawn_blocking(move || load_and_score(&path, &scorer)).await {
                    Ok(result) => result.map_err(|e| format!("{e:#}")),
                    Err(e) => Err(format!("Scoring task failed: {e}")),
                }
            },
            move |result| ScreenMessage::ScreenMessage(ViewerMessage::Loaded(generation, result)),
        )
    }
}

impl Screen for ViewerScreen {
    type Message = ViewerMessage;
    type ParentMessage = Infallible;

    fn view<'a>(&'a self, state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let session = &state.session;
        let msg = |m: ViewerMessage| -> ScreenMessage<Self> { ScreenMessage::ScreenMessage(m) };

        let preview: Element<'_, ScreenMessage<Self>> = match &self.displayed {
            Some(loaded) => iced::widget::image(loaded.preview.clone())
                .width(Length::Fixed(PREVIEW_WIDTH as f32))
                .height(Length::Fixed(PREVIEW_HEIGHT as f32))
                .into(),
            None => container(text("No image loaded"))
                .center_x(Length::Fixed(PREVIEW_WIDTH as f32))
                .center_y(Length::Fixed(PREVIEW_HEIGHT as f32))
                .into(),
        };

        let position = match (session.index(), session.current_name()) {
            (Some(index), Some(name)) => format!("{} / {}  {}", index + 1, session.files().len(), name),
            _ => String::new(),
        };

        let can_go_back = session.index().is_some_and(|i| i > 0);
        let can_go_forward = session
            .index()
            .is_some_and(|i| i + 1 < session.files().len());

        let left = column![
            button("Open Image").on_press(msg(ViewerMessage::OpenImage)),
            preview,
            text(position),
            row![
                button("Previous").on_press_maybe(can_go_back.then(|| msg(ViewerMessage::Previous))),
                button("Next").on_press_maybe(can_go_forward.then(|| msg(ViewerMessage::Next))),
            ]
            .spacing(10),
        ]
        .spacing(10)
        .align_x(Center);

        let result_line = self
            .displayed
            .as_ref()
            .map(|loaded| loaded.report.summary_line(&loaded.name))
            .unwrap_or_default();
        let severity = self.displayed.as_ref().map(|loaded| loaded.report.severity());

        let mut right = column![
            scrollable(text(result_line))
                .width(Length::Fixed(400.0))
                .height(Length::Fixed(160.0)),
            status_label(severity),
            indicator(severity),
        ]
        .spacing(10);

        if self.loading {
            right = right.push(text("Scoring..."));
        }
        if let Some(error) = &self.error {
            right = right.push(text(error.as_str()).color(Color::from_rgb(0.9, 0.2, 0.2)));
        }

        layout(left, right)
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            ViewerMessage::OpenImage => Task::perform(
                AsyncFileDialog::new()
                    .add_filter("Image files", IMAGE_EXTENSIONS)
                    .pick_file(),
                |handle| match handle {
                    Some(file) => ScreenMessage::ScreenMessage(ViewerMessage::ImagePicked(
                        file.path().to_path_buf(),
                    )),
                    None => ScreenMessage::ScreenMessage(ViewerMessage::PickCancelled),
                },
            ),
            ViewerMessage::PickCancelled => Task::none(),
            ViewerMessage::ImagePicked(path) => match state.session.open(&path) {
                Ok(_) => {
                    self.error = None;
                    self.load_current(state)
                }
                Err(e) => {
                    log::warn!("{e}");
                    self.error = Some(e.to_string());
                    Task::none()
                }
            },
            ViewerMessage::Next => match state.session.next() {
                Some(_) => self.load_current(state),
                None => Task::none(),
            },
            ViewerMessage::Previous => match state.session.previous() {
                Some(_) => self.load_current(state),
                None => Task::none(),
            },
            ViewerMessage::Loaded(generation, result) => {
                if generation != self.generation {
                    log::debug!("Dropping stale result for request {generation}");
                    return Task::none();
                }
                self.loading = false;
                match result {
                    Ok(loaded) => {
                        self.displayed = Some(loaded);
                        self.error = None;
                    }
                    Err(e) => {
                        log::warn!("{e}");
                        self.error = Some(e);
                    }
                }
                Task::none()
            }
        }
    }
}
