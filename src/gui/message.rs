use crate::gui::screens::{ScreenMessage, viewer::ViewerScreen};

#[derive(Debug, Clone)]
pub enum Message {
    Viewer(ScreenMessage<ViewerScreen>),
}
