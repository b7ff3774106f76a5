use crate::scoring::Scorer;
use crate::session::Session;

/// State shared by every screen: the browsing session and the loaded models
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub scorer: Scorer,
}

impl AppState {
    pub fn new(scorer: Scorer) -> Self {
        Self {
            session: Session::default(),
            scorer,
        }
    }
}
