use crate::launcher::Launcher;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub launcher: Arc<Launcher>,
}
