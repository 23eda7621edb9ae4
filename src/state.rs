use crate::store::StudyStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<StudyStore>>,
}

impl AppState {
    pub fn new(store: StudyStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}
