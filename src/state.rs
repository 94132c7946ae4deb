use crate::insights::InsightsClient;
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub insights: InsightsClient,
}

impl AppState {
    pub fn new(data_dir: PathBuf, data: AppData, insights: InsightsClient) -> Self {
        Self {
            data_dir,
            data: Arc::new(Mutex::new(data)),
            insights,
        }
    }
}
