use crate::config::Config;
use crate::services::files::FileService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub files: FileService,
}

impl AppState {
    /// The data directory is created if missing and canonicalized once at
    /// startup; every containment check compares against that real path.
    pub fn new(config: Config) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let files = FileService::new(&config.data_dir)?;

        Ok(Self {
            config: Arc::new(config),
            files,
        })
    }
}
