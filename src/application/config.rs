use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Filesystem,
    DuckDb,
}

pub struct Config {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub theme: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("WEIGHTLOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("weightlog")
            });

        let backend = match std::env::var("WEIGHTLOG_BACKEND").as_deref() {
            Ok("duckdb") => BackendKind::DuckDb,
            _ => BackendKind::Filesystem,
        };

        let theme = std::env::var("WEIGHTLOG_THEME").unwrap_or_else(|_| "dark".to_string());

        Self {
            data_dir,
            backend,
            theme,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("weightlog.duckdb")
    }
}
