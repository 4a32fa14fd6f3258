use crate::types::DEFAULT_ID_LENGTH;
use std::path::PathBuf;

/// Core configuration for `PasteCore` initialization.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_path: PathBuf,
    /// Length of generated paste ids.
    pub id_length: usize,
}

impl Config {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            id_length: DEFAULT_ID_LENGTH,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.base_path.join("pastes.redb")
    }
}
