use std::path::PathBuf;

use crate::input::DEFAULT_MAX_SCRIPT_DEPTH;

/// Session configuration resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fleet file loaded at startup and written by `save`.
    pub data_file: PathBuf,
    /// Script to run instead of reading the console.
    pub script: Option<PathBuf>,
    /// How deep `execute_script` may nest.
    pub max_script_depth: usize,
}

impl Config {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            script: None,
            max_script_depth: DEFAULT_MAX_SCRIPT_DEPTH,
        }
    }

    pub fn with_script(mut self, script: Option<PathBuf>) -> Self {
        self.script = script;
        self
    }

    pub fn with_max_script_depth(mut self, depth: usize) -> Self {
        self.max_script_depth = depth;
        self
    }
}
