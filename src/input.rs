use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FleetError, Result};

/// Default limit for `execute_script` nesting.
pub const DEFAULT_MAX_SCRIPT_DEPTH: usize = 16;

/// One place lines come from: the console, a script file, or any reader.
pub struct InputSource {
    label: PathBuf,
    script: Option<PathBuf>,
    reader: Box<dyn BufRead>,
    interactive: bool,
}

impl InputSource {
    /// Standard input. Prompts are only shown when it is a terminal.
    pub fn console() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        Self::from_reader("<stdin>", stdin.lock()).interactive(interactive)
    }

    pub fn script(path: &Path) -> Result<Self> {
        let canonical = fs::canonicalize(path).map_err(|e| FleetError::io(path, e))?;
        let file = File::open(&canonical).map_err(|e| FleetError::io(path, e))?;
        Ok(Self {
            label: path.to_path_buf(),
            script: Some(canonical),
            reader: Box::new(BufReader::new(file)),
            interactive: false,
        })
    }

    /// A non-interactive source over an arbitrary reader.
    pub fn from_reader(label: impl Into<PathBuf>, reader: impl BufRead + 'static) -> Self {
        Self {
            label: label.into(),
            script: None,
            reader: Box::new(reader),
            interactive: false,
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn label(&self) -> &Path {
        &self.label
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| FleetError::io(&self.label, e))?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Active line sources, innermost script on top. Everything that reads input
/// reads from the top.
pub struct InputStack {
    sources: Vec<InputSource>,
    max_depth: usize,
}

impl InputStack {
    pub fn new(root: InputSource, max_depth: usize) -> Self {
        Self { sources: vec![root], max_depth }
    }

    pub fn depth(&self) -> usize {
        self.sources.len()
    }

    pub fn is_interactive(&self) -> bool {
        self.sources.last().map_or(false, InputSource::is_interactive)
    }

    /// Reads from the top source only. `None` means that source is exhausted;
    /// the caller decides whether to pop it.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.sources.last_mut() {
            Some(top) => top.read_line(),
            None => Ok(None),
        }
    }

    /// Opens `path` as the new top source. A script that is already running
    /// anywhere on the stack is refused, as is nesting past the depth limit.
    pub fn push_script(&mut self, path: &Path) -> Result<()> {
        let scripts = self.sources.iter().filter(|s| s.script.is_some()).count();
        if scripts >= self.max_depth {
            return Err(FleetError::ScriptDepth(self.max_depth));
        }

        let source = InputSource::script(path)?;
        if self.sources.iter().any(|s| s.script.is_some() && s.script == source.script) {
            return Err(FleetError::ScriptCycle(path.to_path_buf()));
        }

        debug!(script = %path.display(), depth = self.depth() + 1, "entering script");
        self.sources.push(source);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<InputSource> {
        let source = self.sources.pop();
        if let Some(source) = &source {
            debug!(source = %source.label().display(), "leaving source");
        }
        source
    }
}
