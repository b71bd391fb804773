use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::builder::{stdout_error, VehicleBuilder};
use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::input::{InputSource, InputStack};
use crate::model::{self, VehicleFields};
use crate::parser::{parse_command, Command, CommandKind};
use crate::storage::{Extremum, VehicleStore};

const PROMPT: &str = "fleet> ";

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Reads command lines from the top of the input stack and applies them to
/// the store. Results, prompts and diagnostics go to `out`.
pub struct Interpreter<W: Write> {
    store: VehicleStore,
    data_file: PathBuf,
    inputs: InputStack,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(store: VehicleStore, data_file: impl Into<PathBuf>, inputs: InputStack, out: W) -> Self {
        Self { store, data_file: data_file.into(), inputs, out }
    }

    /// Loads the configured data file and reads commands from the configured
    /// script, or from the console when there is none.
    pub fn open(config: &Config, out: W) -> Result<Self> {
        let store = VehicleStore::load(&config.data_file)?;
        let root = match &config.script {
            Some(script) => InputSource::script(script)?,
            None => InputSource::console(),
        };
        let inputs = InputStack::new(root, config.max_script_depth);
        Ok(Self::new(store, config.data_file.clone(), inputs, out))
    }

    pub fn store(&self) -> &VehicleStore {
        &self.store
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until `exit`, the end of the outermost source, or a fatal error.
    /// Recoverable errors are reported and the loop moves on.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if self.inputs.is_interactive() {
                if let Err(e) = self.prompt() {
                    return Err(self.fatal(e));
                }
            }

            let line = match self.inputs.read_line() {
                Ok(Some(line)) => line,
                Ok(None) if self.inputs.depth() > 1 => {
                    self.inputs.pop();
                    continue;
                }
                Ok(None) => {
                    info!("input exhausted, leaving");
                    return Ok(());
                }
                Err(e) => return Err(self.fatal(e)),
            };

            match self.execute_line(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(self.fatal(e)),
                Err(e) => {
                    debug!(line = %line.trim(), "{}", e);
                    if let Err(e) = self.say(format!("error: {}", e)) {
                        return Err(self.fatal(e));
                    }
                }
            }
        }
    }

    /// Parses and runs a single line. Blank lines and `#` comments are skipped.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.starts_with('#') {
            return Ok(Flow::Continue);
        }
        match parse_command(line)? {
            Some(command) => self.dispatch(command),
            None => Ok(Flow::Continue),
        }
    }

    /// Reports `e` once: on `out`, or in the log when `out` is unusable.
    fn fatal(&mut self, e: FleetError) -> FleetError {
        if writeln!(self.out, "fatal: {}", e).and_then(|()| self.out.flush()).is_err() {
            error!("{}", e);
        }
        e
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "{}", PROMPT).map_err(stdout_error)?;
        self.out.flush().map_err(stdout_error)
    }

    fn dispatch(&mut self, command: Command) -> Result<Flow> {
        debug!(command = command.kind().name(), "dispatch");
        match command {
            Command::Help => self.help()?,
            Command::Info => self.info()?,
            Command::Show => self.show()?,
            Command::Add => self.add()?,
            Command::Update { id } => self.update(id)?,
            Command::RemoveById { id } => {
                self.store.remove_by_id(id)?;
                self.say(format!("Vehicle {} removed.", id))?;
            }
            Command::Clear => {
                self.store.clear();
                self.say("Collection cleared.")?;
            }
            Command::Save { path } => {
                let path = path.unwrap_or_else(|| self.data_file.clone());
                self.save(&path)?;
            }
            Command::ExecuteScript { path } => self.inputs.push_script(&path)?,
            Command::Exit => return Ok(Flow::Exit),
            Command::AddIfMax => self.add_if(Extremum::Max)?,
            Command::AddIfMin => self.add_if(Extremum::Min)?,
            Command::RemoveLower => self.remove_lower()?,
            Command::GroupCountingByEnginePower => {
                for (power, count) in self.store.group_by_engine_power() {
                    self.say(format!("Engine power: {}, count: {}", power, count))?;
                }
            }
            Command::FilterByNumberOfWheels { wheels } => {
                let matching: Vec<String> = self.store.with_wheels(wheels).map(|v| v.to_string()).collect();
                for line in matching {
                    self.say(line)?;
                }
            }
            Command::PrintFieldAscendingNumberOfWheels => {
                for wheels in self.store.wheels_ascending() {
                    self.say(wheels)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    // --- HANDLERS ---

    fn help(&mut self) -> Result<()> {
        self.say("Available commands:")?;
        for kind in CommandKind::ALL {
            let call = format!("{} {}", kind.name(), kind.usage());
            self.say(format!("  {:<45} {}", call.trim_end(), kind.description()))?;
        }
        Ok(())
    }

    fn info(&mut self) -> Result<()> {
        let init = model::format_date(&self.store.init_date());
        let count = self.store.len();
        self.say("Collection type: ordered set of vehicles (by engine power, then creation date)")?;
        self.say(format!("Initialization date: {}", init))?;
        self.say(format!("Number of elements: {}", count))
    }

    fn show(&mut self) -> Result<()> {
        if self.store.is_empty() {
            return self.say("Collection is empty.");
        }
        let lines: Vec<String> = self.store.iter().map(|v| v.to_string()).collect();
        for line in lines {
            self.say(line)?;
        }
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let fields = self.read_vehicle()?;
        let id = self.store.create(fields, model::now())?;
        self.say(format!("Vehicle {} added.", id))
    }

    fn update(&mut self, id: i64) -> Result<()> {
        // check before asking for a whole vehicle
        if self.store.get(id).is_none() {
            return Err(FleetError::NotFound(id));
        }
        let fields = self.read_vehicle()?;
        self.store.update_by_id(id, fields)?;
        self.say(format!("Vehicle {} updated.", id))
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.store.save(path)?;
        self.say(format!("Saved {} vehicle(s) to {}.", self.store.len(), path.display()))
    }

    fn add_if(&mut self, extremum: Extremum) -> Result<()> {
        let fields = self.read_vehicle()?;
        match self.store.add_if_extremal(fields, model::now(), extremum)? {
            Some(id) => self.say(format!("Vehicle {} added.", id)),
            None => self.say("Vehicle not added."),
        }
    }

    fn remove_lower(&mut self) -> Result<()> {
        let fields = self.read_vehicle()?;
        let power = fields
            .engine_power
            .ok_or_else(|| FleetError::validation("enginePower", "is required to compare vehicles"))?;
        let removed = self.store.remove_lower(power);
        self.say(format!("Removed {} vehicle(s).", removed))
    }

    fn read_vehicle(&mut self) -> Result<VehicleFields> {
        VehicleBuilder::new(&mut self.inputs, &mut self.out).build()
    }

    fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{}", text).map_err(stdout_error)
    }
}
