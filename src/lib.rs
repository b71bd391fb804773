//! Fleet keeps an ordered collection of vehicles in memory, driven by line
//! commands from the console or from script files, and persists it to a
//! flat CSV file on request.

pub mod builder;
pub mod config;
pub mod error;
pub mod ids;
pub mod input;
pub mod interpreter;
pub mod logging;
pub mod model;
pub mod parser;
pub mod storage;

pub use config::Config;
pub use error::{FleetError, Result};
pub use interpreter::{Flow, Interpreter};
pub use model::{Coordinates, FuelType, Vehicle, VehicleFields, VehicleType};
pub use storage::{Extremum, VehicleStore};
