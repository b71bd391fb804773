use std::fmt::Display;
use std::io::Write;

use crate::error::{FleetError, Result};
use crate::input::InputStack;
use crate::model::{self, Coordinates, FuelType, VehicleFields, VehicleType, MAX_X, MIN_Y};

/// Asks for a vehicle field by field on the active input source. Bad values
/// are reported and asked again; running out of input aborts the vehicle.
pub struct VehicleBuilder<'a, W: Write> {
    inputs: &'a mut InputStack,
    out: &'a mut W,
}

impl<'a, W: Write> VehicleBuilder<'a, W> {
    pub fn new(inputs: &'a mut InputStack, out: &'a mut W) -> Self {
        Self { inputs, out }
    }

    pub fn build(&mut self) -> Result<VehicleFields> {
        let name = self.ask("name", model::parse_name)?;
        let x = self.ask(&format!("coordinate x (at most {})", MAX_X), model::parse_x)?;
        let y = self.ask(&format!("coordinate y (greater than {})", MIN_Y), model::parse_y)?;
        let engine_power = self.ask("engine power (greater than 0)", model::parse_engine_power)?;
        let number_of_wheels = self.ask("number of wheels (greater than 0)", model::parse_wheels)?;
        let vehicle_type = self.ask(
            &format!("vehicle type [{}], empty for none", choices(VehicleType::ALL)),
            model::parse_optional::<VehicleType>,
        )?;
        let fuel_type = self.ask(
            &format!("fuel type [{}], empty for none", choices(FuelType::ALL)),
            model::parse_optional::<FuelType>,
        )?;

        Ok(VehicleFields {
            name,
            coordinates: Coordinates::new(x, y)?,
            engine_power: Some(engine_power),
            number_of_wheels,
            vehicle_type,
            fuel_type,
        })
    }

    fn ask<T, F>(&mut self, prompt: &str, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T>,
    {
        loop {
            // scripts are quiet, only a person at the console needs the prompt
            if self.inputs.is_interactive() {
                write!(self.out, "{}: ", prompt).map_err(stdout_error)?;
                self.out.flush().map_err(stdout_error)?;
            }

            let line = self.inputs.read_line()?.ok_or(FleetError::InputExhausted)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(err @ (FleetError::Parse(_) | FleetError::Validation { .. })) => {
                    writeln!(self.out, "{}, try again", err).map_err(stdout_error)?;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

fn choices<T: Display>(all: &[T]) -> String {
    all.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

pub(crate) fn stdout_error(err: std::io::Error) -> FleetError {
    FleetError::io("<stdout>", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputSource, DEFAULT_MAX_SCRIPT_DEPTH};
    use std::io::Cursor;

    fn stack(text: &str) -> InputStack {
        let source = InputSource::from_reader("<memory>", Cursor::new(text.as_bytes().to_vec()));
        InputStack::new(source, DEFAULT_MAX_SCRIPT_DEPTH)
    }

    #[test]
    fn builds_from_valid_lines() {
        let mut inputs = stack("Bus\n5\n-10\n200\n6\nbus\nDIESEL\n");
        let mut out = Vec::new();
        let fields = VehicleBuilder::new(&mut inputs, &mut out).build().unwrap();

        assert_eq!(fields.name, "Bus");
        assert_eq!((fields.coordinates.x(), fields.coordinates.y()), (5, -10));
        assert_eq!(fields.engine_power, Some(200));
        assert_eq!(fields.number_of_wheels, 6);
        assert_eq!(fields.vehicle_type, Some(VehicleType::Bus));
        assert_eq!(fields.fuel_type, Some(FuelType::Diesel));
        assert!(out.is_empty(), "scripts print no prompts");
    }

    #[test]
    fn retries_until_valid() {
        let mut inputs = stack("\nTruck\n971\nabc\n970\n-988\n0\n-1\n\n100\n0\n18\nplane\nTRUCK\nsteam\n\n");
        let mut out = Vec::new();
        let fields = VehicleBuilder::new(&mut inputs, &mut out).build().unwrap();

        assert_eq!(fields.name, "Truck");
        assert_eq!(fields.coordinates.x(), 970);
        assert_eq!(fields.coordinates.y(), 0);
        assert_eq!(fields.engine_power, Some(100));
        assert_eq!(fields.number_of_wheels, 18);
        assert_eq!(fields.vehicle_type, Some(VehicleType::Truck));
        assert_eq!(fields.fuel_type, None);

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("try again").count(), 9, "{}", printed);
    }

    #[test]
    fn running_out_of_input_aborts() {
        let mut inputs = stack("Half\n1\n");
        let mut out = Vec::new();
        let err = VehicleBuilder::new(&mut inputs, &mut out).build().unwrap_err();
        assert!(matches!(err, FleetError::InputExhausted));
    }
}
