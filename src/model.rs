use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::error::{FleetError, Result};
use crate::ids::IdAllocator;

/// Pattern shared by creation dates and the file header.
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const MAX_X: i32 = 970;
/// Exclusive lower bound for `y`.
pub const MIN_Y: i32 = -988;

const CSV_FIELDS: usize = 9;

/// Current local time, truncated to whole seconds so it survives the text format.
pub fn now() -> NaiveDateTime {
    let ts = Local::now().naive_local();
    ts.with_nanosecond(0).unwrap_or(ts)
}

pub fn format_date(ts: &NaiveDateTime) -> String {
    ts.format(DATE_FORMAT).to_string()
}

pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| FleetError::Parse(format!("date '{}': {}", input, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    x: i32,
    y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Result<Self> {
        Ok(Self { x: check_x(x)?, y: check_y(y)? })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

macro_rules! category {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = FleetError;

            /// Case-insensitive; the canonical spelling is upper case.
            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| FleetError::Parse(format!("unknown {} '{}'", $label, wanted)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

category!(VehicleType, "vehicle type" {
    Car => "CAR",
    Truck => "TRUCK",
    Bus => "BUS",
    Motorcycle => "MOTORCYCLE",
    Boat => "BOAT",
});

category!(FuelType, "fuel type" {
    Gasoline => "GASOLINE",
    Diesel => "DIESEL",
    Electricity => "ELECTRICITY",
    Manpower => "MANPOWER",
    Nuclear => "NUCLEAR",
});

// --- FIELD PARSERS ---
// Shared by the builder (one prompt per field) and by `Vehicle::decode`.
// Malformed text is a parse error, an out-of-range value a validation error.

pub fn parse_name(input: &str) -> Result<String> {
    let name = input.trim();
    if name.is_empty() {
        return Err(FleetError::validation("name", "must not be empty"));
    }
    Ok(name.to_string())
}

pub fn parse_x(input: &str) -> Result<i32> {
    check_x(parse_int(input, "x")?)
}

pub fn parse_y(input: &str) -> Result<i32> {
    check_y(parse_int(input, "y")?)
}

pub fn parse_engine_power(input: &str) -> Result<i64> {
    check_engine_power(parse_int(input, "enginePower")?)
}

pub fn parse_wheels(input: &str) -> Result<i32> {
    check_wheels(parse_int(input, "numberOfWheels")?)
}

/// An empty line means "no value".
pub fn parse_optional<T: FromStr<Err = FleetError>>(input: &str) -> Result<Option<T>> {
    let input = input.trim();
    if input.is_empty() {
        Ok(None)
    } else {
        input.parse().map(Some)
    }
}

fn parse_int<T: FromStr>(input: &str, field: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    input
        .trim()
        .parse::<T>()
        .map_err(|e| FleetError::Parse(format!("{} '{}': {}", field, input.trim(), e)))
}

fn check_x(x: i32) -> Result<i32> {
    if x > MAX_X {
        return Err(FleetError::validation("x", format!("must be at most {}", MAX_X)));
    }
    Ok(x)
}

fn check_y(y: i32) -> Result<i32> {
    if y <= MIN_Y {
        return Err(FleetError::validation("y", format!("must be greater than {}", MIN_Y)));
    }
    Ok(y)
}

fn check_engine_power(power: i64) -> Result<i64> {
    if power <= 0 {
        return Err(FleetError::validation("enginePower", "must be greater than 0"));
    }
    Ok(power)
}

fn check_wheels(wheels: i32) -> Result<i32> {
    if wheels <= 0 {
        return Err(FleetError::validation("numberOfWheels", "must be greater than 0"));
    }
    Ok(wheels)
}

/// Position of a vehicle in the fleet order: engine power first, creation
/// date on a tie. The derived `Ord` compares fields in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    pub engine_power: Option<i64>,
    pub creation_date: NaiveDateTime,
}

/// The user-supplied part of a vehicle: everything except id and creation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleFields {
    pub name: String,
    pub coordinates: Coordinates,
    pub engine_power: Option<i64>,
    pub number_of_wheels: i32,
    pub vehicle_type: Option<VehicleType>,
    pub fuel_type: Option<FuelType>,
}

impl VehicleFields {
    pub fn validate(self) -> Result<Self> {
        let name = parse_name(&self.name)?;
        let coordinates = Coordinates::new(self.coordinates.x, self.coordinates.y)?;
        let engine_power = self.engine_power.map(check_engine_power).transpose()?;
        let number_of_wheels = check_wheels(self.number_of_wheels)?;
        Ok(Self { name, coordinates, engine_power, number_of_wheels, ..self })
    }
}

/// One entry of the fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: i64,
    name: String,
    coordinates: Coordinates,
    creation_date: NaiveDateTime,
    engine_power: Option<i64>,
    number_of_wheels: i32,
    vehicle_type: Option<VehicleType>,
    fuel_type: Option<FuelType>,
}

impl Vehicle {
    /// Builds a brand new vehicle. Fields are validated before an id is
    /// taken, so a rejected vehicle never consumes one.
    pub fn create(fields: VehicleFields, ids: &mut IdAllocator, created: NaiveDateTime) -> Result<Self> {
        let fields = fields.validate()?;
        Ok(Self::assemble(ids.allocate(), created, fields))
    }

    /// Rebuilds a persisted vehicle. The id is registered when the vehicle
    /// enters a store.
    pub fn reconstruct(id: i64, creation_date: NaiveDateTime, fields: VehicleFields) -> Result<Self> {
        Ok(Self::assemble(id, creation_date, fields.validate()?))
    }

    /// Same identity and creation date, new everything else.
    pub fn with_fields(&self, fields: VehicleFields) -> Result<Self> {
        Self::reconstruct(self.id, self.creation_date, fields)
    }

    fn assemble(id: i64, creation_date: NaiveDateTime, fields: VehicleFields) -> Self {
        Self {
            id,
            name: fields.name,
            coordinates: fields.coordinates,
            creation_date,
            engine_power: fields.engine_power,
            number_of_wheels: fields.number_of_wheels,
            vehicle_type: fields.vehicle_type,
            fuel_type: fields.fuel_type,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn creation_date(&self) -> NaiveDateTime {
        self.creation_date
    }

    pub fn engine_power(&self) -> Option<i64> {
        self.engine_power
    }

    pub fn number_of_wheels(&self) -> i32 {
        self.number_of_wheels
    }

    pub fn vehicle_type(&self) -> Option<VehicleType> {
        self.vehicle_type
    }

    pub fn fuel_type(&self) -> Option<FuelType> {
        self.fuel_type
    }

    pub fn rank(&self) -> Rank {
        Rank { engine_power: self.engine_power, creation_date: self.creation_date }
    }

    /// Engine power first, creation date on a tie. Stores only hold vehicles
    /// with an engine power, so the `None` case never decides a stored order.
    pub fn compare(&self, other: &Vehicle) -> Ordering {
        self.rank().cmp(&other.rank())
    }

    pub fn encode(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.id,
            self.name,
            self.coordinates.x,
            self.coordinates.y,
            format_date(&self.creation_date),
            self.engine_power.map(|p| p.to_string()).unwrap_or_default(),
            self.number_of_wheels,
            self.vehicle_type.map(|t| t.as_str()).unwrap_or(""),
            self.fuel_type.map(|t| t.as_str()).unwrap_or(""),
        )
    }

    pub fn decode(line: &str) -> Result<Self> {
        let values: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
        if values.len() != CSV_FIELDS {
            return Err(FleetError::Parse(format!(
                "expected {} fields, found {} in '{}'",
                CSV_FIELDS,
                values.len(),
                line
            )));
        }

        let id = parse_int(values[0], "id")?;
        let creation_date = parse_date(values[4])?;
        // Older files spell a missing engine power as "null".
        let engine_power = match values[5].trim() {
            "" | "null" => None,
            power => Some(parse_int(power, "enginePower")?),
        };

        let fields = VehicleFields {
            name: values[1].to_string(),
            coordinates: Coordinates { x: parse_int(values[2], "x")?, y: parse_int(values[3], "y")? },
            engine_power,
            number_of_wheels: parse_int(values[6], "numberOfWheels")?,
            vehicle_type: parse_optional(values[7])?,
            fuel_type: parse_optional(values[8])?,
        };
        Self::reconstruct(id, creation_date, fields)
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        }

        write!(
            f,
            "#{} '{}' at {}, created {}, engine power {}, {} wheels, type {}, fuel {}",
            self.id,
            self.name,
            self.coordinates,
            format_date(&self.creation_date),
            or_dash(self.engine_power),
            self.number_of_wheels,
            or_dash(self.vehicle_type),
            or_dash(self.fuel_type),
        )
    }
}
