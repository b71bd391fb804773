use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::{FleetError, Result};
use crate::ids::IdAllocator;
use crate::model::{self, Rank, Vehicle, VehicleFields};

/// Which end of the order `add_if_extremal` has to beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

// Rank orders the fleet; the id only separates vehicles that tie on rank.
type Slot = (Rank, i64);

/// The in-memory fleet: vehicles kept in rank order, unique by id.
#[derive(Debug)]
pub struct VehicleStore {
    init_date: NaiveDateTime,
    vehicles: BTreeMap<Slot, Vehicle>,
    slots: HashMap<i64, Slot>,
    ids: IdAllocator,
}

impl VehicleStore {
    pub fn new(init_date: NaiveDateTime) -> Self {
        Self {
            init_date,
            vehicles: BTreeMap::new(),
            slots: HashMap::new(),
            ids: IdAllocator::new(),
        }
    }

    // --- PERSISTENCE ---

    /// Reads a fleet file: header line with the initialization date, then one
    /// encoded vehicle per line. An empty file starts a fresh fleet dated now.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FleetError::io(path, e))?;
        let mut lines = BufReader::new(file).lines();

        let init_date = match lines.next() {
            Some(header) => {
                let header = header.map_err(|e| FleetError::io(path, e))?;
                if header.trim().is_empty() {
                    model::now()
                } else {
                    model::parse_date(&header).map_err(|e| at_line(path, 1, e))?
                }
            }
            None => model::now(),
        };

        let mut store = Self::new(init_date);
        for (idx, line) in lines.enumerate() {
            let line = line.map_err(|e| FleetError::io(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let vehicle = Vehicle::decode(&line).map_err(|e| at_line(path, idx + 2, e))?;
            store.insert(vehicle).map_err(|e| at_line(path, idx + 2, e))?;
        }

        info!(path = %path.display(), vehicles = store.len(), "fleet loaded");
        Ok(store)
    }

    /// Overwrites `path` with the header and every vehicle in ascending order.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| FleetError::io(path, e))?;
        let mut out = BufWriter::new(file);

        let write_all = |out: &mut BufWriter<File>| -> std::io::Result<()> {
            writeln!(out, "{}", model::format_date(&self.init_date))?;
            for vehicle in self.vehicles.values() {
                writeln!(out, "{}", vehicle.encode())?;
            }
            out.flush()
        };
        write_all(&mut out).map_err(|e| FleetError::io(path, e))?;

        info!(path = %path.display(), vehicles = self.len(), "fleet saved");
        Ok(())
    }

    // --- MUTATIONS ---

    /// Adds an already built vehicle (typically one read back from disk) and
    /// registers its id so it is never allocated again.
    pub fn insert(&mut self, vehicle: Vehicle) -> Result<()> {
        require_engine_power(vehicle.engine_power())?;
        if self.slots.contains_key(&vehicle.id()) {
            return Err(FleetError::validation("id", format!("{} is already in the fleet", vehicle.id())));
        }
        self.ids.register(vehicle.id());
        self.place(vehicle);
        Ok(())
    }

    /// Builds a new vehicle with a fresh id and adds it. Returns the id.
    pub fn create(&mut self, fields: VehicleFields, created: NaiveDateTime) -> Result<i64> {
        require_engine_power(fields.engine_power)?;
        let vehicle = Vehicle::create(fields, &mut self.ids, created)?;
        let id = vehicle.id();
        self.place(vehicle);
        Ok(id)
    }

    pub fn remove_by_id(&mut self, id: i64) -> Result<Vehicle> {
        let slot = self.slots.remove(&id).ok_or(FleetError::NotFound(id))?;
        self.vehicles.remove(&slot).ok_or(FleetError::NotFound(id))
    }

    /// Removes every vehicle matching `predicate`, returning how many went.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Vehicle) -> bool,
    {
        let doomed: Vec<Slot> = self
            .vehicles
            .iter()
            .filter(|(_, v)| predicate(v))
            .map(|(slot, _)| *slot)
            .collect();
        for slot in &doomed {
            self.vehicles.remove(slot);
            self.slots.remove(&slot.1);
        }
        doomed.len()
    }

    /// Removes every vehicle whose engine power is strictly below `power`.
    pub fn remove_lower(&mut self, power: i64) -> usize {
        self.remove_where(|v| v.engine_power().map_or(false, |p| p < power))
    }

    /// Replaces the fields of vehicle `id`, keeping its id and creation date.
    /// The new fields are validated before anything is removed.
    pub fn update_by_id(&mut self, id: i64, fields: VehicleFields) -> Result<()> {
        let slot = *self.slots.get(&id).ok_or(FleetError::NotFound(id))?;
        let current = self.vehicles.get(&slot).ok_or(FleetError::NotFound(id))?;
        require_engine_power(fields.engine_power)?;
        let updated = current.with_fields(fields)?;

        self.vehicles.remove(&slot);
        self.place(updated);
        Ok(())
    }

    /// Adds a new vehicle only if its engine power strictly beats the current
    /// maximum (or minimum). An empty fleet accepts anything. Returns the new
    /// id, or `None` when the candidate was rejected.
    pub fn add_if_extremal(
        &mut self,
        fields: VehicleFields,
        created: NaiveDateTime,
        extremum: Extremum,
    ) -> Result<Option<i64>> {
        let fields = fields.validate()?;
        require_engine_power(fields.engine_power)?;

        let candidate = fields.engine_power;
        let accepted = match extremum {
            Extremum::Max => self.last().map_or(true, |max| max.engine_power() < candidate),
            Extremum::Min => self.first().map_or(true, |min| min.engine_power() > candidate),
        };
        if !accepted {
            debug!(?extremum, "candidate rejected");
            return Ok(None);
        }
        self.create(fields, created).map(Some)
    }

    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.slots.clear();
    }

    fn place(&mut self, vehicle: Vehicle) {
        let slot = (vehicle.rank(), vehicle.id());
        self.slots.insert(vehicle.id(), slot);
        self.vehicles.insert(slot, vehicle);
    }

    // --- VIEWS ---

    pub fn init_date(&self) -> NaiveDateTime {
        self.init_date
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Vehicle> {
        self.slots.get(&id).and_then(|slot| self.vehicles.get(slot))
    }

    /// Ascending fleet order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn first(&self) -> Option<&Vehicle> {
        self.vehicles.values().next()
    }

    pub fn last(&self) -> Option<&Vehicle> {
        self.vehicles.values().next_back()
    }

    /// Vehicle count per engine power, keys ascending.
    pub fn group_by_engine_power(&self) -> BTreeMap<i64, usize> {
        let mut groups = BTreeMap::new();
        for power in self.iter().filter_map(Vehicle::engine_power) {
            *groups.entry(power).or_insert(0) += 1;
        }
        groups
    }

    pub fn with_wheels(&self, wheels: i32) -> impl Iterator<Item = &Vehicle> {
        self.iter().filter(move |v| v.number_of_wheels() == wheels)
    }

    /// Every vehicle's wheel count, sorted ascending, duplicates kept.
    pub fn wheels_ascending(&self) -> Vec<i32> {
        let mut wheels: Vec<i32> = self.iter().map(Vehicle::number_of_wheels).collect();
        wheels.sort_unstable();
        wheels
    }

    pub fn id_allocator(&self) -> &IdAllocator {
        &self.ids
    }
}

fn require_engine_power(power: Option<i64>) -> Result<()> {
    match power {
        Some(_) => Ok(()),
        None => Err(FleetError::validation("enginePower", "is required to place a vehicle in the fleet")),
    }
}

fn at_line(path: &Path, line: usize, err: FleetError) -> FleetError {
    match err {
        FleetError::Io { .. } => err,
        other => FleetError::Parse(format!("{} line {}: {}", path.display(), line, other)),
    }
}
