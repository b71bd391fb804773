use std::io::Cursor;
use std::path::{Path, PathBuf};

use fleet::input::{InputSource, InputStack, DEFAULT_MAX_SCRIPT_DEPTH};
use fleet::{model, Interpreter, VehicleStore};
use tempfile::TempDir;

/// Builder input for one vehicle, one field per line. Empty `kind`/`fuel`
/// leave the category unset.
pub fn vehicle_lines(name: &str, x: i32, y: i32, power: i64, wheels: i32, kind: &str, fuel: &str) -> String {
    format!("{}\n{}\n{}\n{}\n{}\n{}\n{}\n", name, x, y, power, wheels, kind, fuel)
}

/// `add` followed by a plain car with the given engine power.
pub fn add_car(name: &str, power: i64) -> String {
    format!("add\n{}", vehicle_lines(name, 1, 1, power, 4, "CAR", "GASOLINE"))
}

/// A temp dir holding the fleet file; dropped with the test.
#[allow(dead_code)]
pub struct Workspace {
    dir: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("create temp dir") }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, text).expect("write fixture");
        path
    }
}

/// An interpreter over an empty store fed from `input`, writing to a buffer.
pub fn session(data_file: &Path, input: &str) -> Interpreter<Vec<u8>> {
    let store = VehicleStore::new(model::parse_date("01.01.2024 00:00:00").unwrap());
    session_with(store, data_file, input)
}

#[allow(dead_code)]
pub fn session_with(store: VehicleStore, data_file: &Path, input: &str) -> Interpreter<Vec<u8>> {
    let source = InputSource::from_reader("<test>", Cursor::new(input.as_bytes().to_vec()));
    Interpreter::new(store, data_file, InputStack::new(source, DEFAULT_MAX_SCRIPT_DEPTH), Vec::new())
}

pub fn output(interpreter: Interpreter<Vec<u8>>) -> String {
    String::from_utf8(interpreter.into_output()).expect("utf-8 output")
}

#[allow(dead_code)]
pub fn powers(store: &VehicleStore) -> Vec<i64> {
    store.iter().filter_map(|v| v.engine_power()).collect()
}
