#[path = "common.rs"]
mod common;

use common::{add_car, output, session, session_with, vehicle_lines, Workspace};
use fleet::{Config, Interpreter, Vehicle, VehicleStore};

#[test]
fn saved_vehicle_shows_identically_after_reload() {
    let ws = Workspace::new();
    let data = ws.write("fleet.csv", "");

    let store = VehicleStore::load(&data).unwrap();
    assert!(store.is_empty());
    let input = format!("add\n{}save\n", vehicle_lines("Bus", 5, -10, 200, 6, "BUS", "DIESEL"));
    let mut first = session_with(store, &data, &input);
    first.run().unwrap();
    let original = first.store().get(0).unwrap().to_string();

    let script = ws.write("show.txt", "show\n");
    let config = Config::new(&data).with_script(Some(script));
    let mut second = Interpreter::open(&config, Vec::new()).unwrap();
    second.run().unwrap();

    assert_eq!(output(second), format!("{}\n", original));
}

#[test]
fn save_then_load_preserves_order_and_init_date() {
    let ws = Workspace::new();
    let data = ws.path("fleet.csv");
    let input = format!("{}{}{}save\n", add_car("mid", 20), add_car("low", 10), add_car("high", 30));
    let mut interp = session(&data, &input);
    interp.run().unwrap();

    let reloaded = VehicleStore::load(&data).unwrap();
    assert_eq!(reloaded.init_date(), interp.store().init_date());
    let before: Vec<&Vehicle> = interp.store().iter().collect();
    let after: Vec<&Vehicle> = reloaded.iter().collect();
    assert_eq!(before, after);

    let text = std::fs::read_to_string(&data).unwrap();
    let names: Vec<&str> = text.lines().skip(1).map(|l| l.split(',').nth(1).unwrap()).collect();
    assert_eq!(names, vec!["low", "mid", "high"]);
}

#[test]
fn save_to_explicit_path_leaves_data_file_alone() {
    let ws = Workspace::new();
    let data = ws.write("fleet.csv", "01.01.2024 00:00:00\n");
    let copy = ws.path("copy.csv");
    let input = format!("{}save {}\n", add_car("a", 1), copy.display());
    let mut interp = session(&data, &input);
    interp.run().unwrap();

    assert_eq!(std::fs::read_to_string(&data).unwrap(), "01.01.2024 00:00:00\n");
    assert_eq!(VehicleStore::load(&copy).unwrap().len(), 1);
}

#[test]
fn loaded_ids_are_not_handed_out_again() {
    let ws = Workspace::new();
    let data = ws.write(
        "fleet.csv",
        "05.06.2023 07:08:09\n\
         0,Old,1,1,05.06.2023 07:08:09,10,4,CAR,\n\
         1,Older,2,2,04.06.2023 07:08:09,10,4,,GASOLINE\n",
    );
    let store = VehicleStore::load(&data).unwrap();
    let mut interp = session_with(store, &data, &add_car("fresh", 50));
    interp.run().unwrap();

    let ids: Vec<i64> = interp.store().iter().map(|v| v.id()).collect();
    // equal power sorts by creation date
    assert_eq!(ids, vec![1, 0, 2]);
}

#[test]
fn save_failure_is_fatal() {
    let ws = Workspace::new();
    let unwritable = ws.path("missing-dir").join("fleet.csv");
    let input = format!("{}save\n{}", add_car("a", 1), add_car("never", 2));
    let mut interp = session(&unwritable, &input);

    let err = interp.run().unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(interp.store().len(), 1);
    assert!(output(interp).contains("fatal:"));
}

#[test]
fn corrupt_data_file_refuses_to_open() {
    let ws = Workspace::new();
    let data = ws.write("fleet.csv", "01.01.2024 00:00:00\n0,Bus,5,-10,01.01.2024 00:00:00,200,6,ROCKET,\n");
    let config = Config::new(&data);
    assert!(Interpreter::open(&config, Vec::new()).is_err());
}
