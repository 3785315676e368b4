use hdf5::types::VarLenUnicode;
use hdf5::File;
use ndarray::Array1;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use libevent_display::config::Config;
use libevent_display::error::{EventStoreError, LocatorError, ProcessorError};
use libevent_display::event_store::EventStore;
use libevent_display::geometry::TilingStrategy;
use libevent_display::hdf_store::Hdf5EventStore;
use libevent_display::process::display_event;
use libevent_display::render::OutputFormat;

/// How a board's readings are written to the test store
#[derive(Clone, Copy)]
enum Shape {
    Scalar,
    Array,
}

/// Write a store with one record per event. Every channel reads event * 1000 + channel, except
/// board 1 channel 0 which reads 120.
fn write_store(path: &Path, events: &[i64], boards: &[(u32, Shape)]) {
    let file = File::create(path).expect("create store");
    let table = file.create_group("EventTree").expect("create table");
    table
        .new_attr::<u64>()
        .create("n_events")
        .expect("create attr")
        .write_scalar(&(events.len() as u64))
        .expect("write attr");

    for (idx, event) in events.iter().enumerate() {
        let group = table
            .create_group(&format!("event_{idx}"))
            .expect("create event");
        group
            .new_dataset::<i64>()
            .create("event_n")
            .expect("create id")
            .write_scalar(event)
            .expect("write id");
        for (board, shape) in boards {
            let readings: Vec<u16> = (0..64u16)
                .map(|ch| {
                    if *board == 1 && ch == 0 {
                        120
                    } else {
                        (*event as u16) * 1000 + ch
                    }
                })
                .collect();
            match shape {
                Shape::Scalar => {
                    for (ch, value) in readings.iter().enumerate() {
                        group
                            .new_dataset::<u16>()
                            .create(format!("FERS_Board{board}_energyHG_{ch}").as_str())
                            .expect("create reading")
                            .write_scalar(value)
                            .expect("write reading");
                    }
                }
                Shape::Array => {
                    group
                        .new_dataset_builder()
                        .with_data(&Array1::from(readings))
                        .create(format!("FERS_Board{board}_energyHG").as_str())
                        .expect("create readings");
                }
            }
        }
    }
}

fn write_noise(dir: &Path) -> PathBuf {
    let path = dir.join("fers_noises.json");
    std::fs::write(&path, r#"{"board1_ch0": 50, "board2_ch3": 2000}"#).expect("write noise");
    path
}

fn all_boards(shape: Shape) -> Vec<(u32, Shape)> {
    (1..=5).map(|b| (b, shape)).collect()
}

#[test]
fn scalar_store_to_hdf5() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store_path = dir.path().join("run.h5");
    write_store(&store_path, &[1, 2, 3], &all_boards(Shape::Scalar));

    let config = Config {
        noise_path: Some(write_noise(dir.path())),
        output_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    let output = display_event(&config, &store_path, 2).expect("display succeeds");
    assert_eq!(output, dir.path().join("event_display_2.h5"));

    let file = File::open(&output).expect("open output");
    let grid = file.dataset("grid").expect("grid dataset");
    assert_eq!(grid.shape(), vec![16, 20]);
    let values = grid.read_2d::<f64>().expect("read grid");
    // Board 1 channel 0 sits at the origin: 120 - 50
    assert_eq!(values[[0, 0]], 70.0);
    // Board 1 channel 1 has no baseline
    assert_eq!(values[[0, 1]], 2001.0);
    // Board 2 channel 3 is shifted by 4: 2003 - 2000
    assert_eq!(values[[0, 7]], 3.0);
    // Board 5 channel 63
    assert_eq!(values[[15, 19]], 2063.0);

    assert_eq!(
        grid.attr("x_max").expect("x_max").read_scalar::<i32>().expect("read"),
        19
    );
    assert_eq!(
        grid.attr("y_max").expect("y_max").read_scalar::<i32>().expect("read"),
        15
    );
    let title = grid
        .attr("title")
        .expect("title")
        .read_scalar::<VarLenUnicode>()
        .expect("read");
    assert_eq!(title.as_str(), "Event 2");
}

#[test]
fn mixed_store_wrapped_to_text() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store_path = dir.path().join("run.h5");
    let boards = vec![
        (0, Shape::Array),
        (1, Shape::Scalar),
        (2, Shape::Array),
        (3, Shape::Scalar),
        (4, Shape::Array),
    ];
    write_store(&store_path, &[5, 6], &boards);

    let config = Config {
        noise_path: None,
        output_path: dir.path().to_path_buf(),
        output_format: OutputFormat::Text,
        tiling: TilingStrategy::wrapped(),
        ..Default::default()
    };
    let output = display_event(&config, &store_path, 6).expect("display succeeds");
    assert_eq!(output, dir.path().join("event_display_6.txt"));

    let text = std::fs::read_to_string(&output).expect("read output");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Event 6");
    // Rows run from y = 15 down to y = -4
    assert!(lines[2].starts_with("  15 |"));
    assert!(lines[21].starts_with("  -4 |"));
    // Board 3 channel 0 is the only board reaching y = -4, at x = 8
    let bottom: Vec<&str> = lines[21][6..].split_whitespace().collect();
    assert_eq!(bottom.len(), 20);
    assert_eq!(bottom[8], "6000.0");
    assert_eq!(bottom[0], "0.0");
}

#[test]
fn missing_event_is_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store_path = dir.path().join("run.h5");
    write_store(&store_path, &[1, 2], &all_boards(Shape::Array));

    let config = Config {
        noise_path: Some(write_noise(dir.path())),
        output_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    let result = display_event(&config, &store_path, 7);
    assert!(matches!(
        result,
        Err(ProcessorError::LocatorError(LocatorError::NotFound(7)))
    ));
    assert!(!dir.path().join("event_display_7.h5").exists());
}

#[test]
fn missing_board_is_missing_column() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store_path = dir.path().join("run.h5");
    write_store(&store_path, &[1], &all_boards(Shape::Array)[..4]);

    let config = Config {
        noise_path: Some(write_noise(dir.path())),
        output_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    let result = display_event(&config, &store_path, 1);
    assert!(matches!(result, Err(ProcessorError::ExtractError(_))));
    assert!(!dir.path().join("event_display_1.h5").exists());
}

#[test]
fn non_integer_fields_are_ignored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store_path = dir.path().join("run.h5");
    write_store(&store_path, &[8, 9], &all_boards(Shape::Scalar));
    {
        let file = File::open_rw(&store_path).expect("reopen store");
        let tag = VarLenUnicode::from_str("cosmics run 42").expect("valid tag");
        for idx in 0..2 {
            file.group(&format!("EventTree/event_{idx}"))
                .expect("event group")
                .new_dataset::<VarLenUnicode>()
                .create("run_tag")
                .expect("create tag")
                .write_scalar(&tag)
                .expect("write tag");
        }
    }

    let store = Hdf5EventStore::open(&store_path, "EventTree", "event_n").expect("open");
    let record = store.read_record(1).expect("record");
    assert_eq!(record.len(), 1 + 5 * 64);
    assert_eq!(record.scalar("run_tag"), None);

    let config = Config {
        noise_path: Some(write_noise(dir.path())),
        output_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    let output = display_event(&config, &store_path, 9).expect("display succeeds");
    let values = File::open(&output)
        .expect("open output")
        .dataset("grid")
        .expect("grid dataset")
        .read_2d::<f64>()
        .expect("read grid");
    assert_eq!(values[[0, 0]], 70.0);
    assert_eq!(values[[15, 19]], 9063.0);

    let tag_as_id = Hdf5EventStore::open(&store_path, "EventTree", "run_tag").expect("open");
    assert!(matches!(
        tag_as_id.event_number(0),
        Err(EventStoreError::MissingEventId { index: 0, .. })
    ));
}

#[test]
fn store_schema_errors() {
    let dir = tempfile::tempdir().expect("temp dir");

    let missing = dir.path().join("missing.h5");
    assert!(matches!(
        Hdf5EventStore::open(&missing, "EventTree", "event_n"),
        Err(EventStoreError::BadFilePath(_))
    ));

    let not_hdf5 = dir.path().join("not_hdf5.h5");
    std::fs::write(&not_hdf5, "this is not an hdf5 file").expect("write");
    assert!(matches!(
        Hdf5EventStore::open(&not_hdf5, "EventTree", "event_n"),
        Err(EventStoreError::HDF5Error(_))
    ));

    let store_path = dir.path().join("run.h5");
    write_store(&store_path, &[3, 4], &all_boards(Shape::Array));
    assert!(matches!(
        Hdf5EventStore::open(&store_path, "Events", "event_n"),
        Err(EventStoreError::MissingTable(_))
    ));

    let store = Hdf5EventStore::open(&store_path, "EventTree", "event_n").expect("open");
    assert_eq!(store.len(), 2);
    assert_eq!(store.event_number(1).expect("id"), 4);
    let record = store.read_record(0).expect("record");
    assert_eq!(record.len(), 6);
    assert_eq!(
        record.array("FERS_Board2_energyHG").map(|r| r[3]),
        Some(3003)
    );
    assert!(matches!(
        store.read_record(2),
        Err(EventStoreError::IndexOutOfRange(2))
    ));

    let wrong_id = Hdf5EventStore::open(&store_path, "EventTree", "event_number").expect("open");
    assert!(matches!(
        wrong_id.event_number(0),
        Err(EventStoreError::MissingEventId { index: 0, .. })
    ));
}
