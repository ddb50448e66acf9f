mod common;

use pickroute_lib::{
    load_facility, save_facility, Cell, CellKind, Error, Facility, OccupancyGrid, Site,
    StartPoint,
};
use tempfile::tempdir;

use common::{fixtures_dir, small_warehouse};

#[test]
fn fixture_loads_all_sections() {
    let facility = small_warehouse();
    assert_eq!((facility.grid.cols(), facility.grid.rows()), (12, 8));
    assert_eq!(facility.grid.wall_count(), 9);
    assert_eq!(facility.grid.kind_at(Cell::new(9, 1)), Some(CellKind::Zone));
    assert_eq!(facility.sites.len(), 6);
    assert_eq!(facility.site(3).map(Site::display_name), Some("B-01".into()));
    assert_eq!(facility.calibration.scale(), Some(10.0));
    assert!(facility.start.is_some());
}

#[test]
fn save_then_load_preserves_facility() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("facility.json");

    let mut facility = small_warehouse();
    facility.start = Some(StartPoint::from_site(&facility.sites, 2).unwrap());
    facility.grid.set_blocked(Cell::new(0, 0), CellKind::Zone, true);
    save_facility(&path, &facility).unwrap();

    let restored = load_facility(&path).unwrap();
    assert_eq!(restored, facility);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = load_facility(&path).unwrap_err();
    match err {
        Error::FacilityNotFound { path: reported } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_json_is_a_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"grid\": ").unwrap();
    assert!(matches!(load_facility(&path), Err(Error::Json(_))));
}

#[test]
fn legacy_document_with_blocked_list_and_defaults() {
    let facility = Facility::from_json_str(
        r#"{
            "grid": { "cell": 20, "cols": 6, "rows": 6, "blocked": ["0_0", "5_5"] },
            "sites": [{ "id": 9, "x": 50, "y": 50 }]
        }"#,
    )
    .unwrap();

    assert_eq!(facility.grid.wall_count(), 2);
    assert_eq!(facility.grid.cell_size(), 20.0);
    assert!(facility.start.is_none());
    assert!(!facility.calibration.is_calibrated());
    assert_eq!(facility.sites[0].label, "");
}

#[test]
fn zero_sized_grid_is_rejected() {
    let err = Facility::from_json_str(r#"{ "grid": { "cellSize": 10, "cols": 0, "rows": 3 } }"#)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidGrid { .. }));
}

#[test]
fn new_facility_serializes_without_start() {
    let facility = Facility::new(OccupancyGrid::with_dimensions(4, 4, 10.0).unwrap());
    let json = facility.to_json_string().unwrap();
    assert!(!json.contains("\"start\""));
    assert!(fixtures_dir().join("small_warehouse.json").exists());
}

#[test]
fn duplicate_site_ids_keep_first_entry() {
    let facility = Facility::from_json_str(
        r#"{
            "grid": { "cellSize": 10, "cols": 5, "rows": 5 },
            "sites": [
                { "id": 1, "x": 5.0, "y": 5.0, "label": "first" },
                { "id": 2, "x": 25.0, "y": 25.0 },
                { "id": 1, "x": 45.0, "y": 45.0, "label": "second" }
            ],
            "start": { "x": 0.0, "y": 0.0, "siteId": 1 }
        }"#,
    )
    .unwrap();

    assert_eq!(facility.sites.len(), 2);
    assert_eq!(facility.site(1).map(|s| s.label.as_str()), Some("first"));
    assert_eq!(facility.start.map(|s| (s.x, s.y)), Some((5.0, 5.0)));
    assert_eq!(facility.to_document().sites.len(), 2);
}
