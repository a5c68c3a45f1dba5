//! Annotation loading through the runtime: degradation and notices

use crate::test_utils::*;
use hikepal_annotations::{AnnotationStore, JsonFileSource, LoadError, UnconfiguredSource};
use hikepal_core::{Annotation, Coordinate, FacilityType, HazardType};
use hikepal_tracking::{CompanionEvent, NoticeLevel};
use std::path::PathBuf;

const TRAIL_DATA: &str = r#"{
    "facilities": [
        {"id": 1, "type": "water_station", "name": "To Tei Wan tap",
         "latitude": 22.2240, "longitude": 114.2420},
        {"id": 2, "type": "toilet", "name": "Trailhead toilet",
         "latitude": 22.2222, "longitude": 114.2412},
        {"id": 3, "type": "bbq_site", "name": "BBQ pit",
         "latitude": 22.2260, "longitude": 114.2430}
    ],
    "risk_zones": [
        {"id": 10, "route_id": 1, "type": "landslide",
         "latitude": 22.2226, "longitude": 114.2416,
         "radius": 80, "message": "Loose slope after rain"},
        {"id": 11, "route_id": null, "type": "wasps",
         "latitude": 22.2300, "longitude": 114.2450,
         "radius": 25, "message": "Nest near the path"}
    ]
}"#;

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hikepal-{}-{}.json", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_unreachable_source_keeps_empty_snapshot() {
    let store = AnnotationStore::new();
    let before = store.current();

    let result = store
        .load(&JsonFileSource::new("/nonexistent/hikepal/trail.json"))
        .await;

    assert!(matches!(result, Err(LoadError::SourceUnreachable(_))));
    assert_eq!(*store.current(), *before);
    assert!(store.current().is_empty());
}

#[tokio::test]
async fn test_file_source_maps_types_permissively() {
    let path = write_fixture("trail", TRAIL_DATA);
    let store = AnnotationStore::new();

    let set = store.load(&JsonFileSource::new(&path)).await.unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(set.facility_count(), 3);
    assert_eq!(set.hazard_count(), 2);

    let types: Vec<FacilityType> = set.facilities().map(|f| f.facility_type).collect();
    assert_eq!(
        types,
        vec![FacilityType::Water, FacilityType::Toilet, FacilityType::Marker]
    );

    let hazards: Vec<&HazardType> = set.hazards().map(|h| &h.hazard_type).collect();
    assert_eq!(hazards[0], &HazardType::Landslide);
    assert!(matches!(hazards[1], HazardType::Other(_)));

    let ids: Vec<&str> = set.all().iter().map(Annotation::id).collect();
    assert_eq!(ids, vec!["fac-1", "fac-2", "fac-3", "risk-10", "risk-11"]);
}

#[tokio::test]
async fn test_malformed_reload_keeps_previous_snapshot() {
    let good = write_fixture("good", TRAIL_DATA);
    let bad = write_fixture("bad", r#"{"facilities": [{"id": 1}]}"#);
    let store = AnnotationStore::new();

    store.load(&JsonFileSource::new(&good)).await.unwrap();
    let result = store.load(&JsonFileSource::new(&bad)).await;
    let _ = std::fs::remove_file(&good);
    let _ = std::fs::remove_file(&bad);

    assert!(matches!(result, Err(LoadError::SourceRejected(_))));
    assert_eq!(store.current().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_runtime_reports_one_notice_per_load() {
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;
    let mut events = runtime.subscribe();

    let result = runtime.load_annotations(&UnconfiguredSource).await;
    assert!(matches!(result, Err(LoadError::SourceUnreachable(_))));

    let notices: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            CompanionEvent::Notice { notice } => Some(notice),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert!(runtime.annotations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_user_inside_hazard_zone_at_start() {
    let path = write_fixture("hazard", TRAIL_DATA);
    let companion = TestCompanion::launch(&test_config());
    let runtime = &companion.runtime;

    runtime
        .load_annotations(&JsonFileSource::new(&path))
        .await
        .unwrap();
    let _ = std::fs::remove_file(&path);

    let start = Coordinate::new(START.0, START.1).unwrap();
    let annotations = runtime.annotations();
    let inside = annotations.hazards_containing(&start);
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].id, "risk-10");
    assert_eq!(inside[0].route_id.as_deref(), Some("1"));
}
