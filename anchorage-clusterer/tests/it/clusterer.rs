use anchorage_clusterer::AnchorageClusterer;
use anchorages_core::{test_helper::*, *};
use chrono::Duration;

use crate::helper::*;

#[test]
fn test_two_separate_clusters_become_two_anchorages() {
    let mut points = dwell_cluster(1, 50, 59.9, 10.7, 200.0, 1);
    points.extend(dwell_cluster(1000, 30, 60.4, 5.3, 200.0, 2));

    let clustering = AnchorageClusterer::new(config()).cluster(points.clone(), vec![]);

    assert_eq!(clustering.anchorages.len(), 2);
    let mut counts = clustering.anchorages.iter().map(|a| a.point_count).collect::<Vec<_>>();
    counts.sort();
    assert_eq!(counts, vec![30, 50]);
    assert_centroids_are_member_means(&clustering, &points);
    assert_closure(&clustering.anchorages, config().merge_radius);
    assert_sorted_by_id(&clustering.anchorages);
    assert!(clustering.anchorages.iter().all(|a| a.radius > 0.0 && a.radius < 400.0));
}

#[test]
fn test_lone_vessel_does_not_form_an_anchorage() {
    let mut points = dwell_cluster(1, 20, 59.9, 10.7, 200.0, 3);
    points.extend(dwell_cluster(500, 1, 40.0, -70.0, 0.0, 4));

    let clustering = AnchorageClusterer::new(config()).cluster(points, vec![]);

    assert_eq!(clustering.anchorages.len(), 1);
    assert_eq!(clustering.stats.discarded_anchorages, 1);
}

#[test]
fn test_repeated_dwells_of_one_vessel_do_not_satisfy_min_vessels() {
    let points = (0..10)
        .map(|i| DwellPoint {
            vessel_id: VesselId::new(1),
            latitude: 30.0,
            longitude: 30.0,
            start: timestamp(i * 10),
            end: timestamp(i * 10 + 3),
        })
        .collect();

    let clustering = AnchorageClusterer::new(config()).cluster(points, vec![]);

    assert!(clustering.anchorages.is_empty());
    assert_eq!(clustering.stats.discarded_anchorages, 1);
}

#[test]
fn test_invalid_coordinates_are_dropped_and_counted() {
    let mut points = dwell_cluster(1, 10, 0.0, 0.0, 100.0, 5);
    let start = timestamp(0);
    points.push(DwellPoint {
        vessel_id: VesselId::new(99),
        latitude: 123.0,
        longitude: 0.0,
        start,
        end: start + Duration::hours(3),
    });
    points.push(DwellPoint {
        vessel_id: VesselId::new(98),
        latitude: 0.0,
        longitude: -181.0,
        start,
        end: start + Duration::hours(3),
    });

    let clustering = AnchorageClusterer::new(config()).cluster(points, vec![]);

    assert_eq!(clustering.stats.invalid_coordinates, 2);
    assert_eq!(clustering.anchorages.len(), 1);
    assert_eq!(clustering.anchorages[0].point_count, 10);
}

#[test]
fn test_clustering_is_deterministic_regardless_of_input_order() {
    let mut points = dwell_cluster(1, 40, 51.9, 4.0, 600.0, 6);
    points.extend(dwell_cluster(100, 40, 51.91, 4.02, 600.0, 7));
    let clusterer = AnchorageClusterer::new(config());

    let first = clusterer.cluster(points.clone(), vec![]);
    points.reverse();
    let second = clusterer.cluster(points, vec![]);

    assert_eq!(first, second);
}

#[test]
fn test_prior_anchorages_keep_their_ids_and_grow() {
    let clusterer = AnchorageClusterer::new(config());
    let first = clusterer.cluster(dwell_cluster(1, 20, -33.85, 151.25, 150.0, 8), vec![]);
    assert_eq!(first.anchorages.len(), 1);
    let prior = first.anchorages[0].clone();

    let mut points = dwell_cluster(100, 10, -33.85, 151.25, 150.0, 9);
    points.extend(dwell_cluster(200, 10, 1.26, 103.8, 150.0, 10));
    let second = clusterer.cluster(points, vec![prior.clone()]);

    assert_eq!(second.anchorages.len(), 2);
    let grown = &second.anchorages[0];
    assert_eq!(grown.id, prior.id);
    assert_eq!(grown.point_count, 30);
    assert_eq!(grown.num_vessels(), 30);
    assert!(grown.dwell_hours > prior.dwell_hours);
    assert_eq!(second.anchorages[1].id, prior.id.next());
}

#[test]
fn test_many_random_clusters_satisfy_closure_and_mean_invariants() {
    let mut points = Vec::new();
    for i in 0..25 {
        let latitude = -60.0 + (i as f64) * 4.7;
        let longitude = -170.0 + (i as f64) * 13.3;
        points.extend(dwell_cluster(i * 1000, 8, latitude, longitude, 900.0, i as u64));
        // A second group close enough that compaction or assignment has to join them.
        let (lat, lon) = offset(latitude, longitude, 700.0, 0.0);
        points.extend(dwell_cluster(i * 1000 + 500, 8, lat, lon, 300.0, 100 + i as u64));
    }
    let config = PipelineConfig {
        min_points: 1,
        min_vessels: 1,
        ..config()
    };

    let clustering = AnchorageClusterer::new(config.clone()).cluster(points.clone(), vec![]);

    assert_closure(&clustering.anchorages, config.merge_radius);
    assert_centroids_are_member_means(&clustering, &points);
    let total: u64 = clustering.anchorages.iter().map(|a| a.point_count).sum();
    assert_eq!(total, points.len() as u64);
}
