use anchorages_core::{test_helper::*, *};
use chrono::Duration;
use engine::{Error, PipelineCoordinator};

use crate::helper::*;

fn vessel_with_six_hour_stay(vessel_id: i64, position: (f64, f64)) -> Vec<PositionReport> {
    TrackBuilder::new(vessel_id, timestamp(0), position.0 - 0.1, position.1)
        .transit(position.0, position.1, Duration::hours(1), 10.0)
        .stationary(Duration::hours(6))
        .transit(position.0 - 0.1, position.1, Duration::hours(1), 10.0)
        .build()
}

#[tokio::test]
async fn test_vessel_among_busy_anchorage_gets_one_six_hour_visit() {
    test(|helper| async move {
        let mut batch = anchored_fleet(100, 50, HARBOUR.0, HARBOUR.1, 300.0, Duration::hours(4), 1);
        batch.extend(vessel_with_six_hour_stay(1, HARBOUR));

        let detection = helper
            .coordinator
            .detect_anchorages(batch.clone(), vec![])
            .await
            .unwrap();

        assert_eq!(detection.anchorages.len(), 1);
        let anchorage = &detection.anchorages[0];
        assert!(anchorage.point_count >= 51);
        assert!(anchorage.vessels.contains(&VesselId::new(1)));

        let extraction = helper
            .coordinator
            .extract_visits(batch, detection.anchorages.clone())
            .await
            .unwrap();

        let visits = extraction
            .visits
            .iter()
            .filter(|v| v.vessel_id == VesselId::new(1))
            .collect::<Vec<_>>();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].anchorage_id, anchorage.id);
        assert_eq!(visits[0].duration, Duration::hours(6));
        assert_eq!(visits[0].departure, Some(visits[0].arrival + Duration::hours(6)));
        assert_visits_well_formed(&extraction.visits);
    })
    .await;
}

#[tokio::test]
async fn test_lone_vessel_produces_no_anchorage_and_no_visit() {
    test(|helper| async move {
        let batch = vessel_with_six_hour_stay(1, HARBOUR);

        let detection = helper
            .coordinator
            .detect_anchorages(batch.clone(), vec![])
            .await
            .unwrap();
        assert!(detection.anchorages.is_empty());
        assert_eq!(detection.stats.discarded_anchorages, 1);

        let extraction = helper
            .coordinator
            .extract_visits(batch, detection.anchorages)
            .await
            .unwrap();
        assert!(extraction.visits.is_empty());
    })
    .await;
}

#[test]
fn test_invalid_configuration_is_rejected_before_processing() {
    let result = PipelineCoordinator::new(
        PipelineConfig {
            merge_radius: 0.0,
            ..config()
        },
        4,
    );
    assert!(matches!(result, Err(Error::Configuration { .. })));

    let result = PipelineCoordinator::new(
        PipelineConfig {
            min_points: 0,
            ..config()
        },
        4,
    );
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[tokio::test]
async fn test_detection_is_idempotent() {
    test(|helper| async move {
        let mut batch = anchored_fleet(100, 30, HARBOUR.0, HARBOUR.1, 300.0, Duration::hours(3), 2);
        batch.extend(anchored_fleet(
            200,
            30,
            OTHER_HARBOUR.0,
            OTHER_HARBOUR.1,
            300.0,
            Duration::hours(3),
            3,
        ));

        let first = helper
            .coordinator
            .detect_anchorages(batch.clone(), vec![])
            .await
            .unwrap();
        batch.reverse();
        let second = helper
            .coordinator
            .detect_anchorages(batch, vec![])
            .await
            .unwrap();

        assert_eq!(first.anchorages.len(), 2);
        assert_eq!(first, second);
        assert_anchorage_closure(&first.anchorages, helper.config.merge_radius);
    })
    .await;
}

#[tokio::test]
async fn test_sharded_detection_matches_single_shard() {
    let mut batch = anchored_fleet(100, 20, HARBOUR.0, HARBOUR.1, 300.0, Duration::hours(3), 4);
    batch.extend(anchored_fleet(
        200,
        20,
        OTHER_HARBOUR.0,
        OTHER_HARBOUR.1,
        300.0,
        Duration::hours(3),
        5,
    ));

    let single = PipelineCoordinator::new(config(), 2)
        .unwrap()
        .detect_anchorages(batch.clone(), vec![])
        .await
        .unwrap();

    test_with_config(
        PipelineConfig {
            num_shards: 4,
            ..config()
        },
        |helper| async move {
            let sharded = helper
                .coordinator
                .detect_anchorages(batch, vec![])
                .await
                .unwrap();

            assert_eq!(sharded.anchorages.len(), 2);
            assert_eq!(without_ids(&single.anchorages), without_ids(&sharded.anchorages));
        },
    )
    .await;
}

#[tokio::test]
async fn test_invalid_reports_are_counted_and_skipped() {
    test(|helper| async move {
        let mut batch = anchored_fleet(100, 12, HARBOUR.0, HARBOUR.1, 200.0, Duration::hours(3), 6);
        let mut broken = batch[0].clone();
        broken.latitude = 200.0;
        batch.push(broken);
        let mut too_fast = batch[1].clone();
        too_fast.speed = 500.0;
        batch.push(too_fast);

        let detection = helper
            .coordinator
            .detect_anchorages(batch, vec![])
            .await
            .unwrap();

        assert_eq!(detection.anchorages.len(), 1);
        assert_eq!(detection.stats.invalid_coordinates, 1);
        assert_eq!(detection.stats.invalid_speeds, 1);
    })
    .await;
}

#[tokio::test]
async fn test_prior_anchorages_are_extended_incrementally() {
    test(|helper| async move {
        let first = helper
            .coordinator
            .detect_anchorages(
                anchored_fleet(100, 15, HARBOUR.0, HARBOUR.1, 200.0, Duration::hours(3), 7),
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(first.anchorages.len(), 1);

        let mut batch = anchored_fleet(

            300,

            15,

            HARBOUR.0,

            HARBOUR.1,

            200.0,

            Duration::hours(3),

            8,

        );
        batch.extend(anchored_fleet(
            400,
            15,
            OTHER_HARBOUR.0,
            OTHER_HARBOUR.1,
            200.0,
            Duration::hours(3),
            9,
        ));
        let second = helper
            .coordinator
            .detect_anchorages(batch, first.anchorages.clone())
            .await
            .unwrap();

        assert_eq!(second.anchorages.len(), 2);
        assert_eq!(second.anchorages[0].id, first.anchorages[0].id);
        assert_eq!(second.anchorages[0].point_count, 30);
        assert_eq!(second.anchorages[1].id, first.anchorages[0].id.next());
    })
    .await;
}
