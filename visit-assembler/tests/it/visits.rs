use anchorages_core::{test_helper::*, *};
use chrono::Duration;

use crate::helper::*;

fn minutes(m: i64) -> chrono::DateTime<chrono::Utc> {
    timestamp(0) + Duration::minutes(m)
}

#[test]
fn test_six_hour_stay_becomes_one_six_hour_visit() {
    let track = TrackBuilder::new(1, timestamp(0), 59.8, ANCHORAGE_A.1)
        .transit(ANCHORAGE_A.0, ANCHORAGE_A.1, Duration::hours(1), 10.0)
        .stationary(Duration::hours(6))
        .transit(59.8, ANCHORAGE_A.1, Duration::hours(1), 10.0)
        .build();

    let visits = visits(&track);

    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].anchorage_id, AnchorageId::new(1));
    assert_eq!(visits[0].arrival, minutes(60));
    assert_eq!(visits[0].departure, Some(minutes(420)));
    assert_eq!(visits[0].duration, Duration::hours(6));
}

#[test]
fn test_short_speed_spike_does_not_split_the_visit() {
    let track = TrackBuilder::new(1, timestamp(0), ANCHORAGE_A.0, ANCHORAGE_A.1)
        .interval(Duration::minutes(1))
        .stationary(Duration::hours(3))
        .report(8.0)
        .stationary(Duration::hours(3))
        .transit(59.8, ANCHORAGE_A.1, Duration::minutes(30), 10.0)
        .build();

    let visits = visits(&track);

    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].arrival, minutes(0));
    assert_eq!(visits[0].departure, Some(minutes(362)));
}

#[test]
fn test_reporting_gap_closes_the_visit() {
    let track = TrackBuilder::new(1, timestamp(0), ANCHORAGE_A.0, ANCHORAGE_A.1)
        .stationary(Duration::hours(3))
        .silence(Duration::hours(5))
        .stationary(Duration::hours(3))
        .build();

    let visits = visits(&track);

    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].arrival, minutes(0));
    assert_eq!(visits[0].departure, Some(minutes(180)));
    assert_eq!(visits[1].arrival, minutes(490));
    assert_eq!(visits[1].departure, None);
    assert_eq!(visits[1].duration, Duration::hours(3));
    assert_well_formed(&visits);
}

#[test]
fn test_moving_to_another_anchorage_switches_the_visit() {
    let track = TrackBuilder::new(1, timestamp(0), ANCHORAGE_A.0, ANCHORAGE_A.1)
        .stationary(Duration::hours(3))
        .jump(ANCHORAGE_B.0, ANCHORAGE_B.1)
        .stationary(Duration::hours(3))
        .transit(59.8, ANCHORAGE_B.1, Duration::hours(1), 10.0)
        .build();

    let visits = visits(&track);

    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].anchorage_id, AnchorageId::new(1));
    assert_eq!(visits[0].departure, Some(minutes(180)));
    assert_eq!(visits[1].anchorage_id, AnchorageId::new(2));
    assert_eq!(visits[1].arrival, minutes(190));
    assert_eq!(visits[1].departure, Some(minutes(370)));
    assert_well_formed(&visits);
}

#[test]
fn test_open_visit_at_end_of_track_has_no_departure() {
    let track = TrackBuilder::new(1, timestamp(0), ANCHORAGE_B.0, ANCHORAGE_B.1)
        .stationary(Duration::hours(4))
        .build();

    let visits = visits(&track);

    assert_eq!(visits.len(), 1);
    assert!(visits[0].is_active());
    assert_eq!(visits[0].duration, Duration::hours(4));
}

#[test]
fn test_short_stop_inside_anchorage_is_not_a_visit() {
    let track = TrackBuilder::new(1, timestamp(0), ANCHORAGE_A.0, ANCHORAGE_A.1)
        .stationary(Duration::hours(1))
        .report(5.0)
        .stationary(Duration::minutes(90))
        .transit(59.8, ANCHORAGE_A.1, Duration::hours(1), 10.0)
        .build();

    assert!(visits(&track).is_empty());
}

#[test]
fn test_stationary_outside_anchorages_is_not_a_visit() {
    let track = TrackBuilder::new(1, timestamp(0), 40.0, -70.0)
        .stationary(Duration::hours(6))
        .build();

    assert!(visits(&track).is_empty());
}

#[test]
fn test_long_excursion_inside_the_extent_closes_the_visit() {
    let mut builder = TrackBuilder::new(1, timestamp(0), ANCHORAGE_A.0, ANCHORAGE_A.1)
        .stationary(Duration::hours(3));
    for _ in 0..15 {
        builder = builder.report(2.0);
    }
    let track = builder.stationary(Duration::hours(3)).build();

    let visits = visits(&track);

    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].departure, Some(minutes(180)));
    assert_eq!(visits[1].arrival, minutes(340));
    assert!(visits[1].is_active());
    assert_well_formed(&visits);
}

#[test]
fn test_visits_are_ordered_and_disjoint_for_mixed_tracks() {
    let segments: [fn(TrackBuilder) -> TrackBuilder; 5] = [
        |b| b.jump(ANCHORAGE_A.0, ANCHORAGE_A.1).stationary(Duration::hours(3)),
        |b| b.jump(ANCHORAGE_B.0, ANCHORAGE_B.1).stationary(Duration::minutes(150)),
        |b| b.transit(59.5, 10.0, Duration::hours(2), 12.0),
        |b| b.report(4.0).report(0.0).silence(Duration::hours(3)),
        |b| {
            b.jump(ANCHORAGE_A.0, ANCHORAGE_A.1)
                .report(0.0)
                .report(6.0)
                .stationary(Duration::hours(2))
        },
    ];

    for seed in 0..20_usize {
        let mut builder = TrackBuilder::new(1, timestamp(0), 59.0, 10.0);
        for step in 0..12 {
            builder = segments[(seed * 7 + step * (seed + 3)) % segments.len()](builder);
        }
        let track = builder.build();

        assert_well_formed(&visits(&track));
    }
}

#[test]
fn test_end_speed_keeps_a_slowly_moving_vessel_in_the_visit() {
    let mut builder = TrackBuilder::new(1, timestamp(0), ANCHORAGE_A.0, ANCHORAGE_A.1)
        .stationary(Duration::hours(3));
    for _ in 0..20 {
        builder = builder.report(0.8);
    }
    let track = builder.stationary(Duration::hours(1)).build();

    let single_speed = visits(&track);
    assert_eq!(single_speed.len(), 1);
    assert_eq!(single_speed[0].departure, Some(minutes(180)));

    let hysteresis = visits_with(
        &track,
        &PipelineConfig {
            stationary_end_speed_threshold: Some(1.0),
            ..config()
        },
    );
    assert_eq!(hysteresis.len(), 1);
    assert_eq!(hysteresis[0].arrival, minutes(0));
    assert!(hysteresis[0].is_active());
    assert_eq!(hysteresis[0].duration, Duration::minutes(450));
}
