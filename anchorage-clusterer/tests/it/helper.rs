use anchorage_clusterer::Clustering;
use anchorages_core::{Anchorage, DwellPoint, PipelineConfig};

pub fn config() -> PipelineConfig {
    PipelineConfig {
        merge_radius: 1000.0,
        anchorage_drift_threshold: 100.0,
        min_points: 5,
        min_vessels: 5,
        ..Default::default()
    }
}

/// Expects every dwell point in `points` to come from a distinct vessel.
pub fn assert_centroids_are_member_means(clustering: &Clustering, points: &[DwellPoint]) {
    for anchorage in &clustering.anchorages {
        assert!(anchorage.point_count >= 1);

        let members = points
            .iter()
            .filter(|p| anchorage.vessels.contains(&p.vessel_id))
            .collect::<Vec<_>>();
        let n = members.len() as f64;
        let latitude = members.iter().map(|p| p.latitude).sum::<f64>() / n;
        let longitude = members.iter().map(|p| p.longitude).sum::<f64>() / n;

        assert_eq!(members.len() as u64, anchorage.point_count);
        assert!((latitude - anchorage.latitude).abs() < 1e-9);
        assert!((longitude - anchorage.longitude).abs() < 1e-9);
    }
}

pub fn assert_closure(anchorages: &[Anchorage], merge_radius: f64) {
    for (i, a) in anchorages.iter().enumerate() {
        for b in &anchorages[i + 1..] {
            assert!(
                a.coordinates().distance_to(&b.coordinates()) > merge_radius,
                "anchorages '{}' and '{}' are within the merge radius",
                a.id,
                b.id
            );
        }
    }
}

pub fn assert_sorted_by_id(anchorages: &[Anchorage]) {
    assert!(anchorages.windows(2).all(|w| w[0].id < w[1].id));
}

/// Anchorage sets compared without their ids.
pub fn without_ids(anchorages: &[Anchorage]) -> Vec<(u64, Vec<i64>, i64, i64)> {
    let mut out = anchorages
        .iter()
        .map(|a| {
            (
                a.point_count,
                a.vessels.iter().map(|v| v.into_inner()).collect(),
                (a.latitude * 1e7).round() as i64,
                (a.longitude * 1e7).round() as i64,
            )
        })
        .collect::<Vec<_>>();
    out.sort();
    out
}
