use crate::models::CircleCandidate;

/// Round raw `(x, y, radius)` detections into integral candidates, keeping detector order
pub fn to_candidates(raw: impl IntoIterator<Item = [f32; 3]>) -> Vec<CircleCandidate> {
    raw.into_iter()
        .map(|[x, y, radius]| CircleCandidate::from_raw(x, y, radius))
        .collect()
}

/// Pick the candidate the tracker works with.
///
/// The detector's order is taken as-is: no ranking by radius or distance to
/// the zone is applied.
pub fn first_candidate(candidates: Vec<CircleCandidate>) -> Option<CircleCandidate> {
    candidates.into_iter().next()
}
