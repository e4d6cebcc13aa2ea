/// One circle reported by the detector, in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleCandidate {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

impl CircleCandidate {
    pub fn new(x: i32, y: i32, radius: i32) -> Self {
        Self { x, y, radius }
    }

    /// Round a raw floating point detection half-to-even, clamped into the `u16` range
    /// (negative and NaN values become 0).
    pub fn from_raw(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x: round_to_u16(x),
            y: round_to_u16(y),
            radius: round_to_u16(radius),
        }
    }

    /// Get center coordinates
    pub fn center(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

fn round_to_u16(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, u16::MAX as f32) as i32
}

/// Axis-aligned acceptance square centered in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetZone {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl TargetZone {
    /// Zone of side `side` centered on `(width / 2, height / 2)`, integer division throughout.
    ///
    /// Corners that fall outside the `i32` range are clamped to it.
    pub fn centered(width: u32, height: u32, side: u32) -> Self {
        let cx = i64::from(width / 2);
        let cy = i64::from(height / 2);
        let half = i64::from(side / 2);
        Self {
            x1: clamp_to_i32(cx - half),
            y1: clamp_to_i32(cy - half),
            x2: clamp_to_i32(cx + half),
            y2: clamp_to_i32(cy + half),
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, candidate: &CircleCandidate) -> bool {
        (self.x1..=self.x2).contains(&candidate.x) && (self.y1..=self.y2).contains(&candidate.y)
    }

    /// `false` when there is nothing to test.
    pub fn contains_opt(&self, candidate: Option<&CircleCandidate>) -> bool {
        candidate.is_some_and(|c| self.contains(c))
    }

    pub fn top_left(&self) -> (i32, i32) {
        (self.x1, self.y1)
    }

    pub fn bottom_right(&self) -> (i32, i32) {
        (self.x2, self.y2)
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
