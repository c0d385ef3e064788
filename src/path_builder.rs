use crate::jerry::*;
use crate::point_log::*;
use tracing::debug;

const SEGMENT_ZERO_TOLERANCE: f64 = 1e-9;

pub struct ConvertConfig {
    pub stride: usize,
    pub name: String,
    pub max_decel: f64,
    pub speed_from: f64,
    pub speed_to: f64,
    pub legacy_k: f64,
}

impl Default for ConvertConfig {
    fn default() -> ConvertConfig {
        ConvertConfig {
            stride: 5,
            name: "Path".to_string(),
            max_decel: 50.0,
            speed_from: 0.0,
            speed_to: 127.0,
            legacy_k: 200.0,
        }
    }
}

/// Rounds to 2 decimals from the exact binary value, ties to even.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Heading of a segment endpoint: its own heading if the log had one, else the segment direction.
pub fn segment_heading(endpoint: &Point, start: &Point, end: &Point) -> f64 {
    normalize_heading(endpoint.heading.unwrap_or_else(|| start.heading_to(end)))
}

/// Control points a third and two thirds of the way along the straight line.
pub fn straight_controls(start: &Point, end: &Point) -> (Point, Point) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    (
        Point::new(start.x + dx / 3.0, start.y + dy / 3.0),
        Point::new(start.x + 2.0 * dx / 3.0, start.y + 2.0 * dy / 3.0),
    )
}

fn make_segment(index: usize, start: &Point, end: &Point) -> Segment {
    let (c1, c2) = straight_controls(start, end);
    Segment {
        controls: vec![
            Control::end_point(format!("SBOT_EP_{}_A", index), start, round2(segment_heading(start, start, end))),
            Control::control(format!("SBOT_C_{}_A", index), &c1),
            Control::control(format!("SBOT_C_{}_B", index), &c2),
            Control::end_point(format!("SBOT_EP_{}_B", index), end, round2(segment_heading(end, start, end))),
        ],
        speed_profiles: vec![],
        lookahead_keyframes: vec![],
        uid: format!("SBOT_SEG_{}", index),
    }
}

impl ConvertConfig {

    /// Index pairs spanned by each segment, degenerate pairs included.
    fn stride_pairs(&self, len: usize) -> Vec<(usize, usize)> {
        let stride = self.stride.max(1);
        let mut pairs = vec![];
        let mut i0 = 0;
        while i0 + 1 < len {
            let i1 = (i0 + stride).min(len - 1);
            pairs.push((i0, i1));
            i0 = i1;
        }
        pairs
    }

    /// Returns at most one path; empty if there are fewer than two points.
    pub fn build_paths(&self, points: &[Point]) -> Vec<Path> {
        if points.len() < 2 {
            return vec![];
        }
        let mut segments = vec![];
        for (i0, i1) in self.stride_pairs(points.len()) {
            let start = &points[i0];
            let end = &points[i1];
            if start.coincides(end, SEGMENT_ZERO_TOLERANCE) {
                debug!("skipping zero-length segment {}..{}", i0, i1);
                continue;
            }
            segments.push(make_segment(segments.len(), start, end));
        }
        debug!("built {} segments from {} points", segments.len(), points.len());
        vec![Path {
            segments,
            pc: ProfileConfig::default(),
            name: self.name.clone(),
            uid: "SBOT_PATH".to_string(),
            lock: false,
            visible: true,
        }]
    }
}
