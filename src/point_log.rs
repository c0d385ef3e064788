use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

pub const POINTS_START_MARKER: &str = "#PATH-POINTS-START";
pub const FOOTER_MARKER: &str = "#PATH.JERRYIO-DATA";

const DUPLICATE_TOLERANCE: f64 = 1e-6;
const ZERO_DELTA_TOLERANCE: f64 = 1e-9;

/// `x,y,speed[,heading]`, tolerant of surrounding log text.
static POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<x>-?\d+(?:\.\d+)?)\s*,\s*(?P<y>-?\d+(?:\.\d+)?)\s*,\s*(?P<speed>-?\d+(?:\.\d+)?)(?:\s*,\s*(?P<h>-?\d+(?:\.\d+)?))?",
    )
    .expect("valid regex")
});

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub heading: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y, heading: None }
    }

    /// Direction of travel from `self` to `other` in degrees, 0 for a zero-length move.
    pub fn heading_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        if dx.abs() < ZERO_DELTA_TOLERANCE && dy.abs() < ZERO_DELTA_TOLERANCE {
            return 0.0;
        }
        dy.atan2(dx).to_degrees()
    }

    pub fn coincides(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        // -0.0 + 0.0 is +0.0
        wrapped + 0.0
    }
}

/// Splits on every line boundary a text-mode reader recognises, including a bare `\r`.
/// A trailing terminator does not produce an empty final line.
pub fn split_lines(src: &str) -> Vec<&str> {
    let mut lines = vec![];
    let mut start = 0;
    let mut chars = src.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some((_, '\n')) => {
                    chars.next();
                    i + 2
                },
                _ => i + 1,
            },
            '\n' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}' => {
                i + c.len_utf8()
            },
            _ => continue,
        };
        lines.push(&src[start..i]);
        start = end;
    }
    if start < src.len() {
        lines.push(&src[start..]);
    }
    lines
}

/// Heading for the point at `index` in a legacy `x, y, heading` dump.
pub fn legacy_heading(points: &[Point], index: usize) -> f64 {
    let Some(point) = points.get(index) else {
        return 0.0;
    };
    if let Some(heading) = point.heading {
        return normalize_heading(heading);
    }
    if let Some(next) = points.get(index + 1) {
        return normalize_heading(point.heading_to(next));
    }
    if index > 0 {
        return normalize_heading(points[index - 1].heading_to(point));
    }
    0.0
}

/// A parsed log: the extracted points plus whatever footer metadata was embedded.
#[derive(Clone, Debug)]
pub struct PointLog {
    pub points: Vec<Point>,
    pub footer: Option<Value>,
}

impl PointLog {
    pub fn parse(src: &str, allow_anywhere: bool) -> PointLog {
        let lines = split_lines(src);
        let (footer, footer_index) = parse_footer(&lines);
        if let Some(index) = footer_index {
            debug!("footer marker on line {} (parsed: {})", index + 1, footer.is_some());
        }
        let points = extract_points(&lines, allow_anywhere);
        PointLog { points, footer }
    }

    /// The `gc` object of the embedded footer, if it has one.
    pub fn graphics_config(&self) -> Option<&Value> {
        self.footer
            .as_ref()
            .and_then(|footer| footer.get("gc"))
            .filter(|gc| gc.is_object())
    }
}

/// Returns the JSON of the first footer line and its index.
/// Malformed JSON yields `(None, Some(index))`.
pub fn parse_footer(lines: &[&str]) -> (Option<Value>, Option<usize>) {
    let prefix = format!("{} ", FOOTER_MARKER);
    for (index, line) in lines.iter().enumerate() {
        if let Some(raw) = line.strip_prefix(prefix.as_str()) {
            return match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => (Some(value), Some(index)),
                Err(e) => {
                    debug!("ignoring malformed footer json on line {}: {}", index + 1, e);
                    (None, Some(index))
                },
            };
        }
    }
    (None, None)
}

fn parse_point(line: &str) -> Option<Point> {
    let captures = POINT_RE.captures(line)?;
    let x = captures.name("x")?.as_str().parse().ok()?;
    let y = captures.name("y")?.as_str().parse().ok()?;
    let heading = match captures.name("h") {
        Some(h) => Some(h.as_str().parse().ok()?),
        None => None,
    };
    Some(Point { x, y, heading })
}

pub fn extract_points(lines: &[&str], allow_anywhere: bool) -> Vec<Point> {
    let mut points: Vec<Point> = vec![];
    let mut in_points = false;
    for line in lines.iter() {
        if line.starts_with(POINTS_START_MARKER) {
            in_points = true;
            continue;
        }
        if line.starts_with(FOOTER_MARKER) {
            break;
        }
        if !in_points && !allow_anywhere {
            continue;
        }
        let point = match parse_point(line) {
            Some(point) => point,
            None => continue,
        };
        if let Some(last) = points.last() {
            if last.coincides(&point, DUPLICATE_TOLERANCE) {
                continue;
            }
        }
        points.push(point);
    }
    points
}
