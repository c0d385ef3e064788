use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::point_log::Point;

pub const APP_VERSION: &str = "0.10.0";
pub const FORMAT: &str = "LemLib v0.5";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum ControlKind {
    #[serde(rename = "end-point")]
    EndPoint,
    #[serde(rename = "control")]
    Control,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Control {
    pub uid: String,
    pub x: f64,
    pub y: f64,
    pub lock: bool,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(rename = "__type")]
    pub kind: ControlKind,
}

impl Control {
    pub fn end_point(uid: String, point: &Point, heading: f64) -> Control {
        Control {
            uid,
            x: point.x,
            y: point.y,
            lock: false,
            visible: true,
            heading: Some(heading),
            kind: ControlKind::EndPoint,
        }
    }

    pub fn control(uid: String, point: &Point) -> Control {
        Control {
            uid,
            x: point.x,
            y: point.y,
            lock: false,
            visible: true,
            heading: None,
            kind: ControlKind::Control,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// end-point, control, control, end-point
    pub controls: Vec<Control>,
    pub speed_profiles: Vec<Value>,
    pub lookahead_keyframes: Vec<Value>,
    pub uid: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Limit {
    pub value: f64,
    pub label: String,
}

impl Limit {
    fn new(value: f64) -> Limit {
        Limit { value, label: format!("{}", value) }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub min_limit: Limit,
    pub max_limit: Limit,
    pub step: f64,
    pub from: f64,
    pub to: f64,
}

/// The `pc` object of a path: speed and bend-rate limits.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    pub speed_limit: Range,
    pub bent_rate_applicable_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_deceleration_rate: Option<f64>,
}

impl Default for ProfileConfig {
    fn default() -> ProfileConfig {
        ProfileConfig {
            speed_limit: Range {
                min_limit: Limit::new(0.0),
                max_limit: Limit::new(600.0),
                step: 1.0,
                from: 40.0,
                to: 120.0,
            },
            bent_rate_applicable_range: Range {
                min_limit: Limit::new(0.0),
                max_limit: Limit::new(1.0),
                step: 0.001,
                from: 0.0,
                to: 0.1,
            },
            max_deceleration_rate: None,
        }
    }
}

impl ProfileConfig {
    /// Profile matching the numeric lines of a legacy dump.
    pub fn legacy(speed_from: f64, speed_to: f64, max_decel: f64) -> ProfileConfig {
        let mut pc = ProfileConfig::default();
        pc.speed_limit.max_limit = Limit::new(127.0);
        pc.speed_limit.from = speed_from;
        pc.speed_limit.to = speed_to;
        pc.bent_rate_applicable_range.from = 0.0;
        pc.bent_rate_applicable_range.to = 0.158;
        pc.max_deceleration_rate = Some(max_decel);
        pc
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Path {
    pub segments: Vec<Segment>,
    pub pc: ProfileConfig,
    pub name: String,
    pub uid: String,
    pub lock: bool,
    pub visible: bool,
}

/// The JSON carried on the `#PATH.JERRYIO-DATA` line.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    pub app_version: String,
    pub format: String,
    pub gc: Value,
    pub paths: Vec<Path>,
}

impl Footer {
    pub fn new(gc: Value, paths: Vec<Path>) -> Footer {
        Footer {
            app_version: APP_VERSION.to_string(),
            format: FORMAT.to_string(),
            gc,
            paths,
        }
    }
}

/// Graphics config used when the input carries none. Coordinates are inches, hence `uol` 2.54.
pub fn default_graphics_config() -> Value {
    json!({
        "robotWidth": 30,
        "robotHeight": 30,
        "robotIsHolonomic": false,
        "showRobot": false,
        "uol": 2.54,
        "pointDensity": 2,
        "controlMagnetDistance": 5,
        "fieldImage": {
            "displayName": "V5RC 2026 - Push Back",
            "signature": "V5RC-PushBack-H2H-TopDownHighlighted-TileColor66_71",
            "origin": {"__type": "built-in"}
        },
        "coordinateSystem": "VEX Gaming Positioning System"
    })
}
