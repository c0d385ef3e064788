use crate::jerry::*;
use crate::path_builder::*;
use crate::point_log::*;
use crate::result::*;
use serde_json::Value;
use std::fmt;

/// Placeholder speed column for emitted point lines.
const POINT_SPEED: u32 = 120;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputMode {
    JustPoints,
    PointsOnly,
    WithPaths,
    Legacy,
}

impl OutputMode {
    pub fn from_flags(just_points: bool, legacy: bool, with_paths: bool) -> OutputMode {
        if just_points {
            OutputMode::JustPoints
        } else if legacy {
            OutputMode::Legacy
        } else if with_paths {
            OutputMode::WithPaths
        } else {
            OutputMode::PointsOnly
        }
    }
}

fn emit<T: fmt::Display>(out: &mut String, line: T) {
    out.push_str(&format!("{}\n", line));
}

/// `%g` style: 6 significant digits, exponent form outside `1e-4..1e6`, trailing zeros dropped.
fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;
    if !value.is_finite() {
        return if value.is_nan() { "nan".to_string() } else if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".to_string() } else { "0".to_string() };
    }
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if (-4..PRECISION).contains(&exponent) {
        let fixed = format!("{:.*}", (PRECISION - 1 - exponent) as usize, value);
        trim_fraction(&fixed).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn point_line(point: &Point) -> String {
    format!("{:.3},{:.3},{}", point.x, point.y, POINT_SPEED)
}

fn emit_footer(out: &mut String, footer: &Footer) -> Result<()> {
    emit(out, format!("{} {}", FOOTER_MARKER, serde_json::to_string(footer)?));
    Ok(())
}

fn render_legacy(out: &mut String, points: &[Point], mut gc: Value, config: &ConvertConfig) -> Result<()> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(convert_err!("legacy output needs at least one point")),
    };
    for (i, point) in points.iter().enumerate() {
        emit(out, format!("{:.3}, {:.3}, {:.3}", point.x, point.y, legacy_heading(points, i)));
    }
    emit(out, "endData");
    emit(out, format_general(config.max_decel));
    emit(out, format_general(config.speed_from));
    emit(out, format_general(config.legacy_k));

    let (c1, c2) = straight_controls(first, last);
    emit(out, format!(
        "{:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}",
        first.x, first.y, c1.x, c1.y, c2.x, c2.y, last.x, last.y,
    ));

    let mut paths = config.build_paths(points);
    if let Some(path) = paths.first_mut() {
        path.pc = ProfileConfig::legacy(config.speed_from, config.speed_to, config.max_decel);
    }
    if let Some(gc) = gc.as_object_mut() {
        gc.insert("showRobot".to_string(), Value::Bool(true));
    }
    emit_footer(out, &Footer::new(gc, paths))
}

/// Renders the whole output file. `gc` is the graphics config to embed in the footer.
pub fn render(mode: OutputMode, points: &[Point], gc: Value, config: &ConvertConfig) -> Result<String> {
    let mut out = String::new();
    match mode {
        OutputMode::JustPoints => {
            for point in points.iter() {
                emit(&mut out, point_line(point));
            }
        },
        OutputMode::Legacy => {
            render_legacy(&mut out, points, gc, config)?;
        },
        OutputMode::PointsOnly | OutputMode::WithPaths => {
            let paths = if mode == OutputMode::WithPaths {
                config.build_paths(points)
            } else {
                vec![]
            };
            emit(&mut out, format!("{} Path", POINTS_START_MARKER));
            for point in points.iter() {
                emit(&mut out, point_line(point));
            }
            emit_footer(&mut out, &Footer::new(gc, paths))?;
        },
    }
    Ok(out)
}
