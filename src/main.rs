use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[macro_use]
mod result;
pub use result::*;

mod jerry;
mod output;
mod path_builder;
mod point_log;

use output::*;
use path_builder::ConvertConfig;
use point_log::PointLog;

/// Exit status when the log holds fewer than two usable points.
const EXIT_TOO_FEW_POINTS: u8 = 2;

/// Convert a logged point list into a JerryIO path file
#[derive(Parser, Debug)]
#[command(name = "jerry-points", version, about, long_about = None)]
struct Cli {
    /// Log file containing the point dump
    input: PathBuf,

    /// File to write
    output: PathBuf,

    /// Extract point lines from anywhere in the file (no need for #PATH-POINTS-START)
    #[arg(long)]
    anywhere: bool,

    /// Generate a paths array of straight-line cubic segments
    #[arg(long)]
    with_paths: bool,

    /// Write only normalized point lines (x,y,120), no header or footer
    #[arg(long)]
    just_points: bool,

    /// Write the legacy layout (x, y, heading lines + endData block + footer)
    #[arg(long)]
    legacy: bool,

    /// Points spanned by each generated segment (values below 1 mean 1)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    stride: i64,

    /// Name of the generated path
    #[arg(long, default_value = "Path")]
    name: String,

    /// Legacy: maxDecelerationRate
    #[arg(long, default_value_t = 50.0)]
    max_decel: f64,

    /// Legacy: speedLimit.from
    #[arg(long, default_value_t = 0.0)]
    speed_from: f64,

    /// Legacy: speedLimit.to
    #[arg(long, default_value_t = 127.0)]
    speed_to: f64,

    /// Legacy: third numeric line after endData
    #[arg(long, default_value_t = 200.0)]
    legacy_k: f64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ConvertConfig {
        ConvertConfig {
            stride: usize::try_from(self.stride.max(1)).unwrap_or(usize::MAX),
            name: self.name.clone(),
            max_decel: self.max_decel,
            speed_from: self.speed_from,
            speed_to: self.speed_to,
            legacy_k: self.legacy_k,
        }
    }

    fn mode(&self) -> OutputMode {
        OutputMode::from_flags(self.just_points, self.legacy, self.with_paths)
    }
}

fn too_few_points_message(anywhere: bool) -> &'static str {
    if anywhere {
        "No point lines found. Expected lines like: x,y,120"
    } else {
        "No points found between '#PATH-POINTS-START' and footer."
    }
}

/// Runs one conversion, returning the process exit status.
fn run(cli: &Cli) -> Result<u8> {
    let bytes = fs::read(&cli.input).io_context("read", &cli.input)?;
    let src = String::from_utf8_lossy(&bytes);
    let log = PointLog::parse(&src, cli.anywhere);
    info!("extracted {} points from {}", log.points.len(), cli.input.display());

    if log.points.len() < 2 {
        eprintln!("{}", too_few_points_message(cli.anywhere));
        return Ok(EXIT_TOO_FEW_POINTS);
    }

    let gc = match log.graphics_config() {
        Some(gc) => gc.clone(),
        None => {
            debug!("no graphics config in input, using defaults");
            jerry::default_graphics_config()
        },
    };
    let mode = cli.mode();
    let rendered = render(mode, &log.points, gc, &cli.config())?;

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).io_context("create", parent)?;
    }
    fs::write(&cli.output, rendered).io_context("write", &cli.output)?;
    info!("wrote {:?} output to {}", mode, cli.output.display());
    Ok(0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn cli(input: &Path, output: &Path, flags: &[&str]) -> Cli {
        let mut args = vec!["jerry-points".to_string(), input.display().to_string(), output.display().to_string()];
        args.extend(flags.iter().map(|f| f.to_string()));
        Cli::parse_from(args)
    }

    #[test]
    fn test_cli_defaults() {
        let cli = cli(Path::new("in.txt"), Path::new("out.txt"), &[]);
        assert_eq!(cli.stride, 5);
        assert_eq!(cli.name, "Path");
        assert_eq!(cli.max_decel, 50.0);
        assert_eq!(cli.speed_from, 0.0);
        assert_eq!(cli.speed_to, 127.0);
        assert_eq!(cli.legacy_k, 200.0);
        assert_eq!(cli.mode(), OutputMode::PointsOnly);
    }

    #[test]
    fn test_too_few_points_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("log.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, "#PATH-POINTS-START Path\n1,1,120\n1,1,120\n").unwrap();

        assert_eq!(run(&cli(&input, &output, &[])).unwrap(), EXIT_TOO_FEW_POINTS);
        assert!(!output.exists());
        assert_eq!(run(&cli(&input, &output, &["--anywhere"])).unwrap(), EXIT_TOO_FEW_POINTS);
        assert!(!output.exists());
    }

    #[test]
    fn test_too_few_points_messages() {
        let anywhere = too_few_points_message(true);
        let marked = too_few_points_message(false);
        assert_ne!(anywhere, marked);
        assert!(anywhere.contains("x,y,120"));
        assert!(marked.contains("#PATH-POINTS-START"));
    }

    #[test]
    fn test_stride_clamped_to_one() {
        let parsed = cli(Path::new("in.txt"), Path::new("out.txt"), &["--stride=-3"]);
        assert_eq!(parsed.stride, -3);
        assert_eq!(parsed.config().stride, 1);
        let parsed = cli(Path::new("in.txt"), Path::new("out.txt"), &["--stride", "-3"]);
        assert_eq!(parsed.config().stride, 1);
        let parsed = cli(Path::new("in.txt"), Path::new("out.txt"), &["--stride", "0"]);
        assert_eq!(parsed.config().stride, 1);
        let parsed = cli(Path::new("in.txt"), Path::new("out.txt"), &["--stride", "7"]);
        assert_eq!(parsed.config().stride, 7);
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = run(&cli(&missing, &dir.path().join("out.txt"), &[])).unwrap_err();
        assert!(err.to_string().starts_with(&format!("failed to read {}", missing.display())));
    }

    #[test]
    fn test_creates_output_directories() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("log.txt");
        let output = dir.path().join("nested").join("deeper").join("out.txt");
        fs::write(&input, "noise\n#PATH-POINTS-START Path\n0,0,120\n10,0,120\n").unwrap();

        assert_eq!(run(&cli(&input, &output, &["--just-points"])).unwrap(), 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "0.000,0.000,120\n10.000,0.000,120\n");
    }

    #[test]
    fn test_points_only_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("log.txt");
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&input, "[robot] 1.5,2.25,120\n[robot] 3,-4,120,90\n[robot] 3,-4,120\n[robot] 7.125,8,100\n").unwrap();

        assert_eq!(run(&cli(&input, &first, &["--anywhere"])).unwrap(), 0);
        assert_eq!(run(&cli(&first, &second, &["--anywhere"])).unwrap(), 0);

        let first_log = PointLog::parse(&fs::read_to_string(&first).unwrap(), true);
        let second_log = PointLog::parse(&fs::read_to_string(&second).unwrap(), true);
        assert_eq!(first_log.points.len(), 3);
        assert_eq!(first_log.points, second_log.points);
        assert_eq!(fs::read_to_string(&first).unwrap(), fs::read_to_string(&second).unwrap());
    }

    #[test]
    fn test_input_gc_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("log.txt");
        let output = dir.path().join("out.txt");
        fs::write(
            &input,
            "#PATH-POINTS-START Path\n0,0,120\n0,10,120\n#PATH.JERRYIO-DATA {\"gc\":{\"uol\":1,\"showRobot\":false},\"paths\":[]}\n",
        ).unwrap();

        assert_eq!(run(&cli(&input, &output, &["--with-paths", "--name", "Skills"])).unwrap(), 0);
        let written = fs::read_to_string(&output).unwrap();
        let footer = written.lines().last().unwrap();
        assert!(footer.contains(r#""gc":{"uol":1,"showRobot":false}"#));
        assert!(footer.contains(r#""name":"Skills""#));
        assert!(footer.contains(r#""heading":90.0"#));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("log.txt");
        let output = dir.path().join("out.txt");
        let mut bytes = b"#PATH-POINTS-START Path\n\xff\xfe junk\n".to_vec();
        bytes.extend_from_slice(b"0,0,120\n5,5,120\n");
        fs::write(&input, bytes).unwrap();

        assert_eq!(run(&cli(&input, &output, &["--legacy"])).unwrap(), 0);
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("0.000, 0.000, 45.000\n5.000, 5.000, 45.000\nendData\n"));
    }
}
