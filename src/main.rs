//! G-Code generator for facing, turning and step turning on a two-axis (X/Z) lathe
use anyhow::{anyhow, Result};
use gcode::job::{JobFile, StepTurningConfig};
use gcode::{assemble, StepTarget, WorkpieceGeometry};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Parse a step as `<diameter>x<length>`, e.g. `30x12.5`
fn parse_step(s: &str) -> Result<StepTarget> {
    let (diameter, length) = s
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| anyhow!("expected <diameter>x<length>, got '{s}'"))?;
    Ok(StepTarget {
        diameter: diameter.trim().parse()?,
        length: length.trim().parse()?,
    })
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "lathe_gen",
    about = "Generates facing, turning and step turning programs for a two-axis lathe"
)]
struct Opt {
    /// TOML job file. Flags given on the command line override its values.
    #[structopt(short, long, parse(from_os_str))]
    job: Option<PathBuf>,

    /// Initial diameter of the workpiece, in mm
    #[structopt(long)]
    initial_dia: Option<f64>,

    /// Final diameter of the workpiece, in mm
    #[structopt(long)]
    final_dia: Option<f64>,

    /// Initial length of the workpiece, in mm
    #[structopt(long)]
    initial_len: Option<f64>,

    /// Final length of the workpiece, in mm
    #[structopt(long)]
    final_len: Option<f64>,

    /// Tool number, e.g. 01
    #[structopt(long)]
    tool: Option<String>,

    /// Tool offset number, e.g. 01
    #[structopt(long)]
    offset: Option<String>,

    /// Spindle speed, in RPM
    #[structopt(long)]
    rpm: Option<f64>,

    /// Feed rate, e.g. 0.2
    #[structopt(long)]
    feed: Option<f64>,

    /// Depth of cut per facing pass, in mm
    #[structopt(long)]
    facing_depth: Option<f64>,

    /// Depth of cut per turning pass, in mm (on diameter)
    #[structopt(long)]
    turning_depth: Option<f64>,

    /// Step turning step, as <diameter>x<length>. Repeat for each step, in cutting order.
    #[structopt(long = "step", parse(try_from_str = parse_step))]
    steps: Vec<StepTarget>,

    /// Step turning tool number
    #[structopt(long)]
    step_tool: Option<String>,

    /// Step turning tool offset number
    #[structopt(long)]
    step_offset: Option<String>,

    /// Step turning stock diameter, defaults to the initial diameter
    #[structopt(long)]
    step_initial_dia: Option<f64>,

    /// Step turning spindle speed, in RPM
    #[structopt(long)]
    step_rpm: Option<f64>,

    /// Step turning feed rate
    #[structopt(long)]
    step_feed: Option<f64>,

    /// Step turning depth of cut per pass, in mm
    #[structopt(long)]
    step_depth: Option<f64>,

    /// Output file for the resulting G code. Written to stdout if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Log planning detail
    #[structopt(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());
    // G code may be going to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Lay the command line flags over the job file (or the defaults, if there is none)
fn job_from_opt(opt: &Opt) -> Result<JobFile> {
    let mut job = match &opt.job {
        Some(path) => JobFile::load(path)?,
        None => JobFile::default(),
    };

    let g = &mut job.geometry;
    g.initial_diameter = opt.initial_dia.or(g.initial_diameter);
    g.final_diameter = opt.final_dia.or(g.final_diameter);
    g.initial_length = opt.initial_len.or(g.initial_length);
    g.final_length = opt.final_len.or(g.final_length);

    let t = &mut job.tooling;
    if let Some(tool) = &opt.tool {
        t.tool_number = tool.clone();
    }
    if let Some(offset) = &opt.offset {
        t.offset_number = offset.clone();
    }
    t.spindle_speed = opt.rpm.unwrap_or(t.spindle_speed);
    t.feed_rate = opt.feed.unwrap_or(t.feed_rate);
    t.depth_of_cut_facing = opt.facing_depth.or(t.depth_of_cut_facing);
    t.depth_of_cut_turning = opt.turning_depth.or(t.depth_of_cut_turning);

    // Any step on the command line turns step turning on
    if !opt.steps.is_empty() && job.step_turning.is_none() {
        job.step_turning = Some(StepTurningConfig::default());
    }
    if let Some(s) = &mut job.step_turning {
        if !opt.steps.is_empty() {
            s.steps = opt.steps.clone();
        }
        if let Some(tool) = &opt.step_tool {
            s.tool_number = tool.clone();
        }
        if let Some(offset) = &opt.step_offset {
            s.offset_number = offset.clone();
        }
        s.initial_diameter = opt.step_initial_dia.or(s.initial_diameter);
        s.spindle_speed = opt.step_rpm.unwrap_or(s.spindle_speed);
        s.feed_rate = opt.step_feed.unwrap_or(s.feed_rate);
        s.depth_of_cut = opt.step_depth.or(s.depth_of_cut);
    }

    Ok(job)
}

fn help_text(geometry: &WorkpieceGeometry) -> String {
    format!(
        "Before cut:
        - Chuck stock with OD {}mm, at least {}mm out of the chuck
        - Set Z0 on the finished face, X0 on the spindle axis",
        geometry.initial_diameter, geometry.initial_length
    )
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);
    let request = job_from_opt(&opt)?.into_request()?;
    eprintln!("{}", help_text(&request.geometry));
    let program = match assemble(&request) {
        Ok(program) => program,
        Err(e) if e.is_informational() => {
            info!("{e}");
            return Ok(());
        }
        Err(e) => {
            warn!("{e}");
            process::exit(2);
        }
    };

    match &opt.output {
        Some(path) => {
            let mut file = BufWriter::new(
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?,
            );
            program.write_to(&mut file)?;
            file.flush()?;
            info!(path = %path.display(), lines = program.lines().len(), "wrote program");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            program.write_to(&mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}
