use std::fmt::Write as _;
use std::io::{Result, Write};

pub mod error;
pub mod facing;
pub mod job;
pub mod passes;
pub mod program;
pub mod steps;
pub mod turning;

pub use error::{Operation, PlanError};
pub use passes::PassPlan;
pub use program::{assemble, Program, ProgramShape, Request};
pub use steps::{StepTarget, StepTurning};

/// Values closer than this to a whole number are printed as whole numbers. Removals, depths of
/// cut and pass remainders no larger than this count as zero.
pub const EPSILON: f64 = 1e-9;

/// Prefix for structural (non-machine) lines.
pub const HEADER_PREFIX: &str = ">>";

/// Dimensions of the stock and of the finished part, in machine length units.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkpieceGeometry {
    pub initial_diameter: f64,
    pub final_diameter: f64,
    pub initial_length: f64,
    pub final_length: f64,
}

impl WorkpieceGeometry {
    /// Diameter to remove by turning. Turning applies only when this is more than `EPSILON`.
    pub fn diameter_removal(&self) -> f64 {
        self.initial_diameter - self.final_diameter
    }

    /// Length to remove by facing. Facing applies only when this is more than `EPSILON`.
    pub fn length_removal(&self) -> f64 {
        self.initial_length - self.final_length
    }

    pub fn needs_turning(&self) -> bool {
        self.diameter_removal() > EPSILON
    }

    pub fn needs_facing(&self) -> bool {
        self.length_removal() > EPSILON
    }
}

/// Tool, spindle and feed settings shared by one operation
#[derive(Clone, Debug, PartialEq)]
pub struct Tooling {
    pub tool_number: String,
    pub offset_number: String,
    pub spindle_speed: f64,
    pub feed_rate: f64,
}

impl Default for Tooling {
    fn default() -> Self {
        Tooling {
            tool_number: "01".to_string(),
            offset_number: "01".to_string(),
            spindle_speed: 1200.0,
            feed_rate: 0.2,
        }
    }
}

/// Settings for a single planned operation. Only built through `CutParameters::new`, so
/// `depth_of_cut` is always finite and larger than `EPSILON`.
#[derive(Clone, Debug, PartialEq)]
pub struct CutParameters {
    pub tooling: Tooling,
    depth_of_cut: f64,
}

impl CutParameters {
    pub fn new(
        operation: Operation,
        tooling: Tooling,
        depth_of_cut: Option<f64>,
    ) -> std::result::Result<Self, PlanError> {
        match depth_of_cut {
            Some(depth_of_cut) if depth_of_cut.is_finite() && depth_of_cut > EPSILON => {
                Ok(CutParameters {
                    tooling,
                    depth_of_cut,
                })
            }
            _ => Err(PlanError::MissingDepthOfCut { operation }),
        }
    }

    pub fn depth_of_cut(&self) -> f64 {
        self.depth_of_cut
    }
}

/// An owned, append-only run of instruction lines. Each planner builds its own block, and the
/// assembler concatenates them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    lines: Vec<String>,
}

impl Block {
    pub fn new() -> Self {
        Block { lines: Vec::new() }
    }

    /// Structural line, e.g. `>> FACING OPERATION`
    pub fn header(&mut self, s: &str) {
        self.lines.push(format!("{HEADER_PREFIX} {s}"));
    }

    /// Machine word(s) with an optional trailing note in parentheses
    pub fn code(&mut self, code: &str, note: Option<&str>) {
        match note {
            Some(note) => self.lines.push(format!("{code} ({note})")),
            None => self.lines.push(code.to_string()),
        }
    }

    pub fn append(&mut self, mut other: Block) {
        self.lines.append(&mut other.lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the block out, one instruction per line. Section headers after the first line get
    /// a blank line in front of them.
    pub fn write_to(&self, file: &mut dyn Write) -> Result<()> {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 && line.starts_with(HEADER_PREFIX) && !is_summary(line) {
                writeln!(file)?;
            }
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}

fn is_summary(line: &str) -> bool {
    line.starts_with(">> Perform")
}

/// Return to the reference position
pub fn home(block: &mut Block, note: &str) {
    block.code("G28 U0 W0", Some(note));
}

pub fn tool_select(block: &mut Block, tool: &str, offset: &str, note: Option<&str>) {
    block.code(&format!("T{tool}{offset}"), note);
}

pub fn spindle_start(block: &mut Block, rpm: f64, note: &str) {
    block.code(&format!("S{rpm} M03"), Some(note));
}

/// Home, select the tool and start the spindle.
pub fn preamble(block: &mut Block, tooling: &Tooling, spindle_note: &str) {
    home(block, "HOME POSITION, DEFAULT");
    tool_select(
        block,
        &tooling.tool_number,
        &tooling.offset_number,
        Some("Tool and offset number"),
    );
    spindle_start(block, tooling.spindle_speed, spindle_note);
}

/// Shutdown block that closes every program.
pub fn trailer(block: &mut Block) {
    block.code("M09", Some("Coolant off"));
    block.code("M05", Some("Spindle off"));
    home(block, "Return home");
    block.code("M30", Some("End of program"));
}

#[derive(Clone, Debug, PartialEq)]
pub struct PosAndFeed {
    x: Option<f64>,
    z: Option<f64>,
    feed: Option<f64>,
}

pub fn z(z: f64) -> PosAndFeed {
    PosAndFeed {
        x: None,
        z: Some(z),
        feed: None,
    }
}

pub fn xz(x: f64, z: f64) -> PosAndFeed {
    PosAndFeed {
        x: Some(x),
        z: Some(z),
        feed: None,
    }
}

pub fn xf(x: f64, feed: f64) -> PosAndFeed {
    PosAndFeed {
        x: Some(x),
        z: None,
        feed: Some(feed),
    }
}

pub fn zf(z: f64, feed: f64) -> PosAndFeed {
    PosAndFeed {
        x: None,
        z: Some(z),
        feed: Some(feed),
    }
}

impl PosAndFeed {
    fn as_gvals(&self) -> String {
        let mut s = String::new();
        g_val(&mut s, "X", self.x);
        g_val(&mut s, "Z", self.z);
        g_val(&mut s, "F", self.feed);
        s
    }
}

/// Format a number for a G-code word.
/// Numbers that round nicely are printed in their minimal form with a trailing point, so the
/// controller never reads them in its least input increment.
pub fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < EPSILON {
        // Avoid printing "-0."
        let r = v.round();
        let r = if r == 0.0 { 0.0 } else { r };
        format!("{r}.")
    } else {
        format!("{v:.4}")
    }
}

fn g_val(s: &mut String, name: &str, ov: Option<f64>) {
    if let Some(v) = ov {
        // Writing to a String can't fail
        let _ = write!(s, " {}{}", name, fmt_num(v));
    }
}

fn g_move_linear(
    block: &mut Block,
    g: &str,
    p: &PosAndFeed,
    suffix: Option<&str>,
    note: Option<&str>,
) {
    debug_assert!(
        p.x.is_some() || p.z.is_some(),
        "Refusing to make illegal move"
    );
    let mut code = format!("{g}{}", p.as_gvals());
    if let Some(suffix) = suffix {
        code.push(' ');
        code.push_str(suffix);
    }
    block.code(&code, note);
}

/// Rapid positioning move
pub fn g0(block: &mut Block, p: PosAndFeed, note: Option<&str>) {
    debug_assert!(p.feed.is_none(), "G00 moves must not include a feed rate");
    g_move_linear(block, "G00", &p, None, note);
}

/// Rapid positioning move that also turns the coolant on
pub fn g0_coolant_on(block: &mut Block, p: PosAndFeed) {
    debug_assert!(p.feed.is_none(), "G00 moves must not include a feed rate");
    g_move_linear(block, "G00", &p, Some("M07"), Some("Coolant on"));
}

/// Linear feed move
pub fn g1(block: &mut Block, p: PosAndFeed, note: Option<&str>) {
    debug_assert!(p.feed.is_some(), "G01 moves must include a feed rate");
    g_move_linear(block, "G01", &p, None, note);
}
