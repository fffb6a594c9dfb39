//! Step turning: a chain of turning cuts along Z, one per (diameter, length) step, giving a
//! stepped cylindrical profile with a single tool.
//!
//! Every step starts cutting from the step stock diameter, not from the diameter the previous
//! step left behind. Steps are not checked against each other, so a later step may ask for a
//! larger diameter than an earlier one.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::program::check_dimension;
use crate::{
    g0, g0_coolant_on, g1, home, spindle_start, tool_select, xz, zf, Block, CutParameters,
    Operation, PassPlan, PlanError, Tooling,
};

/// Clearance above the stock diameter for the approach move
const APPROACH_X: f64 = 4.0;
/// Z for the approach move
const APPROACH_Z: f64 = 2.0;
/// Retract clearance above the cut diameter
const RETRACT_X: f64 = 2.0;
/// Each cut starts this far off the start of its step
const CUT_START_Z: f64 = 1.0;
/// and retracts to this far off it.
const RETRACT_Z: f64 = 2.0;

/// One step of the profile: turn down to `diameter` over `length` along Z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepTarget {
    pub diameter: f64,
    pub length: f64,
}

/// Parameters for the step turning operation
#[derive(Clone, Debug, PartialEq)]
pub struct StepTurning {
    pub tooling: Tooling,
    /// Stock diameter every step cuts down from
    pub initial_diameter: f64,
    pub depth_of_cut: Option<f64>,
    /// Steps in cutting order
    pub steps: Vec<StepTarget>,
}

impl StepTurning {
    /// Default step tooling: tool 02, offset 02.
    pub fn default_tooling() -> Tooling {
        Tooling {
            tool_number: "02".to_string(),
            offset_number: "02".to_string(),
            ..Tooling::default()
        }
    }

    /// Check the step count, each step's size and the depth of cut, returning the cut
    /// parameters to plan with. Steps are only checked one at a time, never against each other.
    pub fn validate(&self) -> Result<CutParameters, PlanError> {
        if self.steps.is_empty() {
            return Err(PlanError::InvalidStepCount { count: 0 });
        }
        for step in &self.steps {
            check_dimension("step diameter", step.diameter)?;
            check_dimension("step length", step.length)?;
        }
        CutParameters::new(
            Operation::StepTurning,
            self.tooling.clone(),
            self.depth_of_cut,
        )
    }
}

/// Z offset each step starts at: the sum of the lengths of the steps before it.
pub fn step_offsets(steps: &[StepTarget]) -> Vec<f64> {
    steps
        .iter()
        .scan(0.0, |offset, step| {
            let start = *offset;
            *offset += step.length;
            Some(start)
        })
        .collect()
}

/// Plan every step in order. `startup` homes the machine first and turns the coolant on with the
/// approach, for when step turning is the only operation in the program.
pub fn plan(params: &StepTurning, cut: &CutParameters, startup: bool) -> Block {
    let mut block = Block::new();
    let feed = cut.tooling.feed_rate;
    let stock_x = params.initial_diameter;

    block.header("STEP TURNING OPERATION");
    if startup {
        home(&mut block, "HOME POSITION, DEFAULT");
    }
    tool_select(
        &mut block,
        &cut.tooling.tool_number,
        &cut.tooling.offset_number,
        Some("Step turning tool and offset number"),
    );
    spindle_start(&mut block, cut.tooling.spindle_speed, "Spindle start");
    let approach = xz(stock_x + APPROACH_X, APPROACH_Z);
    if startup {
        g0_coolant_on(&mut block, approach);
    } else {
        g0(&mut block, approach, None);
    }

    for (idx, (step, offset)) in params
        .steps
        .iter()
        .zip(step_offsets(&params.steps))
        .enumerate()
    {
        let passes = PassPlan::new(stock_x - step.diameter, cut.depth_of_cut());
        debug!(index = idx + 1, offset, ?step, ?passes, "planned step");

        let label = format!("Step {}", idx + 1);
        for i in 0..passes.cut_count() {
            let n = if i == passes.full_pass_count {
                step.diameter
            } else {
                stock_x - passes.full_pass_depth * (i + 1) as f64
            };
            let note = if i == 0 { Some(label.as_str()) } else { None };
            g0(&mut block, xz(n, -(offset - CUT_START_Z)), note);
            g1(&mut block, zf(-(offset + step.length), feed), None);
            g0(&mut block, xz(n + RETRACT_X, -(offset - RETRACT_Z)), None);
        }
    }

    block
}
