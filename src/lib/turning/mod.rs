//! Turning: remove diameter stock in radial passes along the finished length.
use tracing::debug;

use crate::{
    g0, g0_coolant_on, g1, preamble, xz, zf, Block, CutParameters, PassPlan, WorkpieceGeometry,
};

/// Clearance above the stock diameter for the approach and full-pass retracts
const CLEARANCE_X: f64 = 4.0;
/// Z for the approach move
const APPROACH_Z: f64 = 3.0;
/// Z each cut starts from, just off the face
const CUT_START_Z: f64 = 0.5;
/// Z the tool retracts to between passes
const RETRACT_Z: f64 = 2.0;
/// Finishing retract, above the finished diameter
const FINISH_RETRACT_X: f64 = 2.0;

/// Plan the turning passes for `geometry`. `startup` adds the home, tool and spindle words, for
/// when turning is the first operation in the program.
/// Returns an empty block when there is no diameter to remove.
pub fn plan(geometry: &WorkpieceGeometry, cut: &CutParameters, startup: bool) -> Block {
    let mut block = Block::new();
    if !geometry.needs_turning() {
        return block;
    }
    let removal = geometry.diameter_removal();
    let passes = PassPlan::new(removal, cut.depth_of_cut());
    debug!(removal, ?passes, startup, "planned turning passes");

    let feed = cut.tooling.feed_rate;
    let stock_x = geometry.initial_diameter;
    let cut_to_z = -geometry.final_length;

    block.header("TURNING OPERATION");
    if startup {
        preamble(&mut block, &cut.tooling, "Spindle start");
    }
    g0_coolant_on(&mut block, xz(stock_x + CLEARANCE_X, APPROACH_Z));

    for i in 0..passes.full_pass_count {
        // Cut position, and how far the retract clearance has moved in with the material
        let n = stock_x - passes.full_pass_depth * (i + 1) as f64;
        let p = passes.full_pass_depth * i as f64;
        g0(&mut block, xz(n, CUT_START_Z), Some("Positioning for cut"));
        g1(&mut block, zf(cut_to_z, feed), None);
        g0(
            &mut block,
            xz(stock_x - p + CLEARANCE_X, RETRACT_Z),
            Some("Retract tool"),
        );
    }
    if passes.has_finishing_pass() {
        let n = geometry.final_diameter;
        g0(&mut block, xz(n, CUT_START_Z), Some("Final finishing cut"));
        g1(&mut block, zf(cut_to_z, feed), None);
        g0(
            &mut block,
            xz(n + FINISH_RETRACT_X, RETRACT_Z),
            Some("Retract tool"),
        );
    }

    block
}
