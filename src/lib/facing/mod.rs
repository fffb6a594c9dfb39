//! Facing: remove length stock in axial passes, each cut feeding across the face to centre.
use tracing::debug;

use crate::{
    g0, g0_coolant_on, g1, preamble, xf, xz, z, Block, CutParameters, PassPlan, WorkpieceGeometry,
};

/// Clearance above the stock diameter for the approach move
const APPROACH_X: f64 = 3.0;
/// Clearance off the face for the approach move
const APPROACH_Z: f64 = 4.0;
/// Clearance above the stock diameter when retracting between passes
const RETRACT_X: f64 = 2.0;
/// Facing cuts run just past the centre line
const CUT_TO_X: f64 = -1.0;

/// Plan the facing passes for `geometry`, including the home, tool and spindle startup.
/// Returns an empty block when there is no length to remove.
pub fn plan(geometry: &WorkpieceGeometry, cut: &CutParameters) -> Block {
    let mut block = Block::new();
    if !geometry.needs_facing() {
        return block;
    }
    let removal = geometry.length_removal();
    let passes = PassPlan::new(removal, cut.depth_of_cut());
    debug!(removal, ?passes, "planned facing passes");

    let feed = cut.tooling.feed_rate;
    let stock_x = geometry.initial_diameter;

    block.header("FACING OPERATION");
    preamble(&mut block, &cut.tooling, "Spindle start");
    g0_coolant_on(&mut block, xz(stock_x + APPROACH_X, removal + APPROACH_Z));

    for (i, depth) in passes.depths().enumerate() {
        let finishing = i == passes.full_pass_count;
        // Amount faced off once this pass is done. The finishing pass lands exactly on the face.
        let total_cut = if finishing {
            removal
        } else {
            passes.full_pass_depth * (i + 1) as f64
        };
        if finishing {
            g0(&mut block, z(removal - total_cut), Some("Final facing pass"));
            g1(&mut block, xf(CUT_TO_X, feed), None);
            g0(&mut block, xz(stock_x + RETRACT_X, removal - total_cut + depth), None);
        } else {
            g0(&mut block, z(removal - total_cut), Some("Move closer"));
            g1(&mut block, xf(CUT_TO_X, feed), Some("Facing cut"));
            g0(
                &mut block,
                xz(stock_x + RETRACT_X, removal - total_cut + depth),
                Some("Retract tool"),
            );
        }
    }

    block
}
