//! Assembles the planned operations into one program: facing, then turning, then step turning,
//! closed by the shutdown trailer.
use std::io::{Result as IoResult, Write};

use tracing::info;

use crate::{
    facing, steps, trailer, turning, Block, CutParameters, Operation, PlanError, StepTurning,
    Tooling, WorkpieceGeometry,
};

/// Everything needed to generate one program.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub geometry: WorkpieceGeometry,
    /// Tool, spindle and feed for facing and turning
    pub tooling: Tooling,
    pub depth_of_cut_facing: Option<f64>,
    pub depth_of_cut_turning: Option<f64>,
    /// Step turning, if requested
    pub step_turning: Option<StepTurning>,
}

/// Which of facing and turning the workpiece needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramShape {
    FacingAndTurning,
    TurningOnly,
    FacingOnly,
    Nothing,
}

impl ProgramShape {
    pub fn select(geometry: &WorkpieceGeometry) -> Self {
        match (geometry.needs_facing(), geometry.needs_turning()) {
            (true, true) => ProgramShape::FacingAndTurning,
            (false, true) => ProgramShape::TurningOnly,
            (true, false) => ProgramShape::FacingOnly,
            (false, false) => ProgramShape::Nothing,
        }
    }

    pub fn facing(self) -> bool {
        matches!(
            self,
            ProgramShape::FacingAndTurning | ProgramShape::FacingOnly
        )
    }

    pub fn turning(self) -> bool {
        matches!(
            self,
            ProgramShape::FacingAndTurning | ProgramShape::TurningOnly
        )
    }

    fn summary(self) -> &'static str {
        match self {
            ProgramShape::FacingAndTurning => "Perform facing followed by turning",
            ProgramShape::TurningOnly => "Perform only turning",
            ProgramShape::FacingOnly => "Perform only facing",
            ProgramShape::Nothing => "Perform only step turning",
        }
    }
}

/// A complete program, ready to hand to the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub shape: ProgramShape,
    pub step_turning: bool,
    block: Block,
}

impl Program {
    pub fn lines(&self) -> &[String] {
        self.block.lines()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.block.into_lines()
    }

    pub fn write_to(&self, file: &mut dyn Write) -> IoResult<()> {
        self.block.write_to(file)
    }
}

pub(crate) fn check_dimension(name: &'static str, value: f64) -> Result<(), PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidDimension { name, value })
    }
}

fn check_tooling(
    tooling: &Tooling,
    spindle: &'static str,
    feed: &'static str,
) -> Result<(), PlanError> {
    if !(tooling.spindle_speed.is_finite() && tooling.spindle_speed > 0.0) {
        return Err(PlanError::InvalidParameter {
            name: spindle,
            value: tooling.spindle_speed,
        });
    }
    if !(tooling.feed_rate.is_finite() && tooling.feed_rate > 0.0) {
        return Err(PlanError::InvalidParameter {
            name: feed,
            value: tooling.feed_rate,
        });
    }
    Ok(())
}

/// Validate `request` and generate its program. Nothing is planned unless every check passes.
pub fn assemble(request: &Request) -> Result<Program, PlanError> {
    let g = &request.geometry;
    check_dimension("initial diameter", g.initial_diameter)?;
    check_dimension("final diameter", g.final_diameter)?;
    check_dimension("initial length", g.initial_length)?;
    check_dimension("final length", g.final_length)?;

    let shape = ProgramShape::select(g);
    if shape == ProgramShape::Nothing && request.step_turning.is_none() {
        return Err(PlanError::NoApplicableOperation);
    }

    if shape != ProgramShape::Nothing {
        check_tooling(&request.tooling, "spindle speed", "feed rate")?;
    }
    let facing_cut = if shape.facing() {
        Some(CutParameters::new(
            Operation::Facing,
            request.tooling.clone(),
            request.depth_of_cut_facing,
        )?)
    } else {
        None
    };
    let turning_cut = if shape.turning() {
        Some(CutParameters::new(
            Operation::Turning,
            request.tooling.clone(),
            request.depth_of_cut_turning,
        )?)
    } else {
        None
    };
    let step_cut = match &request.step_turning {
        Some(step_turning) => {
            check_tooling(
                &step_turning.tooling,
                "step spindle speed",
                "step feed rate",
            )?;
            check_dimension("step initial diameter", step_turning.initial_diameter)?;
            Some((step_turning, step_turning.validate()?))
        }
        None => None,
    };

    info!(?shape, step_turning = step_cut.is_some(), "assembling program");

    let mut block = Block::new();
    block.header(shape.summary());
    if let Some(cut) = &facing_cut {
        block.append(facing::plan(g, cut));
    }
    if let Some(cut) = &turning_cut {
        block.append(turning::plan(g, cut, facing_cut.is_none()));
    }
    if let Some((params, cut)) = &step_cut {
        block.append(steps::plan(params, cut, shape == ProgramShape::Nothing));
    }
    trailer(&mut block);

    info!(lines = block.len(), "program assembled");
    Ok(Program {
        shape,
        step_turning: step_cut.is_some(),
        block,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StepTarget;

    fn request(
        initial_diameter: f64,
        final_diameter: f64,
        initial_length: f64,
        final_length: f64,
    ) -> Request {
        Request {
            geometry: WorkpieceGeometry {
                initial_diameter,
                final_diameter,
                initial_length,
                final_length,
            },
            tooling: Tooling::default(),
            depth_of_cut_facing: Some(5.0),
            depth_of_cut_turning: Some(3.0),
            step_turning: None,
        }
    }

    fn step_turning() -> StepTurning {
        StepTurning {
            tooling: StepTurning::default_tooling(),
            initial_diameter: 50.0,
            depth_of_cut: Some(1.0),
            steps: vec![StepTarget {
                diameter: 45.0,
                length: 10.0,
            }],
        }
    }

    fn headers(program: &Program) -> Vec<&str> {
        program
            .lines()
            .iter()
            .filter(|l| l.starts_with(">>"))
            .map(|l| l.as_str())
            .collect()
    }

    #[test]
    fn shape_selection() {
        let shape = |d0, d1, l0, l1| ProgramShape::select(&request(d0, d1, l0, l1).geometry);
        assert_eq!(shape(50.0, 40.0, 100.0, 80.0), ProgramShape::FacingAndTurning);
        assert_eq!(shape(50.0, 40.0, 100.0, 100.0), ProgramShape::TurningOnly);
        assert_eq!(shape(50.0, 50.0, 100.0, 80.0), ProgramShape::FacingOnly);
        assert_eq!(shape(50.0, 50.0, 100.0, 100.0), ProgramShape::Nothing);
        assert_eq!(shape(40.0, 50.0, 80.0, 100.0), ProgramShape::Nothing);
    }

    #[test]
    fn facing_then_turning() {
        let program = assemble(&request(50.0, 40.0, 100.0, 80.0)).unwrap();
        assert_eq!(
            headers(&program),
            vec![
                ">> Perform facing followed by turning",
                ">> FACING OPERATION",
                ">> TURNING OPERATION"
            ]
        );
        // Turning follows on from facing without homing again
        let homes = program.lines().iter().filter(|l| l.starts_with("G28")).count();
        assert_eq!(homes, 2);
        let cuts = program.lines().iter().filter(|l| l.starts_with("G01")).count();
        assert_eq!(cuts, 4 + 4);
    }

    #[test]
    fn nothing_to_do() {
        assert_eq!(
            assemble(&request(50.0, 50.0, 100.0, 100.0)),
            Err(PlanError::NoApplicableOperation)
        );
    }

    #[test]
    fn step_turning_alone() {
        let mut r = request(50.0, 50.0, 100.0, 100.0);
        r.step_turning = Some(step_turning());
        let program = assemble(&r).unwrap();
        assert_eq!(program.shape, ProgramShape::Nothing);
        assert!(program.step_turning);
        assert_eq!(
            headers(&program),
            vec![">> Perform only step turning", ">> STEP TURNING OPERATION"]
        );
        assert_eq!(program.lines()[2], "G28 U0 W0 (HOME POSITION, DEFAULT)");
    }

    #[test]
    fn step_turning_after_turning() {
        let mut r = request(50.0, 40.0, 100.0, 100.0);
        r.step_turning = Some(step_turning());
        let program = assemble(&r).unwrap();
        assert_eq!(
            headers(&program),
            vec![
                ">> Perform only turning",
                ">> TURNING OPERATION",
                ">> STEP TURNING OPERATION"
            ]
        );
        let homes = program.lines().iter().filter(|l| l.starts_with("G28")).count();
        assert_eq!(homes, 2);
    }

    #[test]
    fn missing_depth_only_matters_when_needed() {
        let mut r = request(50.0, 40.0, 100.0, 100.0);
        r.depth_of_cut_facing = None;
        assert!(assemble(&r).is_ok());

        r.geometry.final_length = 90.0;
        assert_eq!(
            assemble(&r),
            Err(PlanError::MissingDepthOfCut {
                operation: Operation::Facing
            })
        );

        let mut r = request(50.0, 40.0, 100.0, 100.0);
        r.depth_of_cut_turning = Some(0.0);
        assert_eq!(
            assemble(&r),
            Err(PlanError::MissingDepthOfCut {
                operation: Operation::Turning
            })
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(
            assemble(&request(0.0, 40.0, 100.0, 80.0)),
            Err(PlanError::InvalidDimension {
                name: "initial diameter",
                value: 0.0
            })
        );

        let mut r = request(50.0, 40.0, 100.0, 80.0);
        r.tooling.feed_rate = 0.0;
        assert_eq!(
            assemble(&r),
            Err(PlanError::InvalidParameter {
                name: "feed rate",
                value: 0.0
            })
        );

        let mut r = request(50.0, 40.0, 100.0, 80.0);
        let mut st = step_turning();
        st.steps.clear();
        r.step_turning = Some(st);
        assert_eq!(assemble(&r), Err(PlanError::InvalidStepCount { count: 0 }));
    }

    #[test]
    fn rejects_non_finite_inputs() {
        let mut r = request(50.0, 40.0, 100.0, 80.0);
        r.geometry.initial_diameter = f64::INFINITY;
        assert_eq!(
            assemble(&r),
            Err(PlanError::InvalidDimension {
                name: "initial diameter",
                value: f64::INFINITY
            })
        );

        let mut r = request(50.0, 40.0, 100.0, 80.0);
        r.geometry.final_length = f64::NAN;
        assert!(matches!(
            assemble(&r),
            Err(PlanError::InvalidDimension {
                name: "final length",
                ..
            })
        ));

        let mut r = request(50.0, 40.0, 100.0, 80.0);
        r.depth_of_cut_turning = Some(f64::INFINITY);
        assert_eq!(
            assemble(&r),
            Err(PlanError::MissingDepthOfCut {
                operation: Operation::Turning
            })
        );

        let mut r = request(50.0, 40.0, 100.0, 80.0);
        r.tooling.spindle_speed = f64::INFINITY;
        assert_eq!(
            assemble(&r),
            Err(PlanError::InvalidParameter {
                name: "spindle speed",
                value: f64::INFINITY
            })
        );

        let mut r = request(50.0, 50.0, 100.0, 100.0);
        let mut st = step_turning();
        st.tooling.feed_rate = f64::NAN;
        r.step_turning = Some(st);
        assert!(matches!(
            assemble(&r),
            Err(PlanError::InvalidParameter {
                name: "step feed rate",
                ..
            })
        ));
    }

    #[test]
    fn removal_within_epsilon_is_nothing_to_do() {
        let r = request(50.0, 50.0 - 1e-10, 100.0, 100.0 - 1e-10);
        assert_eq!(ProgramShape::select(&r.geometry), ProgramShape::Nothing);
        assert_eq!(assemble(&r), Err(PlanError::NoApplicableOperation));

        // Just past the threshold still cuts once
        let r = request(50.0, 50.0 - 1e-6, 100.0, 100.0);
        let program = assemble(&r).unwrap();
        assert_eq!(program.shape, ProgramShape::TurningOnly);
        let cuts = program.lines().iter().filter(|l| l.starts_with("G01")).count();
        assert_eq!(cuts, 1);
    }
}
