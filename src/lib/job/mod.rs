//! Job files: a TOML description of a workpiece and its tooling, turned into a `Request`.
//!
//! ```toml
//! [geometry]
//! initial_diameter = 50
//! final_diameter = 40
//! initial_length = 100
//! final_length = 80
//!
//! [tooling]
//! tool_number = "01"
//! depth_of_cut_facing = 5
//! depth_of_cut_turning = 3
//!
//! [step_turning]
//! depth_of_cut = 1.0
//! steps = [
//!     { diameter = 45, length = 20 },
//!     { diameter = 40, length = 10 },
//! ]
//! ```
//!
//! Anything left out of `[tooling]` or `[step_turning]` takes the usual shop defaults.
use std::fs::read_to_string;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{Request, StepTarget, StepTurning, Tooling, WorkpieceGeometry};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFile {
    pub geometry: GeometryConfig,
    pub tooling: ToolingConfig,
    pub step_turning: Option<StepTurningConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    pub initial_diameter: Option<f64>,
    pub final_diameter: Option<f64>,
    pub initial_length: Option<f64>,
    pub final_length: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolingConfig {
    pub tool_number: String,
    pub offset_number: String,
    pub spindle_speed: f64,
    pub feed_rate: f64,
    pub depth_of_cut_facing: Option<f64>,
    pub depth_of_cut_turning: Option<f64>,
}

impl Default for ToolingConfig {
    fn default() -> Self {
        let t = Tooling::default();
        ToolingConfig {
            tool_number: t.tool_number,
            offset_number: t.offset_number,
            spindle_speed: t.spindle_speed,
            feed_rate: t.feed_rate,
            depth_of_cut_facing: None,
            depth_of_cut_turning: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepTurningConfig {
    pub tool_number: String,
    pub offset_number: String,
    /// Defaults to the workpiece initial diameter
    pub initial_diameter: Option<f64>,
    pub spindle_speed: f64,
    pub feed_rate: f64,
    pub depth_of_cut: Option<f64>,
    pub steps: Vec<StepTarget>,
}

impl Default for StepTurningConfig {
    fn default() -> Self {
        let t = StepTurning::default_tooling();
        StepTurningConfig {
            tool_number: t.tool_number,
            offset_number: t.offset_number,
            initial_diameter: None,
            spindle_speed: t.spindle_speed,
            feed_rate: t.feed_rate,
            depth_of_cut: Some(1.0),
            steps: Vec::new(),
        }
    }
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse job file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Build the request. All four workpiece dimensions must be present by now.
    pub fn into_request(self) -> Result<Request> {
        let required = |v: Option<f64>, name: &str| v.ok_or_else(|| anyhow!("Missing {name}"));
        let geometry = WorkpieceGeometry {
            initial_diameter: required(self.geometry.initial_diameter, "initial diameter")?,
            final_diameter: required(self.geometry.final_diameter, "final diameter")?,
            initial_length: required(self.geometry.initial_length, "initial length")?,
            final_length: required(self.geometry.final_length, "final length")?,
        };
        let tooling = Tooling {
            tool_number: self.tooling.tool_number,
            offset_number: self.tooling.offset_number,
            spindle_speed: self.tooling.spindle_speed,
            feed_rate: self.tooling.feed_rate,
        };
        let step_turning = self.step_turning.map(|s| StepTurning {
            tooling: Tooling {
                tool_number: s.tool_number,
                offset_number: s.offset_number,
                spindle_speed: s.spindle_speed,
                feed_rate: s.feed_rate,
            },
            initial_diameter: s.initial_diameter.unwrap_or(geometry.initial_diameter),
            depth_of_cut: s.depth_of_cut,
            steps: s.steps,
        });
        Ok(Request {
            geometry,
            tooling,
            depth_of_cut_facing: self.tooling.depth_of_cut_facing,
            depth_of_cut_turning: self.tooling.depth_of_cut_turning,
            step_turning,
        })
    }
}
