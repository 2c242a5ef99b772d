use crate::core::race::RacePars;
use crate::core::track::TrackPars;
use crate::core::vehicle::VehiclePars;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;
use thiserror::Error;

/// SimPars is used to store all other parameter structs. Missing sections and fields fall back to
/// the built-in game.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SimPars {
    #[serde(default)]
    pub race_pars: RacePars,
    #[serde(default)]
    pub track_pars: TrackPars,
    #[serde(default)]
    pub vehicle_pars: VehiclePars,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("track must contain at least 2 checkpoints, got {0}")]
    TooFewCheckpoints(usize),
    #[error("number of laps must be at least 1")]
    NoLaps,
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("friction must be in ]0, 1], got {0}")]
    InvalidFriction(f64),
}

impl SimPars {
    /// validate checks the parameters for values the race cannot be simulated with.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let no_checkpoints = self.track_pars.checkpoints.len();
        if no_checkpoints < 2 {
            return Err(ParameterError::TooFewCheckpoints(no_checkpoints));
        }

        if self.race_pars.tot_no_laps == 0 {
            return Err(ParameterError::NoLaps);
        }

        let mut positive_pars = vec![
            ("checkpoint_radius", self.track_pars.checkpoint_radius),
            ("pickup_radius", self.race_pars.pickup_radius),
            ("catch_radius", self.race_pars.catch_radius),
            ("speed_factor", self.race_pars.speed_factor),
            ("boost_item_factor", self.race_pars.boost_item_factor),
            ("t_speed", self.race_pars.t_speed),
            ("t_invincibility", self.race_pars.t_invincibility),
            ("t_attack", self.race_pars.t_attack),
            ("attack_cooldown", self.race_pars.attack_cooldown),
            ("acceleration", self.vehicle_pars.acceleration),
            ("max_speed", self.vehicle_pars.max_speed),
            ("turn_speed", self.vehicle_pars.turn_speed),
        ];
        if let Some(track_width) = self.track_pars.track_width {
            positive_pars.push(("track_width", track_width));
        }

        for (name, value) in positive_pars {
            if value.is_nan() || value <= 0.0 {
                return Err(ParameterError::NotPositive { name, value });
            }
        }

        let friction = self.vehicle_pars.friction;
        if friction.is_nan() || friction <= 0.0 || friction > 1.0 {
            return Err(ParameterError::InvalidFriction(friction));
        }

        if self.vehicle_pars.boost_decay < 0.0 {
            return Err(ParameterError::NotPositive {
                name: "boost_decay",
                value: self.vehicle_pars.boost_decay,
            });
        }

        Ok(())
    }
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct. The parameters are validated before they are returned.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars: SimPars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;

    pars.validate().context(format!(
        "Invalid parameters in parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
