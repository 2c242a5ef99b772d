use crate::core::controls::ControlFlags;
use glam::DVec3;
use helpers::general::wrap_angle;
use serde::Deserialize;

/// Factor applied to the current speed by the one-shot boost input (also caps the result
/// relative to the effective maximum speed).
pub const BOOST_SPEED_FACTOR: f64 = 1.5;

/// KinematicsMode selects how the speed is turned into a position change per frame.
/// * `PerTick` - position advances by `speed` units per frame
/// * `TimeScaled` - position advances by `speed * dt` units per frame
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum KinematicsMode {
    PerTick,
    TimeScaled,
}

impl Default for KinematicsMode {
    fn default() -> Self {
        KinematicsMode::PerTick
    }
}

/// * `acceleration` - Speed change per frame while accelerating or braking
/// * `max_speed` - Base maximum forward speed (reverse is limited to half of it)
/// * `turn_speed` - (rad) Heading change per frame while turning (doubled while drifting)
/// * `friction` - Multiplicative speed factor applied every frame
/// * `boost_decay` - Boost charge decrease per frame
/// * `kinematics` - Per-tick or time-scaled position update
/// * `color` - CSS color of the kart
/// * `invincible_color` - CSS color of the kart while invincible
#[derive(Debug, Deserialize, Clone)]
pub struct VehiclePars {
    #[serde(default = "default_acceleration")]
    pub acceleration: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default = "default_boost_decay")]
    pub boost_decay: f64,
    #[serde(default)]
    pub kinematics: KinematicsMode,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_invincible_color")]
    pub invincible_color: String,
}

fn default_acceleration() -> f64 {
    0.1
}

fn default_max_speed() -> f64 {
    0.5
}

fn default_turn_speed() -> f64 {
    0.02
}

fn default_friction() -> f64 {
    0.98
}

fn default_boost_decay() -> f64 {
    0.01
}

fn default_color() -> String {
    String::from("#ff0000")
}

fn default_invincible_color() -> String {
    String::from("#ffff00")
}

impl Default for VehiclePars {
    fn default() -> Self {
        VehiclePars {
            acceleration: default_acceleration(),
            max_speed: default_max_speed(),
            turn_speed: default_turn_speed(),
            friction: default_friction(),
            boost_decay: default_boost_decay(),
            kinematics: KinematicsMode::default(),
            color: default_color(),
            invincible_color: default_invincible_color(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Base,
    Invincible,
}

/// Vehicle holds the kinematic state of the kart. `max_speed` is the currently effective maximum
/// speed, i.e. the base value possibly scaled by an active speed effect.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub position: DVec3,
    pub heading: f64,
    pub speed: f64,
    pub boost_charge: f64,
    pub max_speed: f64,
    pub drift: bool,
    pub tint: Tint,
    pub controls: ControlFlags,
    base_max_speed: f64,
    acceleration: f64,
    turn_speed: f64,
    friction: f64,
    boost_decay: f64,
    kinematics: KinematicsMode,
    start_position: DVec3,
    start_heading: f64,
    last_valid_position: DVec3,
}

impl Vehicle {
    pub fn new(vehicle_pars: &VehiclePars, start_position: DVec3, start_heading: f64) -> Vehicle {
        Vehicle {
            position: start_position,
            heading: wrap_angle(start_heading),
            speed: 0.0,
            boost_charge: 0.0,
            max_speed: vehicle_pars.max_speed,
            drift: false,
            tint: Tint::Base,
            controls: ControlFlags::default(),
            base_max_speed: vehicle_pars.max_speed,
            acceleration: vehicle_pars.acceleration,
            turn_speed: vehicle_pars.turn_speed,
            friction: vehicle_pars.friction,
            boost_decay: vehicle_pars.boost_decay,
            kinematics: vehicle_pars.kinematics,
            start_position,
            start_heading: wrap_angle(start_heading),
            last_valid_position: start_position,
        }
    }

    pub fn base_max_speed(&self) -> f64 {
        self.base_max_speed
    }

    pub fn turn_speed(&self) -> f64 {
        self.turn_speed
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn kinematics(&self) -> KinematicsMode {
        self.kinematics
    }

    /// update_kinematics advances the vehicle by one frame of length `dt` (s). Held controls are
    /// applied first, then the position is moved along the heading, and finally friction and
    /// boost decay are applied. A new position rejected by `is_on_track` puts the vehicle back
    /// onto its last valid position and stops it. Returns false in that case.
    pub fn update_kinematics<F>(&mut self, dt: f64, is_on_track: F) -> bool
    where
        F: Fn(DVec3) -> bool,
    {
        self.apply_held_controls();

        let step = match self.kinematics {
            KinematicsMode::PerTick => self.speed,
            KinematicsMode::TimeScaled => self.speed * dt,
        };
        let new_position =
            self.position + DVec3::new(self.heading.sin(), 0.0, self.heading.cos()) * step;

        let on_track = is_on_track(new_position);
        if on_track {
            self.position = new_position;
            self.last_valid_position = new_position;
        } else {
            self.position = self.last_valid_position;
            self.speed = 0.0;
        }

        // friction acts regardless of the inputs
        self.speed *= self.friction;

        if self.boost_charge > 0.0 {
            self.boost_charge = (self.boost_charge - self.boost_decay).max(0.0);
        }

        on_track
    }

    fn apply_held_controls(&mut self) {
        if self.controls.accelerate {
            self.speed = (self.speed + self.acceleration).min(self.max_speed);
        }
        if self.controls.brake {
            self.speed = (self.speed - self.acceleration).max(-self.max_speed / 2.0);
        }

        if self.controls.is_turning() {
            let turn = if self.controls.drift_modifier {
                self.drift = true;
                2.0 * self.turn_speed
            } else {
                self.turn_speed
            };

            if self.controls.turn_left {
                self.heading += turn;
            }
            if self.controls.turn_right {
                self.heading -= turn;
            }
            self.heading = wrap_angle(self.heading);
        }
    }

    /// boost is the one-shot boost input: scales the current speed and refills the boost charge.
    pub fn boost(&mut self) {
        self.boost_charge = 1.0;
        self.speed = (self.speed * BOOST_SPEED_FACTOR).min(self.max_speed * BOOST_SPEED_FACTOR);
    }

    /// scale_max_speed sets the effective maximum speed to the base value times `factor`.
    pub fn scale_max_speed(&mut self, factor: f64) {
        self.max_speed = self.base_max_speed * factor;
    }

    pub fn restore_max_speed(&mut self) {
        self.max_speed = self.base_max_speed;
    }

    /// reset puts the vehicle back onto its start position and clears all dynamic state.
    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.last_valid_position = self.start_position;
        self.heading = self.start_heading;
        self.speed = 0.0;
        self.boost_charge = 0.0;
        self.max_speed = self.base_max_speed;
        self.drift = false;
        self.tint = Tint::Base;
        self.controls = ControlFlags::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn anywhere(_: DVec3) -> bool {
        true
    }

    fn test_vehicle() -> Vehicle {
        Vehicle::new(&VehiclePars::default(), DVec3::new(0.0, 0.5, 0.0), 0.0)
    }

    #[test]
    fn friction_decays_speed_without_sign_change() {
        let mut vehicle = test_vehicle();

        for start_speed in [0.4, -0.2] {
            vehicle.speed = start_speed;
            let mut prev = start_speed;

            for _ in 0..500 {
                vehicle.update_kinematics(1.0 / 60.0, anywhere);
                assert!(vehicle.speed.abs() < prev.abs());
                assert_eq!(vehicle.speed.signum(), start_speed.signum());
                prev = vehicle.speed;
            }
        }
    }

    #[test]
    fn accelerate_and_brake_respect_limits() {
        let mut vehicle = test_vehicle();

        vehicle.controls.accelerate = true;
        for _ in 0..100 {
            vehicle.update_kinematics(1.0 / 60.0, anywhere);
            assert!(vehicle.speed <= vehicle.max_speed);
        }

        vehicle.scale_max_speed(1.5);
        for _ in 0..100 {
            vehicle.update_kinematics(1.0 / 60.0, anywhere);
            assert!(vehicle.speed <= vehicle.max_speed);
        }
        assert!(vehicle.speed > vehicle.base_max_speed());

        vehicle.controls.accelerate = false;
        vehicle.controls.brake = true;
        vehicle.restore_max_speed();
        for _ in 0..100 {
            vehicle.update_kinematics(1.0 / 60.0, anywhere);
            assert!(vehicle.speed >= -vehicle.max_speed / 2.0);
        }
        assert!(vehicle.speed < 0.0);
    }

    #[test]
    fn moves_along_heading() {
        let mut vehicle = test_vehicle();
        vehicle.heading = FRAC_PI_2;
        vehicle.speed = 0.5;

        vehicle.update_kinematics(1.0 / 60.0, anywhere);

        assert_relative_eq!(vehicle.position.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(vehicle.position.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(vehicle.speed, 0.49);
    }

    #[test]
    fn time_scaled_mode_uses_frame_length() {
        let pars = VehiclePars {
            kinematics: KinematicsMode::TimeScaled,
            ..VehiclePars::default()
        };
        let mut vehicle = Vehicle::new(&pars, DVec3::ZERO, 0.0);
        vehicle.speed = 5.0;

        vehicle.update_kinematics(0.1, anywhere);

        assert_relative_eq!(vehicle.position.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn drift_doubles_turn_rate_and_keeps_heading_on_release() {
        let mut vehicle = test_vehicle();

        vehicle.controls.turn_left = true;
        vehicle.update_kinematics(1.0 / 60.0, anywhere);
        assert_relative_eq!(vehicle.heading, 0.02);
        assert!(!vehicle.drift);

        vehicle.controls.drift_modifier = true;
        vehicle.update_kinematics(1.0 / 60.0, anywhere);
        assert_relative_eq!(vehicle.heading, 0.06);
        assert!(vehicle.drift);

        vehicle.controls.turn_left = false;
        vehicle.controls.turn_right = true;
        vehicle.controls.drift_modifier = false;
        for _ in 0..10 {
            vehicle.update_kinematics(1.0 / 60.0, anywhere);
        }
        assert!(vehicle.heading > 5.0, "heading must wrap into [0, 2pi)");
    }

    #[test]
    fn boost_scales_speed_and_charge_decays() {
        let mut vehicle = test_vehicle();
        vehicle.speed = 0.2;

        vehicle.boost();
        assert_relative_eq!(vehicle.speed, 0.3);
        assert_eq!(vehicle.boost_charge, 1.0);

        vehicle.speed = 0.5;
        vehicle.boost();
        assert_relative_eq!(vehicle.speed, 0.75);

        // already above the cap
        vehicle.speed = 0.75;
        vehicle.boost();
        assert_relative_eq!(vehicle.speed, 0.75);

        // reversing is scaled as well, only the forward speed is capped
        vehicle.speed = -0.2;
        vehicle.boost();
        assert_relative_eq!(vehicle.speed, -0.3);

        for _ in 0..150 {
            vehicle.update_kinematics(1.0 / 60.0, anywhere);
            assert!(vehicle.boost_charge >= 0.0);
        }
        assert_eq!(vehicle.boost_charge, 0.0);
    }

    #[test]
    fn rejected_position_stops_vehicle() {
        let mut vehicle = test_vehicle();
        vehicle.speed = 0.3;

        let on_track = vehicle.update_kinematics(1.0 / 60.0, |p| p.z < 0.4);
        assert!(on_track);
        assert_relative_eq!(vehicle.position.z, 0.3, epsilon = 1e-12);

        let on_track = vehicle.update_kinematics(1.0 / 60.0, |p| p.z < 0.4);
        assert!(!on_track);
        assert_relative_eq!(vehicle.position.z, 0.3, epsilon = 1e-12);
        assert_eq!(vehicle.speed, 0.0);
    }

    #[test]
    fn reset_restores_start_state() {
        let mut vehicle = test_vehicle();
        vehicle.controls.accelerate = true;
        vehicle.scale_max_speed(1.5);
        vehicle.tint = Tint::Invincible;
        for _ in 0..20 {
            vehicle.update_kinematics(1.0 / 60.0, anywhere);
        }

        vehicle.reset();

        assert_eq!(vehicle.position, DVec3::new(0.0, 0.5, 0.0));
        assert_eq!(vehicle.speed, 0.0);
        assert_eq!(vehicle.max_speed, vehicle.base_max_speed());
        assert_eq!(vehicle.tint, Tint::Base);
        assert_eq!(vehicle.controls, ControlFlags::default());
    }
}
