use crate::core::controls::{ControlEvent, ControlFlags};
use crate::core::race::Race;
use crate::core::vehicle::KinematicsMode;
use helpers::general::angle_diff;

/// (rad) Heading error below which the autopilot does not steer.
const STEER_TOLERANCE: f64 = 0.02;
/// (rad) Heading error below which the autopilot drives at full speed.
const STRAIGHT_TOLERANCE: f64 = 0.1;
/// (rad) Heading error above which the autopilot drifts.
const DRIFT_THRESHOLD: f64 = 0.5;
/// Ratio between the distance to the target and the turning radius the autopilot accepts.
const TURN_RADIUS_MARGIN: f64 = 2.5;

/// Autopilot drives the kart towards the next checkpoint by emitting the same control events a
/// player would. Only changes of the held controls are emitted.
/// * `use_collectibles` - Use held power-ups and items as soon as they are picked up
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    pub use_collectibles: bool,
    flags: ControlFlags,
}

impl Autopilot {
    pub fn new(use_collectibles: bool) -> Autopilot {
        Autopilot {
            use_collectibles,
            flags: ControlFlags::default(),
        }
    }

    /// get_target_checkpoint returns the index of the checkpoint the autopilot is heading for.
    pub fn get_target_checkpoint(race: &Race) -> Option<usize> {
        let no_checkpoints = race.checkpoints.len();
        if no_checkpoints == 0 {
            return None;
        }

        Some(
            race.checkpoints
                .last_checkpoint()
                .map(|idx| (idx + 1) % no_checkpoints)
                .unwrap_or(0),
        )
    }

    /// get_controls determines the control events for the next frame.
    pub fn get_controls(&mut self, race: &Race) -> Vec<ControlEvent> {
        let mut events = vec![];

        if self.use_collectibles {
            if race.held_power_up.is_some() {
                events.push(ControlEvent::UsePowerUp);
            }
            if race.held_item.is_some() {
                events.push(ControlEvent::UseItem);
            }
        }

        let target = match Self::get_target_checkpoint(race) {
            Some(idx) => race.checkpoints.checkpoints()[idx].position,
            None => {
                events.extend(self.update_flags(ControlFlags::default()));
                return events;
            }
        };

        let vehicle = &race.vehicle;
        let delta = target - vehicle.position;
        let dist = delta.x.hypot(delta.z);
        let err = angle_diff(delta.x.atan2(delta.z), vehicle.heading);

        let drift = err.abs() > DRIFT_THRESHOLD;
        let turn_rate = if drift {
            2.0 * vehicle.turn_speed()
        } else {
            vehicle.turn_speed()
        };

        // limit the speed such that the turning radius fits the remaining distance
        let step_scale = match vehicle.kinematics() {
            KinematicsMode::PerTick => 1.0,
            KinematicsMode::TimeScaled => race.get_last_frame_duration().max(f64::EPSILON),
        };
        let v_target = if err.abs() < STRAIGHT_TOLERANCE {
            vehicle.max_speed
        } else {
            (turn_rate * dist / (TURN_RADIUS_MARGIN * step_scale)).min(vehicle.max_speed)
        };

        let acc = vehicle.acceleration();
        let desired = ControlFlags {
            accelerate: v_target >= vehicle.max_speed || vehicle.speed + acc / 2.0 <= v_target,
            brake: vehicle.speed >= acc && vehicle.speed > 1.5 * v_target,
            turn_left: err > STEER_TOLERANCE,
            turn_right: err < -STEER_TOLERANCE,
            drift_modifier: drift,
        };

        events.extend(self.update_flags(desired));
        events
    }

    fn update_flags(&mut self, desired: ControlFlags) -> Vec<ControlEvent> {
        let mut events = vec![];

        if desired.accelerate != self.flags.accelerate {
            events.push(ControlEvent::Accelerate(desired.accelerate));
        }
        if desired.brake != self.flags.brake {
            events.push(ControlEvent::Brake(desired.brake));
        }
        if desired.turn_left != self.flags.turn_left {
            events.push(ControlEvent::TurnLeft(desired.turn_left));
        }
        if desired.turn_right != self.flags.turn_right {
            events.push(ControlEvent::TurnRight(desired.turn_right));
        }
        if desired.drift_modifier != self.flags.drift_modifier {
            events.push(ControlEvent::DriftModifier(desired.drift_modifier));
        }

        self.flags = desired;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::{GameEvent, RacePars};
    use crate::core::track::TrackPars;
    use crate::core::vehicle::VehiclePars;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f64 = 1.0 / 60.0;

    fn builtin_race() -> Race {
        let mut rng = StdRng::seed_from_u64(5);
        Race::new(
            &RacePars::default(),
            &TrackPars::default(),
            &VehiclePars::default(),
            &mut rng,
        )
        .unwrap()
    }

    fn drive(race: &mut Race, autopilot: &mut Autopilot, no_frames: usize) -> Vec<GameEvent> {
        let mut events = vec![];
        for _ in 0..no_frames {
            for control in autopilot.get_controls(race) {
                race.queue_control(control);
            }
            let frame_events = race.simulate_frame(DT);
            let complete = frame_events
                .iter()
                .any(|event| matches!(event, GameEvent::RaceComplete(_)));
            events.extend(frame_events);
            if complete {
                break;
            }
        }
        events
    }

    #[test]
    fn emits_only_changes() {
        let race = builtin_race();
        let mut autopilot = Autopilot::new(false);

        let first = autopilot.get_controls(&race);
        assert!(first.contains(&ControlEvent::Accelerate(true)));
        assert!(first.contains(&ControlEvent::TurnRight(true)));

        assert!(autopilot.get_controls(&race).is_empty());
    }

    #[test]
    fn targets_checkpoint_after_last_one() {
        let mut race = builtin_race();
        assert_eq!(Autopilot::get_target_checkpoint(&race), Some(0));

        race.vehicle.position = race.checkpoints.checkpoints()[4].position;
        race.simulate_frame(DT);

        assert_eq!(Autopilot::get_target_checkpoint(&race), Some(5));
    }

    #[test]
    fn reaches_checkpoint_0_from_start() {
        let mut race = builtin_race();
        let mut autopilot = Autopilot::new(false);

        let events = drive(&mut race, &mut autopilot, 1500);

        assert!(events.contains(&GameEvent::CheckpointPassed(0)));
    }

    #[test]
    fn completes_race_on_builtin_circuit() {
        let mut race = builtin_race();
        let mut autopilot = Autopilot::new(false);

        let events = drive(&mut race, &mut autopilot, 20000);

        let result = events
            .iter()
            .find_map(|event| match event {
                GameEvent::RaceComplete(result) => Some(result),
                _ => None,
            })
            .expect("autopilot must finish the race");
        assert_eq!(result.laptimes.len(), 3);
        assert!(result.completed);
    }

    #[test]
    fn uses_held_collectibles() {
        let mut race = builtin_race();
        race.held_item = Some(crate::core::race::HeldCollectible {
            id: 4,
            effect_type: crate::core::collectibles::EffectType::Heal,
        });
        let mut autopilot = Autopilot::new(true);

        let events = autopilot.get_controls(&race);

        assert_eq!(events[0], ControlEvent::UseItem);
    }
}
