use glam::DVec3;
use serde::Deserialize;

/// CheckpointRearm determines when passed checkpoints become passable again.
/// * `Never` - Passed flags are only cleared by a full reset
/// * `Next` - Passing checkpoint i re-arms checkpoint (i + 1) % n, i.e. a checkpoint can only be
/// passed again after its predecessor
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointRearm {
    Never,
    Next,
}

impl Default for CheckpointRearm {
    fn default() -> Self {
        CheckpointRearm::Next
    }
}

#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub index: usize,
    pub position: DVec3,
    pub radius: f64,
    pub passed: bool,
}

/// CheckpointPass is reported for every checkpoint entered during a proximity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointPass {
    pub index: usize,
    pub lap_completed: bool,
}

#[derive(Debug, Clone)]
pub struct CheckpointSequencer {
    checkpoints: Vec<Checkpoint>,
    rearm: CheckpointRearm,
    last_checkpoint: Option<usize>,
}

impl CheckpointSequencer {
    pub fn new(positions: &[DVec3], radius: f64, rearm: CheckpointRearm) -> CheckpointSequencer {
        let checkpoints = positions
            .iter()
            .enumerate()
            .map(|(index, &position)| Checkpoint {
                index,
                position,
                radius,
                passed: false,
            })
            .collect();

        CheckpointSequencer {
            checkpoints,
            rearm,
            last_checkpoint: None,
        }
    }

    /// check_proximity marks every not yet passed checkpoint whose center is closer than its
    /// radius as passed. A lap is completed when checkpoint 0 is passed directly after the last
    /// checkpoint. The last checkpoint index is updated on every pass without checking the order.
    pub fn check_proximity(&mut self, position: DVec3) -> Vec<CheckpointPass> {
        let no_checkpoints = self.checkpoints.len();
        let mut passes = vec![];

        for idx in 0..no_checkpoints {
            let checkpoint = &mut self.checkpoints[idx];

            if checkpoint.passed || checkpoint.position.distance(position) >= checkpoint.radius {
                continue;
            }

            checkpoint.passed = true;

            let lap_completed = idx == 0 && self.last_checkpoint == Some(no_checkpoints - 1);
            self.last_checkpoint = Some(idx);

            if self.rearm == CheckpointRearm::Next {
                self.checkpoints[(idx + 1) % no_checkpoints].passed = false;
            }

            passes.push(CheckpointPass {
                index: idx,
                lap_completed,
            });
        }

        passes
    }

    pub fn last_checkpoint(&self) -> Option<usize> {
        self.last_checkpoint
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn reset(&mut self) {
        self.last_checkpoint = None;
        self.checkpoints
            .iter_mut()
            .for_each(|checkpoint| checkpoint.passed = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(rearm: CheckpointRearm) -> CheckpointSequencer {
        let positions = [
            DVec3::new(0.0, 0.2, 0.0),
            DVec3::new(20.0, 0.2, 0.0),
            DVec3::new(20.0, 0.2, 20.0),
            DVec3::new(0.0, 0.2, 20.0),
        ];
        CheckpointSequencer::new(&positions, 2.0, rearm)
    }

    fn drive_lap(sequencer: &mut CheckpointSequencer) -> Vec<CheckpointPass> {
        let mut passes = vec![];
        for idx in [1, 2, 3, 0] {
            let position = sequencer.checkpoints()[idx].position;
            passes.extend(sequencer.check_proximity(position));
        }
        passes
    }

    #[test]
    fn empty_sequencer_is_noop() {
        let mut sequencer = CheckpointSequencer::new(&[], 2.0, CheckpointRearm::Next);
        assert!(sequencer.check_proximity(DVec3::ZERO).is_empty());
        assert!(sequencer.is_empty());
        assert_eq!(sequencer.last_checkpoint(), None);
    }

    #[test]
    fn first_pass_of_checkpoint_0_is_no_lap() {
        let mut sequencer = square(CheckpointRearm::Next);

        let passes = sequencer.check_proximity(DVec3::new(0.5, 0.5, 0.5));

        assert_eq!(
            passes,
            vec![CheckpointPass {
                index: 0,
                lap_completed: false
            }]
        );
        assert_eq!(sequencer.last_checkpoint(), Some(0));
    }

    #[test]
    fn radius_is_exclusive() {
        let mut sequencer = square(CheckpointRearm::Next);
        assert!(sequencer
            .check_proximity(DVec3::new(22.0, 0.2, 0.0))
            .is_empty());
        assert_eq!(sequencer.check_proximity(DVec3::new(21.9, 0.2, 0.0)).len(), 1);
    }

    #[test]
    fn passed_checkpoint_does_not_fire_again() {
        let mut sequencer = square(CheckpointRearm::Next);
        let position = sequencer.checkpoints()[2].position;

        assert_eq!(sequencer.check_proximity(position).len(), 1);
        assert!(sequencer.check_proximity(position).is_empty());
    }

    #[test]
    fn laps_repeat_with_next_rearm() {
        let mut sequencer = square(CheckpointRearm::Next);

        for _ in 0..3 {
            let passes = drive_lap(&mut sequencer);
            assert_eq!(passes.len(), 4);
            assert!(passes[3].lap_completed);
            assert_eq!(passes.iter().filter(|pass| pass.lap_completed).count(), 1);
        }
    }

    #[test]
    fn last_checkpoint_is_blocked_after_lap() {
        let mut sequencer = square(CheckpointRearm::Next);
        drive_lap(&mut sequencer);

        // the last checkpoint stays passed until checkpoint 2 is passed again
        let position = sequencer.checkpoints()[3].position;
        assert!(sequencer.check_proximity(position).is_empty());
        assert_eq!(sequencer.last_checkpoint(), Some(0));

        // touching checkpoint 0 again does not count a lap
        assert!(sequencer
            .check_proximity(DVec3::new(0.0, 0.2, 0.0))
            .is_empty());
    }

    #[test]
    fn never_rearm_completes_at_most_one_lap() {
        let mut sequencer = square(CheckpointRearm::Never);
        sequencer.check_proximity(DVec3::new(0.0, 0.2, 0.0));

        let first = drive_lap(&mut sequencer);
        assert!(first.iter().all(|pass| !pass.lap_completed));
        assert_eq!(first.len(), 3);

        assert!(drive_lap(&mut sequencer).is_empty());

        sequencer.reset();
        assert!(sequencer.checkpoints().iter().all(|cp| !cp.passed));
        assert_eq!(sequencer.last_checkpoint(), None);
    }

    #[test]
    fn last_checkpoint_is_not_order_validated() {
        let mut sequencer = square(CheckpointRearm::Next);
        let position = sequencer.checkpoints()[3].position;
        sequencer.check_proximity(position);

        let passes = sequencer.check_proximity(DVec3::new(0.0, 0.2, 0.0));

        // driving straight from the last checkpoint to checkpoint 0 counts as a lap
        assert!(passes[0].lap_completed);
    }
}
