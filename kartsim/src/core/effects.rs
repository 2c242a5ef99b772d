/// Tolerance used when comparing simulated times, which accumulate floating point errors.
const T_EPS: f64 = 1e-9;

/// TimedEffect lists the effects that are reverted after a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedEffect {
    Speed,
    Invincibility,
    Attack,
}

impl TimedEffect {
    fn slot(&self) -> usize {
        match self {
            TimedEffect::Speed => 0,
            TimedEffect::Invincibility => 1,
            TimedEffect::Attack => 2,
        }
    }

    const ALL: [TimedEffect; 3] = [
        TimedEffect::Speed,
        TimedEffect::Invincibility,
        TimedEffect::Attack,
    ];
}

/// EffectTimers holds one cancellable revert deadline (simulated time in s) per timed effect.
/// Scheduling an effect that is already pending replaces its deadline.
#[derive(Debug, Clone, Default)]
pub struct EffectTimers {
    deadlines: [Option<f64>; 3],
}

impl EffectTimers {
    pub fn schedule(&mut self, effect: TimedEffect, t_revert: f64) {
        self.deadlines[effect.slot()] = Some(t_revert);
    }

    /// remaining returns the time left until the revert of the effect or None if it is not
    /// pending.
    pub fn remaining(&self, effect: TimedEffect, cur_time: f64) -> Option<f64> {
        self.deadlines[effect.slot()].map(|t_revert| (t_revert - cur_time).max(0.0))
    }

    /// take_due removes and returns all effects whose deadline is reached at `cur_time`.
    pub fn take_due(&mut self, cur_time: f64) -> Vec<TimedEffect> {
        let mut due = vec![];

        for effect in TimedEffect::ALL {
            let slot = &mut self.deadlines[effect.slot()];
            if matches!(*slot, Some(t_revert) if t_revert <= cur_time + T_EPS) {
                *slot = None;
                due.push(effect);
            }
        }

        due
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 3];
    }
}

/// Ability is the companion attack ability. It can only be triggered while no cooldown is set.
/// * `cooldown` - (s) Cooldown set when the attack is triggered, cleared when the attack ends
/// * `attacking` - Attack indicator
#[derive(Debug, Clone, Default)]
pub struct Ability {
    pub cooldown: f64,
    pub attacking: bool,
}

impl Ability {
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// trigger starts an attack if the ability is ready. Returns false if it is still cooling
    /// down.
    pub fn trigger(&mut self, cooldown: f64) -> bool {
        if !self.is_ready() {
            return false;
        }

        self.cooldown = cooldown;
        self.attacking = true;
        true
    }

    pub fn clear(&mut self) {
        self.cooldown = 0.0;
        self.attacking = false;
    }
}
