use crate::core::checkpoints::{CheckpointRearm, CheckpointSequencer};
use crate::core::collectibles::{CollectibleKind, CollectibleRegistry, EffectType};
use crate::core::controls::ControlEvent;
use crate::core::effects::{Ability, EffectTimers, TimedEffect};
use crate::core::track::{Track, TrackPars};
use crate::core::vehicle::{Tint, Vehicle, VehiclePars};
use crate::interfaces::gui_interface::{
    CheckpointView, CollectibleView, GameSnapshot, RgbColor, RESULT_DISPLAY_DURATION,
};
use crate::post::race_result::RaceResult;
use rand::Rng;
use serde::Deserialize;

/// * `tot_no_laps` - Number of laps after which the race is complete
/// * `pickup_radius` - Distance below which a collectible is picked up
/// * `catch_radius` - Radius in which the Catch item consumes available items
/// * `speed_factor` - Maximum speed multiplier of the Speed power-up
/// * `boost_item_factor` - Speed multiplier (and cap relative to the maximum speed) of the Boost
/// item
/// * `t_speed` - (s) Duration of the Speed power-up
/// * `t_invincibility` - (s) Duration of the Invincibility power-up
/// * `t_attack` - (s) Duration of the Attack power-up
/// * `attack_cooldown` - (s) Cooldown set when an attack is triggered
/// * `checkpoint_rearm` - Policy for making passed checkpoints passable again
#[derive(Debug, Deserialize, Clone)]
pub struct RacePars {
    #[serde(default = "default_tot_no_laps")]
    pub tot_no_laps: u32,
    #[serde(default = "default_pickup_radius")]
    pub pickup_radius: f64,
    #[serde(default = "default_catch_radius")]
    pub catch_radius: f64,
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,
    #[serde(default = "default_boost_item_factor")]
    pub boost_item_factor: f64,
    #[serde(default = "default_t_speed")]
    pub t_speed: f64,
    #[serde(default = "default_t_invincibility")]
    pub t_invincibility: f64,
    #[serde(default = "default_t_attack")]
    pub t_attack: f64,
    #[serde(default = "default_attack_cooldown")]
    pub attack_cooldown: f64,
    #[serde(default)]
    pub checkpoint_rearm: CheckpointRearm,
}

fn default_tot_no_laps() -> u32 {
    3
}

fn default_pickup_radius() -> f64 {
    2.0
}

fn default_catch_radius() -> f64 {
    5.0
}

fn default_speed_factor() -> f64 {
    1.5
}

fn default_boost_item_factor() -> f64 {
    2.0
}

fn default_t_speed() -> f64 {
    5.0
}

fn default_t_invincibility() -> f64 {
    8.0
}

fn default_t_attack() -> f64 {
    3.0
}

fn default_attack_cooldown() -> f64 {
    5.0
}

impl Default for RacePars {
    fn default() -> Self {
        RacePars {
            tot_no_laps: default_tot_no_laps(),
            pickup_radius: default_pickup_radius(),
            catch_radius: default_catch_radius(),
            speed_factor: default_speed_factor(),
            boost_item_factor: default_boost_item_factor(),
            t_speed: default_t_speed(),
            t_invincibility: default_t_invincibility(),
            t_attack: default_t_attack(),
            attack_cooldown: default_attack_cooldown(),
            checkpoint_rearm: CheckpointRearm::default(),
        }
    }
}

/// GameEvent is emitted by the race during a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    CheckpointPassed(usize),
    LapCompleted { lap: u32, laptime: f64 },
    RaceComplete(RaceResult),
    PowerUpCollected(EffectType),
    ItemCollected(EffectType),
    EffectApplied(EffectType),
    AttackRefused,
    ItemsCaught(usize),
    EffectReverted(TimedEffect),
    OffTrack,
    Reset,
}

/// HeldCollectible references the collectible the player currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldCollectible {
    pub id: u32,
    pub effect_type: EffectType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PovMode {
    ThirdPerson,
    FirstPerson,
}

impl Default for PovMode {
    fn default() -> Self {
        PovMode::ThirdPerson
    }
}

impl PovMode {
    pub fn toggled(&self) -> PovMode {
        match self {
            PovMode::ThirdPerson => PovMode::FirstPerson,
            PovMode::FirstPerson => PovMode::ThirdPerson,
        }
    }
}

#[derive(Debug)]
pub struct Race {
    pub cur_racetime: f64,
    last_frame_duration: f64,
    pub tot_no_laps: u32,
    pub lap_count: u32,
    pub track: Track,
    pub vehicle: Vehicle,
    pub power_ups: CollectibleRegistry,
    pub items: CollectibleRegistry,
    pub checkpoints: CheckpointSequencer,
    pub ability: Ability,
    pub held_power_up: Option<HeldCollectible>,
    pub held_item: Option<HeldCollectible>,
    pub pov: PovMode,
    timers: EffectTimers,
    pending_controls: Vec<ControlEvent>,
    race_pars: RacePars,
    base_color: RgbColor,
    invincible_color: RgbColor,
    t_lap_start: f64,
    laptimes: Vec<f64>,
    racetimes: Vec<f64>,
    t_race_start: f64,
    power_ups_used: u32,
    items_used: u32,
    last_result: Option<RaceResult>,
    t_last_finish: f64,
}

impl Race {
    /// new sets up the track, the kart and the collectible registries. The effect types of the
    /// collectibles are rolled once with the inserted random number generator.
    pub fn new<R: Rng + ?Sized>(
        race_pars: &RacePars,
        track_pars: &TrackPars,
        vehicle_pars: &VehiclePars,
        rng: &mut R,
    ) -> anyhow::Result<Race> {
        let track = Track::new(track_pars);
        let vehicle = Vehicle::new(vehicle_pars, track.start_position, track.start_heading);

        let power_ups = CollectibleRegistry::new(
            CollectibleKind::PowerUp,
            &track.power_up_spawns,
            0,
            &mut *rng,
        );
        let items = CollectibleRegistry::new(
            CollectibleKind::Item,
            &track.item_spawns,
            track.power_up_spawns.len() as u32,
            rng,
        );
        let checkpoints = CheckpointSequencer::new(
            &track.checkpoints,
            track.checkpoint_radius,
            race_pars.checkpoint_rearm,
        );

        Ok(Race {
            cur_racetime: 0.0,
            last_frame_duration: 0.0,
            tot_no_laps: race_pars.tot_no_laps,
            lap_count: 0,
            track,
            vehicle,
            power_ups,
            items,
            checkpoints,
            ability: Ability::default(),
            held_power_up: None,
            held_item: None,
            pov: PovMode::default(),
            timers: EffectTimers::default(),
            pending_controls: vec![],
            race_pars: race_pars.to_owned(),
            base_color: RgbColor::from_css(&vehicle_pars.color)?,
            invincible_color: RgbColor::from_css(&vehicle_pars.invincible_color)?,
            t_lap_start: 0.0,
            laptimes: vec![],
            racetimes: vec![],
            t_race_start: 0.0,
            power_ups_used: 0,
            items_used: 0,
            last_result: None,
            t_last_finish: f64::NEG_INFINITY,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// simulate_frame advances the race by one frame of length `dt` (s) and returns the events
    /// that occurred during the frame.
    pub fn simulate_frame(&mut self, dt: f64) -> Vec<GameEvent> {
        let mut events = vec![];

        // increment discretization variable and revert expired effects
        self.cur_racetime += dt;
        self.last_frame_duration = dt;
        self.revert_due_effects(&mut events);

        // apply inputs queued since the last frame
        let pending_controls: Vec<ControlEvent> = self.pending_controls.drain(..).collect();
        for event in pending_controls {
            events.extend(self.handle_control(event));
        }

        // move kart
        let track = &self.track;
        if !self
            .vehicle
            .update_kinematics(dt, |position| track.is_on_track(position))
        {
            events.push(GameEvent::OffTrack);
        }

        // proximity checks
        self.check_collectibles(&mut events);
        self.check_checkpoints(&mut events);

        events
    }

    // ---------------------------------------------------------------------------------------------
    // CONTROLS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// queue_control stores a control event that is applied at the beginning of the next frame.
    pub fn queue_control(&mut self, event: ControlEvent) {
        self.pending_controls.push(event);
    }

    /// handle_control applies a control event immediately.
    pub fn handle_control(&mut self, event: ControlEvent) -> Vec<GameEvent> {
        match event {
            ControlEvent::Boost => {
                self.vehicle.boost();
                vec![]
            }
            ControlEvent::UsePowerUp => self.use_power_up(),
            ControlEvent::UseItem => self.use_item(),
            ControlEvent::TogglePov => {
                self.pov = self.pov.toggled();
                vec![]
            }
            held => {
                self.vehicle.controls.set(held);

                // drift ends with the modifier or when no turn is held anymore
                if matches!(held, ControlEvent::DriftModifier(false))
                    || !self.vehicle.controls.is_turning()
                {
                    self.vehicle.drift = false;
                }
                vec![]
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // EFFECTS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// use_power_up applies the held power-up. The held power-up is consumed also if the effect
    /// cannot be applied.
    pub fn use_power_up(&mut self) -> Vec<GameEvent> {
        let held = match self.held_power_up.take() {
            Some(held) => held,
            None => return vec![],
        };
        self.power_ups_used += 1;

        let t_cur = self.cur_racetime;

        match held.effect_type {
            EffectType::Speed => {
                // multiplier is applied to the base value, i.e. re-triggering does not compound
                self.vehicle.scale_max_speed(self.race_pars.speed_factor);
                self.timers
                    .schedule(TimedEffect::Speed, t_cur + self.race_pars.t_speed);
            }
            EffectType::Invincibility => {
                self.vehicle.tint = Tint::Invincible;
                self.timers.schedule(
                    TimedEffect::Invincibility,
                    t_cur + self.race_pars.t_invincibility,
                );
            }
            EffectType::Attack => {
                if !self.ability.trigger(self.race_pars.attack_cooldown) {
                    log::debug!("Attack refused, ability is cooling down");
                    return vec![GameEvent::AttackRefused];
                }
                self.timers
                    .schedule(TimedEffect::Attack, t_cur + self.race_pars.t_attack);
            }
            EffectType::Catch | EffectType::Heal | EffectType::Boost => {
                log::warn!("Held power-up has item effect {:?}", held.effect_type);
                return vec![];
            }
        }

        log::debug!("Used power-up {}", held.effect_type.label());
        vec![GameEvent::EffectApplied(held.effect_type)]
    }

    /// use_item applies the held item and consumes it.
    pub fn use_item(&mut self) -> Vec<GameEvent> {
        let held = match self.held_item.take() {
            Some(held) => held,
            None => return vec![],
        };
        self.items_used += 1;

        let mut events = vec![];

        match held.effect_type {
            EffectType::Catch => {
                let no_caught = self
                    .items
                    .catch_within(self.vehicle.position, self.race_pars.catch_radius);
                events.push(GameEvent::ItemsCaught(no_caught));
            }
            EffectType::Heal => {
                self.vehicle.boost_charge = 1.0;
            }
            EffectType::Boost => {
                let factor = self.race_pars.boost_item_factor;
                let max_speed = self.vehicle.max_speed;
                self.vehicle.speed = (self.vehicle.speed * factor).min(max_speed * factor);
            }
            EffectType::Speed | EffectType::Invincibility | EffectType::Attack => {
                log::warn!("Held item has power-up effect {:?}", held.effect_type);
                return events;
            }
        }

        log::debug!("Used item {}", held.effect_type.label());
        events.insert(0, GameEvent::EffectApplied(held.effect_type));
        events
    }

    fn revert_due_effects(&mut self, events: &mut Vec<GameEvent>) {
        for effect in self.timers.take_due(self.cur_racetime) {
            match effect {
                TimedEffect::Speed => self.vehicle.restore_max_speed(),
                TimedEffect::Invincibility => self.vehicle.tint = Tint::Base,
                TimedEffect::Attack => self.ability.clear(),
            }
            log::debug!("Effect {:?} reverted at {:.3}s", effect, self.cur_racetime);
            events.push(GameEvent::EffectReverted(effect));
        }
    }

    /// get_effect_remaining returns the time left until the timed effect is reverted.
    pub fn get_effect_remaining(&self, effect: TimedEffect) -> Option<f64> {
        self.timers.remaining(effect, self.cur_racetime)
    }

    // ---------------------------------------------------------------------------------------------
    // PROXIMITY CHECKS ----------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn check_collectibles(&mut self, events: &mut Vec<GameEvent>) {
        let position = self.vehicle.position;
        let radius = self.race_pars.pickup_radius;

        // a newly picked up collectible replaces the held one without applying it
        for idx in self.power_ups.check_proximity(position, radius) {
            if let Some(collectible) = self.power_ups.get(idx) {
                log::debug!("Picked up power-up {}", collectible.effect_type.label());
                self.held_power_up = Some(HeldCollectible {
                    id: collectible.id,
                    effect_type: collectible.effect_type,
                });
                events.push(GameEvent::PowerUpCollected(collectible.effect_type));
            }
        }

        for idx in self.items.check_proximity(position, radius) {
            if let Some(collectible) = self.items.get(idx) {
                log::debug!("Picked up item {}", collectible.effect_type.label());
                self.held_item = Some(HeldCollectible {
                    id: collectible.id,
                    effect_type: collectible.effect_type,
                });
                events.push(GameEvent::ItemCollected(collectible.effect_type));
            }
        }
    }

    fn check_checkpoints(&mut self, events: &mut Vec<GameEvent>) {
        for pass in self.checkpoints.check_proximity(self.vehicle.position) {
            log::debug!("Passed checkpoint {}", pass.index);
            events.push(GameEvent::CheckpointPassed(pass.index));

            if !pass.lap_completed {
                continue;
            }

            self.lap_count += 1;
            let laptime = self.cur_racetime - self.t_lap_start;
            self.t_lap_start = self.cur_racetime;
            self.laptimes.push(laptime);
            self.racetimes.push(self.cur_racetime - self.t_race_start);

            log::info!("Lap {} completed in {:.3}s", self.lap_count, laptime);
            events.push(GameEvent::LapCompleted {
                lap: self.lap_count,
                laptime,
            });

            if self.lap_count >= self.tot_no_laps {
                let result = self.get_race_result();
                log::info!(
                    "Race completed in {:.3}s",
                    result.get_racetime().unwrap_or_default()
                );
                self.last_result = Some(result.clone());
                self.t_last_finish = self.cur_racetime;
                events.push(GameEvent::RaceComplete(result));

                self.reset();
                events.push(GameEvent::Reset);
                break;
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // RESET ---------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// reset restores the start state of the race. Collectible effect types are kept and the
    /// simulated time continues.
    pub fn reset(&mut self) {
        self.lap_count = 0;
        self.checkpoints.reset();
        self.vehicle.reset();
        self.power_ups.reset();
        self.items.reset();
        self.held_power_up = None;
        self.held_item = None;
        self.ability.clear();
        self.timers.cancel_all();
        self.pending_controls.clear();
        self.t_lap_start = self.cur_racetime;
        self.t_race_start = self.cur_racetime;
        self.laptimes.clear();
        self.racetimes.clear();
        self.power_ups_used = 0;
        self.items_used = 0;
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn get_last_frame_duration(&self) -> f64 {
        self.last_frame_duration
    }

    pub fn get_display_lap(&self) -> u32 {
        self.lap_count + 1
    }

    pub fn get_speed_display(&self) -> i64 {
        (self.vehicle.speed.abs() * 100.0).round() as i64
    }

    pub fn get_boost_display(&self) -> i64 {
        (self.vehicle.boost_charge * 100.0).round() as i64
    }

    pub fn get_color(&self) -> RgbColor {
        match self.vehicle.tint {
            Tint::Base => self.base_color,
            Tint::Invincible => self.invincible_color,
        }
    }

    pub fn get_last_result(&self) -> Option<&RaceResult> {
        self.last_result.as_ref()
    }

    /// get_race_result returns the result of the current race, i.e. the laps completed since the
    /// last reset.
    pub fn get_race_result(&self) -> RaceResult {
        RaceResult {
            track_name: self.track.name.to_owned(),
            tot_no_laps: self.tot_no_laps,
            laptimes: self.laptimes.to_owned(),
            racetimes: self.racetimes.to_owned(),
            completed: self.lap_count >= self.tot_no_laps,
            power_ups_used: self.power_ups_used,
            items_used: self.items_used,
        }
    }

    pub fn get_game_snapshot(&self) -> GameSnapshot {
        let checkpoints = self
            .checkpoints
            .checkpoints()
            .iter()
            .map(|checkpoint| CheckpointView {
                index: checkpoint.index,
                position: checkpoint.position,
                radius: checkpoint.radius,
                passed: checkpoint.passed,
            })
            .collect();

        let collectibles = self
            .power_ups
            .collectibles()
            .iter()
            .chain(self.items.collectibles())
            .map(|collectible| CollectibleView {
                id: collectible.id,
                kind: collectible.kind,
                label: collectible.effect_type.label(),
                position: collectible.position,
                available: collectible.is_available(),
            })
            .collect();

        GameSnapshot {
            position: self.vehicle.position,
            heading: self.vehicle.heading,
            display_lap: self.get_display_lap(),
            tot_no_laps: self.tot_no_laps,
            speed_display: self.get_speed_display(),
            boost_display: self.get_boost_display(),
            held_power_up: self.held_power_up.map(|held| held.effect_type.label()),
            held_item: self.held_item.map(|held| held.effect_type.label()),
            checkpoints,
            collectibles,
            color: self.get_color(),
            attacking: self.ability.attacking,
            attack_cooldown: self.ability.cooldown,
            pov: self.pov,
            drift: self.vehicle.drift,
            speed_remaining: self.get_effect_remaining(TimedEffect::Speed),
            invincibility_remaining: self.get_effect_remaining(TimedEffect::Invincibility),
            cur_racetime: self.cur_racetime,
            last_result: self
                .last_result
                .as_ref()
                .filter(|_| self.cur_racetime - self.t_last_finish < RESULT_DISPLAY_DURATION)
                .cloned(),
        }
    }
}
