use crate::core::collectibles::CollectibleKind;
use crate::core::race::PovMode;
use crate::post::race_result::RaceResult;
use anyhow::Context;
use glam::DVec3;

pub const MAX_GUI_UPDATE_FREQUENCY: f64 = 30.0;

/// (s) Simulated time the result of a finished race stays in the snapshot.
pub const RESULT_DISPLAY_DURATION: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// from_css parses a CSS color string (e.g. "#ff0000" or "red").
    pub fn from_css(color: &str) -> anyhow::Result<RgbColor> {
        let tmp_color = color
            .parse::<css_color_parser::Color>()
            .context(format!("Could not parse color {}!", color))?;

        Ok(RgbColor {
            r: tmp_color.r,
            g: tmp_color.g,
            b: tmp_color.b,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CheckpointView {
    pub index: usize,
    pub position: DVec3,
    pub radius: f64,
    pub passed: bool,
}

#[derive(Debug, Clone)]
pub struct CollectibleView {
    pub id: u32,
    pub kind: CollectibleKind,
    pub label: &'static str,
    pub position: DVec3,
    pub available: bool,
}

/// GameSnapshot is the read-only state handed to the presentation layer after a frame.
/// * `display_lap` - Current lap as shown to the player (completed laps + 1)
/// * `speed_display` - round(|speed| * 100)
/// * `boost_display` - round(boost charge * 100)
/// * `attack_cooldown` - (s) Cooldown set by the last attack, 0 if the ability is ready
/// * `speed_remaining` - (s) Time until the Speed power-up is reverted, None if not active
/// * `invincibility_remaining` - (s) Time until the Invincibility power-up is reverted, None if
/// not active
/// * `last_result` - Result of the last completed race during the first RESULT_DISPLAY_DURATION
/// seconds after its finish
#[derive(Debug, Clone, Default)]
pub struct GameSnapshot {
    pub position: DVec3,
    pub heading: f64,
    pub display_lap: u32,
    pub tot_no_laps: u32,
    pub speed_display: i64,
    pub boost_display: i64,
    pub held_power_up: Option<&'static str>,
    pub held_item: Option<&'static str>,
    pub checkpoints: Vec<CheckpointView>,
    pub collectibles: Vec<CollectibleView>,
    pub color: RgbColor,
    pub attacking: bool,
    pub attack_cooldown: f64,
    pub pov: PovMode,
    pub drift: bool,
    pub speed_remaining: Option<f64>,
    pub invincibility_remaining: Option<f64>,
    pub cur_racetime: f64,
    pub last_result: Option<RaceResult>,
}
