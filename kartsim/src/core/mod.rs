pub mod autopilot;
pub mod checkpoints;
pub mod collectibles;
pub mod controls;
pub mod effects;
pub mod handle_race;
pub mod race;
pub mod track;
pub mod vehicle;
