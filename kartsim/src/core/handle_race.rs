use crate::core::autopilot::Autopilot;
use crate::core::controls::ControlEvent;
use crate::core::race::{GameEvent, Race};
use crate::interfaces::gui_interface::{GameSnapshot, MAX_GUI_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use crate::post::telemetry::{TelemetryRecord, TelemetryWriter};
use crate::pre::read_sim_pars::SimPars;
use crate::pre::sim_opts::SimOpts;
use flume::{Receiver, Sender, TryRecvError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// GuiLink connects the real-time race loop with the GUI thread: snapshots go to the GUI, control
/// events come back.
#[derive(Debug, Clone)]
pub struct GuiLink {
    pub tx: Sender<GameSnapshot>,
    pub rx: Receiver<ControlEvent>,
}

/// create_race sets up a race from the parameters. Without a seed a random one is drawn and
/// logged such that the collectible layout can be reproduced.
pub fn create_race(sim_pars: &SimPars, seed: Option<u64>) -> anyhow::Result<Race> {
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("Using seed {} for the collectible effect types", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    Race::new(
        &sim_pars.race_pars,
        &sim_pars.track_pars,
        &sim_pars.vehicle_pars,
        &mut rng,
    )
}

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing. Without a GUI link the kart is driven by the autopilot as fast
/// as possible, otherwise the race runs in real-time with the controls received from the GUI
/// until the GUI is closed.
pub fn handle_race(
    sim_pars: &SimPars,
    sim_opts: &SimOpts,
    gui_link: Option<&GuiLink>,
) -> anyhow::Result<RaceResult> {
    sim_opts.validate()?;
    let race = create_race(sim_pars, sim_opts.seed)?;

    match gui_link {
        None => handle_race_headless(race, sim_opts),
        Some(gui_link) => handle_race_realtime(race, sim_opts, gui_link),
    }
}

fn handle_race_headless(mut race: Race, sim_opts: &SimOpts) -> anyhow::Result<RaceResult> {
    let mut autopilot = Autopilot::new(sim_opts.use_collectibles);
    let mut telemetry = match &sim_opts.trace_path {
        Some(trace_path) => Some(TelemetryWriter::create(trace_path)?),
        None => None,
    };
    let mut t_race_update_print = 0.0;

    let result = loop {
        for control in autopilot.get_controls(&race) {
            race.queue_control(control);
        }

        let events = race.simulate_frame(sim_opts.timestep_size);

        if let Some(telemetry) = telemetry.as_mut() {
            telemetry.write(&TelemetryRecord::from_race(&race))?;
        }

        if race.cur_racetime > t_race_update_print + 0.9999 {
            log::debug!(
                "Simulating... Current race time is {:.3}s, current lap is {}",
                race.cur_racetime,
                race.get_display_lap()
            );
            t_race_update_print = race.cur_racetime;
        }

        if let Some(result) = events.into_iter().find_map(|event| match event {
            GameEvent::RaceComplete(result) => Some(result),
            _ => None,
        }) {
            break result;
        }

        if race.cur_racetime >= sim_opts.max_racetime {
            log::warn!(
                "Race aborted after {:.3}s of simulated time in lap {}",
                race.cur_racetime,
                race.get_display_lap()
            );
            break race.get_race_result();
        }
    };

    if let Some(telemetry) = telemetry {
        telemetry.into_inner()?;
    }

    Ok(result)
}

fn handle_race_realtime(
    mut race: Race,
    sim_opts: &SimOpts,
    gui_link: &GuiLink,
) -> anyhow::Result<RaceResult> {
    let t_frame = Duration::from_secs_f64(sim_opts.timestep_size / sim_opts.realtime_factor);
    let mut t_race_update_gui = f64::NEG_INFINITY;

    loop {
        let t_start = Instant::now();

        // collect inputs received since the last frame
        let mut gui_closed = false;
        loop {
            match gui_link.rx.try_recv() {
                Ok(control) => race.queue_control(control),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    gui_closed = true;
                    break;
                }
            }
        }

        if gui_closed {
            log::info!("GUI closed, stopping race");
            break;
        }

        for event in race.simulate_frame(sim_opts.timestep_size) {
            if let GameEvent::RaceComplete(result) = event {
                log::info!(
                    "Race complete! Best lap {:.3}s",
                    result.get_best_laptime().unwrap_or_default()
                );
            }
        }

        // send current game state
        if race.cur_racetime > t_race_update_gui + 1.0 / MAX_GUI_UPDATE_FREQUENCY - 0.001 {
            if gui_link.tx.send(race.get_game_snapshot()).is_err() {
                log::info!("GUI closed, stopping race");
                break;
            }
            t_race_update_gui = race.cur_racetime;
        }

        // sleep until time step is finished in real-time as well
        match t_frame.checked_sub(t_start.elapsed()) {
            Some(t_sleep) => sleep(t_sleep),
            None => log::warn!("Could not keep up with real-time!"),
        }
    }

    Ok(race
        .get_last_result()
        .cloned()
        .unwrap_or_else(|| race.get_race_result()))
}
