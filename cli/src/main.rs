use anyhow::Context;
use clap::Parser;
use gui::core::gui::KartPlot;
use kartsim::core::handle_race::{handle_race, GuiLink};
use kartsim::post::race_result::RaceResult;
use kartsim::pre::read_sim_pars::{read_sim_pars, SimPars};
use kartsim::pre::sim_opts::SimOpts;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// export_laptime_plot draws the lap times of a race into a PNG file in the output folder and
/// returns the path of the file.
fn export_laptime_plot(result: &RaceResult) -> anyhow::Result<PathBuf> {
    let out_dir = Path::new("output");
    std::fs::create_dir_all(out_dir).context("Failed to create output folder!")?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let out_path = out_dir.join(format!("laptimes_{}.png", ts));

    // determine plot range
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &laptime in result.laptimes.iter() {
        y_min = y_min.min(laptime);
        y_max = y_max.max(laptime);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let margin = ((y_max - y_min) * 0.1).max(0.5);
    y_min = (y_min - margin).max(0.0);
    y_max += margin;

    let root = BitMapBackend::new(&out_path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Lap times - {}", result.track_name),
            ("sans-serif", 24).into_font(),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0u32..result.tot_no_laps + 1, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Lap")
        .y_desc("s")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    let series: Vec<(u32, f64)> = result
        .laptimes
        .iter()
        .enumerate()
        .map(|(lap, &laptime)| (lap as u32 + 1, laptime))
        .collect();

    chart
        .draw_series(LineSeries::new(series.iter().copied(), &BLUE))?
        .label("Lap time")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart.draw_series(
        series
            .iter()
            .map(|&(lap, laptime)| Circle::new((lap, laptime), 4, BLUE.filled())),
    )?;

    // mark best lap
    if let Some(best_laptime) = result.get_best_laptime() {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0, best_laptime), (result.tot_no_laps + 1, best_laptime)],
                RED.stroke_width(1),
            )))?
            .label(format!("Best lap {:.3}s", best_laptime))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", 16))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(out_path.clone())
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // set up logging
    kartsim::logging::try_init(sim_opts.debug).context("Failed to initialize logging!")?;

    // check numeric options
    sim_opts.validate()?;

    // get simulation parameters
    let sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        log::info!("Reading simulation parameters from {}", parfile_path.display());
        read_sim_pars(parfile_path)?
    } else {
        log::info!("No parameter file provided, using the built-in circuit");
        SimPars::default()
    };

    // print race details
    log::info!(
        "Racing {} laps on {} with a time step size of {:.4}s",
        sim_pars.race_pars.tot_no_laps,
        sim_pars.track_pars.name,
        sim_opts.timestep_size
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.gui {
        // NON-GUI CASE - the autopilot drives the race as fast as possible
        let t_start = Instant::now();

        let race_result = handle_race(&sim_pars, &sim_opts, None)?;

        log::info!("Execution time: {}ms", t_start.elapsed().as_millis());

        // POST-PROCESSING -------------------------------------------------------------------------
        race_result.print_lap_and_race_times();

        let result_path = race_result.write_lap_and_race_times_to_file(None)?;
        log::info!("Results written to {}", result_path);

        if !race_result.laptimes.is_empty() {
            match export_laptime_plot(&race_result) {
                Ok(path) => log::info!("Lap time plot written to {}", path.display()),
                Err(err) => log::warn!("Failed to write lap time plot: {}", err),
            }
        }
    } else {
        // GUI CASE - the race runs in real-time and is controlled with the keyboard
        let (tx_snapshot, rx_snapshot) = flume::unbounded();
        let (tx_control, rx_control) = flume::unbounded();

        // GUI has to be created before the race thread starts such that track errors stop the
        // program early
        let gui = KartPlot::new(rx_snapshot, tx_control, &sim_pars.track_pars)?;

        // execute race in a separate thread
        let sim_opts_thread = sim_opts.clone();
        let sim_pars_thread = sim_pars.clone();

        let _ = thread::spawn(move || {
            let gui_link = GuiLink {
                tx: tx_snapshot,
                rx: rx_control,
            };

            match handle_race(&sim_pars_thread, &sim_opts_thread, Some(&gui_link)) {
                Ok(race_result) => {
                    if !race_result.laptimes.is_empty() {
                        race_result.print_lap_and_race_times();
                    }
                }
                Err(err) => log::error!("Race thread failed: {:?}", err),
            }
        });

        // run GUI (blocks the main thread until the window is closed)
        let native_options = eframe::NativeOptions {
            initial_window_size: Some(eframe::egui::Vec2::new(1280.0, 720.0)),
            ..eframe::NativeOptions::default()
        };
        eframe::run_native(Box::new(gui), native_options);
    }

    Ok(())
}
