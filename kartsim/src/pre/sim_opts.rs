use anyhow::Context;
use clap::Parser;
use helpers::general::InputValueError;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "KART",
    about = "A kart racing game with checkpoints, power-ups and items"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Activate GUI - the race is played in real-time with keyboard controls
    #[clap(short, long)]
    pub gui: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the simulation parameter file (OPTIONAL: if not set, the built-in circuit is
    /// used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in GUI mode), should be in the range [0.01, 100]
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set simulation timestep size in seconds, should be in the range [0.001, 0.1]
    #[clap(short, long, default_value = "0.016666666666666666")]
    pub timestep_size: f64,

    /// Set seed for the random effect types of the collectibles (OPTIONAL: random if not set)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set maximum simulated race time in seconds after which a headless race is aborted
    #[clap(short, long, default_value = "600.0")]
    pub max_racetime: f64,

    /// Set path of a CSV file the per-frame telemetry of a headless race is written to
    #[clap(long)]
    pub trace_path: Option<PathBuf>,

    /// Let the autopilot use picked up power-ups and items (only for non-GUI mode)
    #[clap(short, long)]
    pub use_collectibles: bool,
}

impl SimOpts {
    /// validate checks the numeric options for values the race loops cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.001..=0.1).contains(&self.timestep_size) {
            return Err(InputValueError).context(format!(
                "Timestep size {}s is not in the range [0.001, 0.1]!",
                self.timestep_size
            ));
        }

        if !(0.01..=100.0).contains(&self.realtime_factor) {
            return Err(InputValueError).context(format!(
                "Real-time factor {} is not in the range [0.01, 100]!",
                self.realtime_factor
            ));
        }

        if !self.max_racetime.is_finite() || self.max_racetime <= 0.0 {
            return Err(InputValueError).context(format!(
                "Maximum race time {}s must be positive and finite!",
                self.max_racetime
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SimOpts::parse_from(["kart"]);

        assert!(!opts.gui);
        assert!(opts.parfile_path.is_none());
        assert!((opts.timestep_size - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!(opts.realtime_factor, 1.0);
        assert_eq!(opts.seed, None);
    }

    #[test]
    fn parses_options() {
        let opts = SimOpts::parse_from([
            "kart",
            "--gui",
            "-p",
            "input/parameters/pokekart.json",
            "--seed",
            "7",
            "--trace-path",
            "output/trace.csv",
        ]);

        assert!(opts.gui);
        assert_eq!(opts.seed, Some(7));
        assert_eq!(
            opts.parfile_path,
            Some(PathBuf::from("input/parameters/pokekart.json"))
        );
        assert_eq!(opts.trace_path, Some(PathBuf::from("output/trace.csv")));
    }

    #[test]
    fn default_options_are_valid() {
        assert!(SimOpts::parse_from(["kart"]).validate().is_ok());
    }

    #[test]
    fn rejects_invalid_numeric_options() {
        for args in [
            ["kart", "--timestep-size", "0.5"],
            ["kart", "--realtime-factor", "0"],
            ["kart", "--realtime-factor", "1e-300"],
            ["kart", "--realtime-factor", "NaN"],
            ["kart", "--max-racetime", "NaN"],
            ["kart", "--max-racetime", "inf"],
            ["kart", "--max-racetime=-1", "--debug"],
        ] {
            let opts = SimOpts::parse_from(args);
            let err = opts.validate().unwrap_err();
            assert!(err.downcast_ref::<InputValueError>().is_some(), "{:?}", args);
        }
    }
}
