use serde::Serialize;
use std::fmt::Write;
use std::io::Write as IoWrite;
use std::path::Path;

/// RaceResult contains the information of a completed (or aborted) race that is required for
/// post-processing.
/// * `laptimes` - (s) Lap times in simulated time, index 0 is the first completed lap
/// * `racetimes` - (s) Race time at the end of each completed lap
/// * `completed` - True if all laps were driven
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct RaceResult {
    pub track_name: String,
    pub tot_no_laps: u32,
    pub laptimes: Vec<f64>,
    pub racetimes: Vec<f64>,
    pub completed: bool,
    pub power_ups_used: u32,
    pub items_used: u32,
}

impl RaceResult {
    pub fn get_best_laptime(&self) -> Option<f64> {
        self.laptimes.iter().copied().reduce(f64::min)
    }

    pub fn get_racetime(&self) -> Option<f64> {
        self.racetimes.last().copied()
    }

    fn format_lap_and_race_times(&self) -> Result<String, std::fmt::Error> {
        let mut content = String::new();

        writeln!(&mut content, "RESULT: {}", self.track_name)?;
        writeln!(&mut content, "lap, laptime, racetime")?;

        for (lap, (laptime, racetime)) in self.laptimes.iter().zip(&self.racetimes).enumerate() {
            writeln!(&mut content, "{:3}, {:8.3}s, {:8.3}s", lap + 1, laptime, racetime)?;
        }

        if let Some(best) = self.get_best_laptime() {
            writeln!(&mut content, "Best lap: {:.3}s", best)?;
        }

        writeln!(
            &mut content,
            "Laps: {}/{} ({})",
            self.laptimes.len(),
            self.tot_no_laps,
            if self.completed { "completed" } else { "not completed" }
        )?;
        write!(
            &mut content,
            "Power-ups used: {}, items used: {}",
            self.power_ups_used, self.items_used
        )?;

        Ok(content)
    }

    /// print_lap_and_race_times prints the resulting lap and race times to the console output.
    pub fn print_lap_and_race_times(&self) {
        match self.format_lap_and_race_times() {
            Ok(content) => println!("{}", content),
            Err(err) => log::error!("Could not format race result: {}", err),
        }
    }

    /// write_lap_and_race_times_to_file writes the lap and race times to a text file (default
    /// output/last_run.txt) and returns the path of the written file.
    pub fn write_lap_and_race_times_to_file(&self, path: Option<&Path>) -> anyhow::Result<String> {
        let content = self.format_lap_and_race_times()?;

        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = Path::new("output");
                std::fs::create_dir_all(out_dir)?;
                out_dir.join("last_run.txt")
            }
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)?;
        writeln!(file, "{}", content)?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> RaceResult {
        RaceResult {
            track_name: String::from("Test"),
            tot_no_laps: 3,
            laptimes: vec![20.5, 18.25, 19.0],
            racetimes: vec![20.5, 38.75, 57.75],
            completed: true,
            power_ups_used: 1,
            items_used: 2,
        }
    }

    #[test]
    fn best_lap_and_racetime() {
        let result = result();
        assert_eq!(result.get_best_laptime(), Some(18.25));
        assert_eq!(result.get_racetime(), Some(57.75));
        assert_eq!(RaceResult::default().get_best_laptime(), None);
    }

    #[test]
    fn formats_one_row_per_lap() {
        let content = result().format_lap_and_race_times().unwrap();

        assert!(content.contains("  2,   18.250s,   38.750s"));
        assert!(content.contains("Laps: 3/3 (completed)"));
    }
}
