use glam::DVec3;
use helpers::geometry::dist_closed_polyline;
use serde::Deserialize;

/// * `name` - Track name
/// * `checkpoints` - Checkpoint centers in driving order, checkpoint 0 is the finish line
/// * `checkpoint_radius` - Distance below which a checkpoint counts as passed
/// * `power_up_spawns` - Positions of the power-up boxes
/// * `item_spawns` - Positions of the items
/// * `start_position` - Start position of the kart
/// * `start_heading` - (rad) Start heading of the kart (0 points along +z)
/// * `track_width` - Maximum distance between the kart and the centerline through the checkpoints,
/// None disables the boundary check
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_checkpoints")]
    pub checkpoints: Vec<DVec3>,
    #[serde(default = "default_checkpoint_radius")]
    pub checkpoint_radius: f64,
    #[serde(default = "default_power_up_spawns")]
    pub power_up_spawns: Vec<DVec3>,
    #[serde(default = "default_item_spawns")]
    pub item_spawns: Vec<DVec3>,
    #[serde(default = "default_start_position")]
    pub start_position: DVec3,
    #[serde(default)]
    pub start_heading: f64,
    #[serde(default)]
    pub track_width: Option<f64>,
}

fn default_name() -> String {
    String::from("Pokekart Circuit")
}

fn default_checkpoints() -> Vec<DVec3> {
    [
        [-40.0, 0.0],
        [-20.0, 0.0],
        [-10.0, -10.0],
        [0.0, -20.0],
        [20.0, -20.0],
        [30.0, -10.0],
        [40.0, 0.0],
        [40.0, 20.0],
        [30.0, 30.0],
        [20.0, 40.0],
        [0.0, 40.0],
        [-20.0, 30.0],
        [-30.0, 20.0],
        [-30.0, 0.0],
    ]
    .iter()
    .map(|[x, z]| DVec3::new(*x, 0.2, *z))
    .collect()
}

fn default_checkpoint_radius() -> f64 {
    2.0
}

fn corner_spawns(offset: f64) -> Vec<DVec3> {
    vec![
        DVec3::new(offset, 0.5, offset),
        DVec3::new(-offset, 0.5, offset),
        DVec3::new(offset, 0.5, -offset),
        DVec3::new(-offset, 0.5, -offset),
    ]
}

fn default_power_up_spawns() -> Vec<DVec3> {
    corner_spawns(15.0)
}

fn default_item_spawns() -> Vec<DVec3> {
    corner_spawns(10.0)
}

fn default_start_position() -> DVec3 {
    DVec3::new(0.0, 0.5, 0.0)
}

impl Default for TrackPars {
    fn default() -> Self {
        TrackPars {
            name: default_name(),
            checkpoints: default_checkpoints(),
            checkpoint_radius: default_checkpoint_radius(),
            power_up_spawns: default_power_up_spawns(),
            item_spawns: default_item_spawns(),
            start_position: default_start_position(),
            start_heading: 0.0,
            track_width: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub checkpoints: Vec<DVec3>,
    pub checkpoint_radius: f64,
    pub power_up_spawns: Vec<DVec3>,
    pub item_spawns: Vec<DVec3>,
    pub start_position: DVec3,
    pub start_heading: f64,
    pub track_width: Option<f64>,
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Track {
        Track {
            name: track_pars.name.to_owned(),
            checkpoints: track_pars.checkpoints.to_owned(),
            checkpoint_radius: track_pars.checkpoint_radius,
            power_up_spawns: track_pars.power_up_spawns.to_owned(),
            item_spawns: track_pars.item_spawns.to_owned(),
            start_position: track_pars.start_position,
            start_heading: track_pars.start_heading,
            track_width: track_pars.track_width,
        }
    }

    /// is_on_track checks the position against the track boundary, i.e. the distance to the closed
    /// centerline through the checkpoints. Always true if no track width is set.
    pub fn is_on_track(&self, position: DVec3) -> bool {
        match self.track_width {
            Some(track_width) => dist_closed_polyline(position, &self.checkpoints) <= track_width,
            None => true,
        }
    }

    /// get_axes_expansion returns [x_min, x_max, z_min, z_max] of everything placed on the track,
    /// expanded by the inserted margin.
    pub fn get_axes_expansion(&self, margin: f64) -> [f64; 4] {
        let mut axes = [
            self.start_position.x,
            self.start_position.x,
            self.start_position.z,
            self.start_position.z,
        ];

        for p in self
            .checkpoints
            .iter()
            .chain(self.power_up_spawns.iter())
            .chain(self.item_spawns.iter())
        {
            axes[0] = axes[0].min(p.x);
            axes[1] = axes[1].max(p.x);
            axes[2] = axes[2].min(p.z);
            axes[3] = axes[3].max(p.z);
        }

        [
            axes[0] - margin,
            axes[1] + margin,
            axes[2] - margin,
            axes[3] + margin,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_circuit() {
        let track = Track::new(&TrackPars::default());

        assert_eq!(track.checkpoints.len(), 14);
        assert_eq!(track.checkpoints[0], DVec3::new(-40.0, 0.2, 0.0));
        assert_eq!(track.checkpoints[13], DVec3::new(-30.0, 0.2, 0.0));
        assert_eq!(track.power_up_spawns.len(), 4);
        assert_eq!(track.item_spawns.len(), 4);
        assert!(track.is_on_track(DVec3::new(1000.0, 0.0, 1000.0)));
    }

    #[test]
    fn boundary_follows_centerline() {
        let track = Track::new(&TrackPars {
            track_width: Some(5.0),
            ..TrackPars::default()
        });

        assert!(track.is_on_track(DVec3::new(-30.0, 0.5, 0.0)));
        assert!(track.is_on_track(DVec3::new(-30.0, 0.5, 4.0)));
        assert!(!track.is_on_track(DVec3::new(0.0, 0.5, 0.0)));
    }

    #[test]
    fn axes_cover_all_elements() {
        let track = Track::new(&TrackPars::default());
        assert_eq!(track.get_axes_expansion(5.0), [-45.0, 45.0, -25.0, 45.0]);
    }

    #[test]
    fn partial_track_file_uses_defaults() {
        let track_pars: TrackPars =
            serde_json::from_str(r#"{"name": "Test", "track_width": 6.0}"#).unwrap();

        assert_eq!(track_pars.name, "Test");
        assert_eq!(track_pars.track_width, Some(6.0));
        assert_eq!(track_pars.checkpoints.len(), 14);
        assert_eq!(track_pars.start_position, DVec3::new(0.0, 0.5, 0.0));
    }
}
