use crate::interfaces::kartsim_interface::KartsimInterface;
use eframe::{egui, epi};
use flume::{Receiver, Sender};
use glam::DVec3;
use helpers::buffer::RingBuffer;
use kartsim::core::collectibles::CollectibleKind;
use kartsim::core::controls::{key_codes, ControlEvent};
use kartsim::core::race::PovMode;
use kartsim::core::track::{Track, TrackPars};
use kartsim::interfaces::gui_interface::GameSnapshot;
use std::collections::HashSet;
use std::fmt::Write;
use std::time::Instant;

/// (m) Half size of the area shown around the kart in first-person mode.
const POV_VIEW_RANGE: f64 = 15.0;

/// get_key_code maps the keys used by the game onto their browser key codes.
pub fn get_key_code(key: egui::Key) -> Option<u32> {
    match key {
        egui::Key::ArrowUp => Some(key_codes::ARROW_UP),
        egui::Key::ArrowDown => Some(key_codes::ARROW_DOWN),
        egui::Key::ArrowLeft => Some(key_codes::ARROW_LEFT),
        egui::Key::ArrowRight => Some(key_codes::ARROW_RIGHT),
        egui::Key::Space => Some(key_codes::SPACE),
        egui::Key::I => Some(key_codes::KEY_I),
        egui::Key::P => Some(key_codes::KEY_P),
        egui::Key::V => Some(key_codes::KEY_V),
        _ => None,
    }
}

/// KeyboardState turns raw key events into control events. Key repeats of held keys are
/// suppressed and shift, which egui only reports as a modifier, is turned into edges.
#[derive(Debug, Default)]
pub struct KeyboardState {
    keys_down: HashSet<u32>,
    shift: bool,
}

impl KeyboardState {
    pub fn handle_key(&mut self, key_code: u32, pressed: bool) -> Option<ControlEvent> {
        let is_edge = if pressed {
            self.keys_down.insert(key_code)
        } else {
            self.keys_down.remove(&key_code)
        };

        if !is_edge {
            return None;
        }
        ControlEvent::from_key_code(key_code, pressed)
    }

    pub fn handle_shift(&mut self, shift: bool) -> Option<ControlEvent> {
        if shift == self.shift {
            return None;
        }
        self.shift = shift;
        ControlEvent::from_key_code(key_codes::SHIFT, shift)
    }
}

#[derive(Debug)]
pub struct KartPlot {
    pub kartsim_interface: KartsimInterface,
    pub track: Track,
    pub keyboard_state: KeyboardState,
    pub prev_update: Instant,
    pub prev_update_durations: RingBuffer<u32>,
}

impl KartPlot {
    pub fn new(
        rx: Receiver<GameSnapshot>,
        tx: Sender<ControlEvent>,
        track_pars: &TrackPars,
    ) -> anyhow::Result<KartPlot> {
        // load track
        let track = Track::new(track_pars);
        anyhow::ensure!(
            !track.checkpoints.is_empty(),
            "Track {} does not contain any checkpoints!",
            track.name
        );

        Ok(KartPlot {
            kartsim_interface: KartsimInterface::new(rx, tx),
            track,
            keyboard_state: KeyboardState::default(),
            prev_update: Instant::now(),
            prev_update_durations: RingBuffer::new(10),
        })
    }

    /// handle_input forwards the keyboard events of the current UI frame to the race thread.
    fn handle_input(&mut self, ctx: &egui::CtxRef) {
        let mut controls = vec![];

        {
            let input = ctx.input();

            for event in input.events.iter() {
                if let egui::Event::Key { key, pressed, .. } = event {
                    if let Some(control) = get_key_code(*key)
                        .and_then(|key_code| self.keyboard_state.handle_key(key_code, *pressed))
                    {
                        controls.push(control);
                    }
                }
            }

            if let Some(control) = self.keyboard_state.handle_shift(input.modifiers.shift) {
                controls.push(control);
            }
        }

        for control in controls {
            self.kartsim_interface.send_control(control);
        }
    }

    /// get_view_axes returns [x_min, x_max, z_min, z_max] of the shown area.
    fn get_view_axes(&self) -> [f64; 4] {
        let snapshot = &self.kartsim_interface.game_snapshot;

        match snapshot.pov {
            PovMode::ThirdPerson => self.track.get_axes_expansion(5.0),
            PovMode::FirstPerson => [
                snapshot.position.x - POV_VIEW_RANGE,
                snapshot.position.x + POV_VIEW_RANGE,
                snapshot.position.z - POV_VIEW_RANGE,
                snapshot.position.z + POV_VIEW_RANGE,
            ],
        }
    }

    pub fn set_ui_content(&mut self, ui: &mut egui::Ui) -> egui::Response {
        // PREPARATIONS ----------------------------------------------------------------------------
        // get UI handles
        let (response, painter) =
            ui.allocate_painter(ui.available_size_before_wrap_finite(), egui::Sense::hover());

        // get transformation from x/z to pixels in the window (z axis points downwards as in the
        // top view of the scene)
        let [x_min, x_max, z_min, z_max] = self.get_view_axes();

        // fit view into the window while preserving the aspect ratio
        let view_aspect = ((x_max - x_min) / (z_max - z_min)) as f32;
        let screen_aspect = response.rect.width() / response.rect.height();

        let dest_rect = if screen_aspect > view_aspect {
            egui::Rect::from_center_size(
                response.rect.center(),
                egui::Vec2::new(response.rect.height() * view_aspect, response.rect.height()),
            )
        } else {
            egui::Rect::from_center_size(
                response.rect.center(),
                egui::Vec2::new(response.rect.width(), response.rect.width() / view_aspect),
            )
        };

        let to_screen = egui::emath::RectTransform::from_to(
            egui::Rect::from_min_max(
                egui::Pos2::new(x_min as f32, z_min as f32),
                egui::Pos2::new(x_max as f32, z_max as f32),
            ),
            dest_rect,
        );
        let px_per_m = dest_rect.width() / (x_max - x_min) as f32;
        let to_pos = |p: DVec3| to_screen * egui::Pos2::new(p.x as f32, p.z as f32);

        // create vector for drawn shapes
        let mut shapes = vec![];
        let snapshot = &self.kartsim_interface.game_snapshot;

        // TRACK DRAWING ---------------------------------------------------------------------------
        // add closed centerline through the checkpoints
        let mut centerline: Vec<egui::Pos2> =
            self.track.checkpoints.iter().map(|&p| to_pos(p)).collect();
        if let Some(&first) = centerline.first() {
            centerline.push(first);
        }

        if let Some(track_width) = self.track.track_width {
            shapes.push(egui::Shape::line(
                centerline.to_owned(),
                egui::Stroke::new(
                    2.0 * track_width as f32 * px_per_m,
                    egui::Color32::from_gray(90),
                ),
            ));
        }
        shapes.push(egui::Shape::line(
            centerline,
            egui::Stroke::new(3.0, egui::Color32::WHITE),
        ));

        // add checkpoints (passed ones are green)
        for checkpoint in snapshot.checkpoints.iter() {
            let color = if checkpoint.passed {
                egui::Color32::from_rgb(0, 200, 0)
            } else {
                egui::Color32::from_rgb(255, 220, 0)
            };
            shapes.push(egui::Shape::circle_stroke(
                to_pos(checkpoint.position),
                checkpoint.radius as f32 * px_per_m,
                egui::Stroke::new(2.0, color),
            ));
        }

        // COLLECTIBLES DRAWING --------------------------------------------------------------------
        for collectible in snapshot.collectibles.iter().filter(|c| c.available) {
            let pos = to_pos(collectible.position);
            let color = match collectible.kind {
                CollectibleKind::PowerUp => egui::Color32::from_rgb(255, 128, 0),
                CollectibleKind::Item => egui::Color32::from_rgb(0, 128, 255),
            };

            shapes.push(egui::Shape::rect_filled(
                egui::Rect::from_center_size(pos, egui::Vec2::splat(14.0)),
                2.0,
                color,
            ));
            shapes.push(egui::Shape::text(
                ui.fonts(),
                pos + egui::Vec2::new(0.0, -12.0),
                egui::Align2::CENTER_BOTTOM,
                collectible.label,
                egui::TextStyle::Small,
                color,
            ));
        }

        // KART DRAWING ----------------------------------------------------------------------------
        let kart_pos = to_pos(snapshot.position);
        let kart_color =
            egui::Color32::from_rgb(snapshot.color.r, snapshot.color.g, snapshot.color.b);
        let nose = snapshot.position
            + DVec3::new(snapshot.heading.sin(), 0.0, snapshot.heading.cos()) * 2.0;

        shapes.push(egui::Shape::circle_filled(kart_pos, 8.0, kart_color));
        shapes.push(egui::Shape::line_segment(
            [kart_pos, to_pos(nose)],
            egui::Stroke::new(3.0, kart_color),
        ));

        // companion attack indicator
        if snapshot.attacking {
            shapes.push(egui::Shape::circle_stroke(
                kart_pos,
                16.0,
                egui::Stroke::new(3.0, egui::Color32::from_rgb(255, 255, 0)),
            ));
        }

        // UPDATE GENERAL INFORMATION TEXT IN GUI --------------------------------------------------
        let mut gen_info_text = String::new();
        let _ = writeln!(
            &mut gen_info_text,
            "Lap: {}/{}",
            snapshot.display_lap, snapshot.tot_no_laps
        );
        let _ = writeln!(&mut gen_info_text, "Speed: {}", snapshot.speed_display);
        let _ = writeln!(&mut gen_info_text, "Boost: {}%", snapshot.boost_display);
        let _ = writeln!(
            &mut gen_info_text,
            "Power-up: {}",
            snapshot.held_power_up.unwrap_or("-")
        );
        let _ = writeln!(&mut gen_info_text, "Item: {}", snapshot.held_item.unwrap_or("-"));
        if let Some(t_remaining) = snapshot.speed_remaining {
            let _ = writeln!(&mut gen_info_text, "Speed up: {:.1}s", t_remaining);
        }
        if let Some(t_remaining) = snapshot.invincibility_remaining {
            let _ = writeln!(&mut gen_info_text, "Invincible: {:.1}s", t_remaining);
        }
        if snapshot.attack_cooldown > 0.0 {
            let _ = writeln!(&mut gen_info_text, "Attack cooldown");
        }
        if snapshot.drift {
            let _ = writeln!(&mut gen_info_text, "DRIFT");
        }
        let _ = writeln!(
            &mut gen_info_text,
            "View: {}",
            match snapshot.pov {
                PovMode::ThirdPerson => "third person",
                PovMode::FirstPerson => "first person",
            }
        );

        // calculate current UI update duration, append it to the buffer, and set update time
        self.prev_update_durations
            .push(self.prev_update.elapsed().as_millis() as u32);
        self.prev_update = Instant::now();

        if let Some(avg_duration) = self.prev_update_durations.get_avg() {
            if avg_duration > 0.0 {
                let _ = write!(
                    &mut gen_info_text,
                    "GUI update frequency: {:.0} Hz",
                    1000.0 / avg_duration
                );
            }
        }

        shapes.push(egui::Shape::text(
            ui.fonts(),
            response.rect.min + egui::Vec2::new(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            &gen_info_text,
            egui::TextStyle::Body,
            egui::Color32::WHITE,
        ));

        // race complete banner
        if let Some(result) = &snapshot.last_result {
            let mut result_text = String::from("Race complete!");
            for (lap, laptime) in result.laptimes.iter().enumerate() {
                let _ = write!(&mut result_text, "\nLap {}: {:.3}s", lap + 1, laptime);
            }

            shapes.push(egui::Shape::text(
                ui.fonts(),
                egui::Pos2::new(response.rect.max.x - 10.0, response.rect.min.y + 10.0),
                egui::Align2::RIGHT_TOP,
                &result_text,
                egui::TextStyle::Heading,
                egui::Color32::from_rgb(255, 220, 0),
            ));
        }

        // DRAWING ---------------------------------------------------------------------------------
        // update shapes in UI painter and return response
        painter.extend(shapes);
        response
    }
}

impl epi::App for KartPlot {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::CtxRef, _frame: &mut epi::Frame) {
        // forward keyboard input and update game state
        self.handle_input(ctx);
        self.kartsim_interface.update();

        // update UI content
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut frame = egui::Frame::dark_canvas(ui.style());
            frame.fill = egui::Color32::from_rgb(20, 80, 20);
            frame.show(ui, |ui| {
                self.set_ui_content(ui);
            });
        });

        // request repaint of the UI
        ctx.request_repaint();
    }

    fn name(&self) -> &str {
        "Kart Race"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_game_keys() {
        assert_eq!(get_key_code(egui::Key::ArrowUp), Some(key_codes::ARROW_UP));
        assert_eq!(get_key_code(egui::Key::V), Some(key_codes::KEY_V));
        assert_eq!(get_key_code(egui::Key::A), None);
    }

    #[test]
    fn key_repeats_are_suppressed() {
        let mut keyboard_state = KeyboardState::default();

        assert_eq!(
            keyboard_state.handle_key(key_codes::SPACE, true),
            Some(ControlEvent::Boost)
        );
        assert_eq!(keyboard_state.handle_key(key_codes::SPACE, true), None);
        assert_eq!(keyboard_state.handle_key(key_codes::SPACE, false), None);
        assert_eq!(
            keyboard_state.handle_key(key_codes::SPACE, true),
            Some(ControlEvent::Boost)
        );

        assert_eq!(
            keyboard_state.handle_key(key_codes::ARROW_LEFT, true),
            Some(ControlEvent::TurnLeft(true))
        );
        assert_eq!(
            keyboard_state.handle_key(key_codes::ARROW_LEFT, false),
            Some(ControlEvent::TurnLeft(false))
        );
    }

    #[test]
    fn shift_modifier_becomes_edges() {
        let mut keyboard_state = KeyboardState::default();

        assert_eq!(keyboard_state.handle_shift(false), None);
        assert_eq!(
            keyboard_state.handle_shift(true),
            Some(ControlEvent::DriftModifier(true))
        );
        assert_eq!(keyboard_state.handle_shift(true), None);
        assert_eq!(
            keyboard_state.handle_shift(false),
            Some(ControlEvent::DriftModifier(false))
        );
    }
}
