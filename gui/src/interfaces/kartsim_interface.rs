use flume::{Receiver, Sender};
use kartsim::core::controls::ControlEvent;
use kartsim::interfaces::gui_interface::GameSnapshot;

/// KartsimInterface holds the channel ends towards the race thread and the latest received game
/// snapshot.
#[derive(Debug)]
pub struct KartsimInterface {
    pub rx: Receiver<GameSnapshot>,
    pub tx: Sender<ControlEvent>,
    pub game_snapshot: GameSnapshot,
    pub connected: bool,
}

impl KartsimInterface {
    pub fn new(rx: Receiver<GameSnapshot>, tx: Sender<ControlEvent>) -> KartsimInterface {
        KartsimInterface {
            rx,
            tx,
            game_snapshot: Default::default(),
            connected: true,
        }
    }

    /// update takes the latest snapshot from the channel, older ones are dropped. Returns true if
    /// a new snapshot was received.
    pub fn update(&mut self) -> bool {
        match self.rx.try_iter().last() {
            Some(game_snapshot) => {
                self.game_snapshot = game_snapshot;
                true
            }
            None => false,
        }
    }

    /// send_control forwards a control event to the race thread. A stopped race thread only
    /// stops the delivery.
    pub fn send_control(&mut self, event: ControlEvent) {
        if self.connected && self.tx.send(event).is_err() {
            log::warn!("Race thread stopped, control events are dropped");
            self.connected = false;
        }
    }
}
