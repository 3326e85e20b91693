//! Browser bridge
//!
//! Thin wasm-bindgen wrapper around `Session`. The page owns the canvas,
//! audio and overlay widgets; it forwards keyboard events here, calls
//! `frame()` once per `requestAnimationFrame` and draws from the JSON
//! snapshot.

use wasm_bindgen::prelude::*;

use crate::leaderboard::{LeaderboardService, LocalLeaderboard};
use crate::platform::{LocalStorageStore, SystemClock};
use crate::{Control, ControlState, Session, SessionState};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"River Strike: logger already initialized".into());
    }
    log::info!("River Strike starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    controls: ControlState,
    clock: SystemClock,
    leaderboard: LocalLeaderboard,
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let session = Session::new(seed, Box::new(LocalStorageStore));
        let leaderboard = LocalLeaderboard::new(session.high_scores().clone());
        Self {
            session,
            controls: ControlState::new(),
            clock: SystemClock,
            leaderboard,
        }
    }

    /// Forward a keydown (`KeyboardEvent.code` and `.key`)
    pub fn key_down(&mut self, code: &str, key: &str) {
        if let Some(control) = Control::from_key_code(code) {
            self.controls.set(control, true);
        }

        let typed = single_char(key);
        match self.session.state() {
            SessionState::Start | SessionState::GameOver => {
                if code == "KeyR" || code == "Enter" {
                    self.session.start_game();
                }
            }
            SessionState::Shop => {
                if let Some(Err(e)) = typed.and_then(|c| self.session.buy_hotkey(c)) {
                    log::info!("Purchase refused: {}", e);
                }
            }
            SessionState::Playing => {
                if let Some(c) = typed {
                    self.session.key_typed(c);
                }
            }
            SessionState::LeaderboardInput => {}
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(control) = Control::from_key_code(code) {
            self.controls.set(control, false);
        }
    }

    /// On-screen touch buttons report by key code too
    pub fn set_control(&mut self, code: &str, held: bool) {
        if let Some(control) = Control::from_key_code(code) {
            self.controls.set(control, held);
        }
    }

    /// Release everything (window blur)
    pub fn release_all(&mut self) {
        self.controls.release_all();
    }

    /// Advance one display frame
    pub fn frame(&mut self) {
        self.session.frame(&self.controls, &self.clock);
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.session
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Events since the last call, as a JSON array (sound cues, banners)
    pub fn take_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.take_events())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.session.state())
    }

    pub fn start_game(&mut self) -> bool {
        self.session.start_game()
    }

    pub fn toggle_shop(&mut self) {
        self.session.toggle_shop();
    }

    /// Buy by shop hotkey; the error message is shown next to the item
    pub fn buy(&mut self, key: char) -> Result<(), JsValue> {
        match self.session.buy_hotkey(key) {
            Some(result) => result.map_err(|e| JsValue::from_str(&e.to_string())),
            None => Err(JsValue::from_str("no such item")),
        }
    }

    pub fn activate_nuke(&mut self) -> bool {
        self.session.activate_nuke()
    }

    pub fn set_name(&mut self, name: &str) {
        self.session.set_name_input(name);
    }

    /// Submit the score and return the status line to show
    pub fn submit_score(&mut self) -> String {
        let board: &mut dyn LeaderboardService = &mut self.leaderboard;
        if let Err(e) = self.session.submit_score(Some(board)) {
            log::warn!("Score not submitted: {}", e);
        }
        self.session.leaderboard().status.message().to_string()
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
