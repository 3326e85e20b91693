//! Session state machine
//!
//! The single authority over what screen the game is on, the gold ledger,
//! the carried loadout and the running world. The presentation layer feeds
//! it controls once per display frame, polls `state()` and drains
//! `take_events()`.

use serde::Serialize;

use crate::consts::MAX_FUEL;
use crate::economy::{GoldLedger, Loadout, PurchaseError, ShopItem};
use crate::highscores::{HighScores, normalize_name};
use crate::input::{Control, ControlState};
use crate::leaderboard::{LEADERBOARD_LIMIT, LeaderboardError, LeaderboardService, LeaderboardView, SaveStatus};
use crate::persistence::Persistence;
use crate::platform::clock::Clock;
use crate::platform::storage::KeyValueStore;
use crate::sim::{self, GameEvent, ParticleColor, TickInput, WeaponType, World};
use crate::snapshot::RenderSnapshot;
use crate::tuning::Tuning;

/// Typing this while playing grants a pile of lives
const CHEAT_CODE: &str = "ogg";
const CHEAT_LIVES: u32 = 9999;

/// Which screen the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Start,
    Playing,
    /// Simulation frozen while the shop is open
    Shop,
    GameOver,
    /// Score submitted, leaderboard showing
    LeaderboardInput,
}

/// Things the presentation layer reacts to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    Game(GameEvent),
    StateChanged { from: SessionState, to: SessionState },
    Purchased(ShopItem),
    GoldBanked { amount: u64, total: u64 },
}

pub struct Session {
    state: SessionState,
    tuning: Tuning,
    seed: u64,
    runs_started: u64,
    world: World,
    ledger: GoldLedger,
    loadout: Loadout,
    persistence: Persistence,
    high_scores: HighScores,
    leaderboard: LeaderboardView,
    /// Shop was opened from a running game
    was_playing: bool,
    /// Local high score already recorded for this run
    score_recorded: bool,
    previous_controls: ControlState,
    cheat_buffer: String,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Create a session, reading tuning overrides from the store
    pub fn new(seed: u64, store: Box<dyn KeyValueStore>) -> Self {
        let tuning = Tuning::load(store.as_ref());
        Self::with_tuning(seed, tuning, store)
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, store: Box<dyn KeyValueStore>) -> Self {
        let persistence = Persistence::new(store);
        let ledger = GoldLedger::new(persistence.load_banked_gold());
        let high_scores = persistence.load_high_scores();
        let world = World::new(seed, tuning.clone());

        log::info!(
            "Session ready (seed {}, {} banked gold, {} high scores)",
            seed,
            ledger.banked(),
            high_scores.entries.len()
        );

        Self {
            state: SessionState::Start,
            tuning,
            seed,
            runs_started: 0,
            world,
            ledger,
            loadout: Loadout::default(),
            persistence,
            high_scores,
            leaderboard: LeaderboardView::default(),
            was_playing: false,
            score_recorded: false,
            previous_controls: ControlState::default(),
            cheat_buffer: String::new(),
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn ledger(&self) -> &GoldLedger {
        &self.ledger
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn leaderboard(&self) -> &LeaderboardView {
        &self.leaderboard
    }

    /// Shop was opened from a running game
    pub fn is_mid_run(&self) -> bool {
        self.was_playing
    }

    /// Gold shown on the HUD: banked plus run gold while a run is live
    pub fn displayed_gold(&self) -> u64 {
        let live = self.state == SessionState::Playing
            || (self.state == SessionState::Shop && self.was_playing);
        if live {
            self.ledger.banked() + self.world.player.gold
        } else {
            self.ledger.banked()
        }
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot::capture(self)
    }

    fn set_state(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        log::info!("Session {:?} -> {:?}", from, to);
        self.events.push(SessionEvent::StateChanged { from, to });
    }

    /// Begin a new run with the carried loadout.
    ///
    /// Allowed from the start screen, game over and the leaderboard.
    pub fn start_game(&mut self) -> bool {
        if !matches!(
            self.state,
            SessionState::Start | SessionState::GameOver | SessionState::LeaderboardInput
        ) {
            return false;
        }

        let seed = self.seed.wrapping_add(self.runs_started);
        self.runs_started += 1;

        let mut world = World::new(seed, self.tuning.clone());
        let player = &mut world.player;
        player.lives = self.tuning.starting_lives + self.loadout.extra_lives;
        player.weapon = self.loadout.weapon;
        player.nukes = self.loadout.nukes;
        if self.loadout.shield_ready {
            player.grant_invulnerability(self.tuning.shield_frames);
        }
        // Single-use items are spent once applied
        self.loadout.shield_ready = false;
        self.loadout.extra_lives = 0;

        log::info!(
            "Run {} started (seed {}, {} lives, {:?}, {} nukes)",
            self.runs_started,
            seed,
            world.player.lives,
            world.player.weapon,
            world.player.nukes
        );

        self.world = world;
        self.ledger.open_run();
        self.was_playing = false;
        self.score_recorded = false;
        self.cheat_buffer.clear();
        self.leaderboard.status = SaveStatus::Idle;
        self.set_state(SessionState::Playing);
        true
    }

    /// Open or close the shop
    pub fn toggle_shop(&mut self) {
        match self.state {
            SessionState::Shop => {
                if self.was_playing {
                    self.was_playing = false;
                    self.set_state(SessionState::Playing);
                } else {
                    self.set_state(SessionState::Start);
                }
            }
            SessionState::Playing => {
                self.was_playing = true;
                self.set_state(SessionState::Shop);
            }
            SessionState::Start | SessionState::GameOver | SessionState::LeaderboardInput => {
                self.was_playing = false;
                self.set_state(SessionState::Shop);
            }
        }
    }

    /// Buy an item from the open shop
    pub fn buy(&mut self, item: ShopItem) -> Result<(), PurchaseError> {
        if self.state != SessionState::Shop {
            return Err(PurchaseError::ShopClosed);
        }
        let mid_run = self.was_playing;

        match item {
            ShopItem::Fuel if !mid_run || self.world.player.fuel >= MAX_FUEL => {
                return Err(PurchaseError::NotApplicable);
            }
            ShopItem::Shield if self.loadout.shield_ready => {
                return Err(PurchaseError::AlreadyOwned);
            }
            _ => {}
        }
        if item.weapon() == Some(self.loadout.weapon) {
            return Err(PurchaseError::AlreadyOwned);
        }

        let cost = item.price(&self.tuning.prices);
        let run_gold = mid_run.then_some(&mut self.world.player.gold);
        let payment = match self.ledger.spend(cost, run_gold) {
            Ok(payment) => payment,
            Err(e) => {
                log::debug!("Purchase of {} refused: {}", item.name(), e);
                return Err(e);
            }
        };

        let player = &mut self.world.player;
        match item {
            ShopItem::Fuel => player.fuel = MAX_FUEL,
            ShopItem::WeaponDouble | ShopItem::WeaponHelix | ShopItem::WeaponSpread => {
                let weapon = item.weapon().unwrap_or(WeaponType::Single);
                self.loadout.weapon = weapon;
                if mid_run {
                    player.weapon = weapon;
                }
            }
            ShopItem::Life => {
                self.loadout.extra_lives += 1;
                if mid_run {
                    player.lives += 1;
                }
            }
            ShopItem::Shield => {
                self.loadout.shield_ready = true;
                if mid_run {
                    player.grant_invulnerability(self.tuning.shield_frames);
                }
            }
            ShopItem::Nuke => {
                self.loadout.nukes += 1;
                if mid_run {
                    player.nukes += 1;
                }
            }
        }

        log::debug!(
            "Bought {} for {} gold ({} run, {} banked)",
            item.name(),
            cost,
            payment.from_run,
            payment.from_bank
        );
        if payment.from_bank > 0 {
            self.save_banked_gold();
        }
        self.events.push(SessionEvent::Purchased(item));
        Ok(())
    }

    /// Shop hotkey `1`..`7`; None when the key maps to nothing
    pub fn buy_hotkey(&mut self, key: char) -> Option<Result<(), PurchaseError>> {
        if self.state != SessionState::Shop {
            return None;
        }
        let item = ShopItem::from_hotkey(key, self.was_playing)?;
        Some(self.buy(item))
    }

    /// Detonate a nuke in the running game
    pub fn activate_nuke(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        if !sim::activate_nuke(&mut self.world) {
            return false;
        }
        self.loadout.nukes = self.loadout.nukes.saturating_sub(1);
        self.collect_world_events();
        true
    }

    /// Advance one display frame.
    ///
    /// Shop and nuke controls act on their rising edge; the world only ticks
    /// while playing.
    pub fn frame(&mut self, controls: &ControlState, clock: &dyn Clock) {
        let previous = std::mem::replace(&mut self.previous_controls, *controls);

        if controls.pressed_since(&previous, Control::ToggleShop) {
            self.toggle_shop();
        }
        if controls.pressed_since(&previous, Control::ActivateNuke) {
            self.activate_nuke();
        }

        if self.state != SessionState::Playing {
            return;
        }

        let input = TickInput {
            controls: *controls,
            now_ms: clock.now_ms(),
        };
        sim::tick(&mut self.world, &input);
        self.collect_world_events();

        if self.world.is_over() {
            self.finish_run();
        }
    }

    /// A character typed while playing (cheat code input)
    pub fn key_typed(&mut self, key: char) {
        if self.state != SessionState::Playing {
            return;
        }
        self.cheat_buffer.push(key.to_ascii_lowercase());
        while self.cheat_buffer.chars().count() > CHEAT_CODE.len() {
            self.cheat_buffer.remove(0);
        }
        if self.cheat_buffer == CHEAT_CODE {
            self.cheat_buffer.clear();
            self.world.player.lives = CHEAT_LIVES;
            let pos = self.world.player.pos;
            self.world.create_explosion(pos, ParticleColor::Lime, 50);
            self.world.events.push(GameEvent::CheatActivated);
            self.collect_world_events();
            log::info!("Cheat code entered");
        }
    }

    /// Update the name typed on the game-over screen
    pub fn set_name_input(&mut self, raw: &str) {
        self.leaderboard.name_input = normalize_name(raw);
    }

    /// Submit the finished run's score under the entered name.
    ///
    /// The local table is updated even without a service. Failures keep
    /// the name and score so the player can retry.
    pub fn submit_score(
        &mut self,
        service: Option<&mut dyn LeaderboardService>,
    ) -> Result<(), LeaderboardError> {
        if self.state != SessionState::GameOver {
            return Err(LeaderboardError::Rejected("no finished run".to_string()));
        }
        if !self.leaderboard.status.can_submit() {
            return Err(LeaderboardError::Rejected("already submitted".to_string()));
        }
        let name = self.leaderboard.name_input.trim().to_string();
        if name.is_empty() {
            return Err(LeaderboardError::EmptyName);
        }
        let score = self.world.player.score;

        if !self.score_recorded {
            self.score_recorded = true;
            if let Some(rank) = self.high_scores.add_score(&name, score) {
                log::info!("{} placed #{} with {}", name, rank, score);
                if let Err(e) = self.persistence.save_high_scores(&self.high_scores) {
                    log::error!("Could not save high scores: {}", e);
                }
            }
        }

        let Some(service) = service else {
            log::warn!("No leaderboard service configured");
            self.leaderboard.status = SaveStatus::NotConfigured;
            return Err(LeaderboardError::NotConfigured);
        };

        self.leaderboard.status = SaveStatus::Saving;
        match service.submit_score(&name, score) {
            Ok(()) => {
                self.leaderboard.status = SaveStatus::Saved;
                self.set_state(SessionState::LeaderboardInput);
                self.refresh_leaderboard(service);
                Ok(())
            }
            Err(e) => {
                log::error!("Leaderboard submit failed: {}", e);
                self.leaderboard.status = SaveStatus::Failed;
                Err(e)
            }
        }
    }

    /// Reload the leaderboard entries; failures keep the previous list
    pub fn refresh_leaderboard(&mut self, service: &mut dyn LeaderboardService) {
        self.leaderboard.loading = true;
        match service.fetch_top_scores(LEADERBOARD_LIMIT) {
            Ok(entries) => self.leaderboard.entries = entries,
            Err(e) => log::error!("Leaderboard fetch failed: {}", e),
        }
        self.leaderboard.loading = false;
    }

    fn collect_world_events(&mut self) {
        for event in self.world.take_events() {
            match event {
                GameEvent::WeaponPickedUp(weapon) => self.loadout.weapon = weapon,
                GameEvent::ShieldPickedUp => self.loadout.shield_ready = true,
                _ => {}
            }
            self.events.push(SessionEvent::Game(event));
        }
    }

    /// Bank the run's gold (once) and show the game-over screen
    fn finish_run(&mut self) {
        let run_gold = self.world.player.gold;
        if !self.ledger.settle_run(run_gold) {
            return;
        }
        self.save_banked_gold();
        self.events.push(SessionEvent::GoldBanked {
            amount: run_gold,
            total: self.ledger.banked(),
        });

        self.loadout.weapon = WeaponType::Single;
        self.leaderboard.status = SaveStatus::Idle;
        log::info!(
            "Run over: score {}, {} gold banked ({} total)",
            self.world.player.score,
            run_gold,
            self.ledger.banked()
        );
        self.set_state(SessionState::GameOver);
    }

    fn save_banked_gold(&mut self) {
        if let Err(e) = self.persistence.save_banked_gold(self.ledger.banked()) {
            log::error!("Could not save banked gold: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::GOLD_KEY;
    use crate::platform::clock::ManualClock;
    use crate::platform::storage::MemoryStore;
    use crate::sim::DeathCause;

    fn calm_tuning() -> Tuning {
        Tuning {
            spawn_base_chance: 0.0,
            spawn_max_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn session_with_gold(gold: u64) -> Session {
        let mut store = MemoryStore::new();
        store.set(GOLD_KEY, &gold.to_string()).unwrap();
        Session::with_tuning(1, calm_tuning(), Box::new(store))
    }

    fn end_run(session: &mut Session) {
        session.world.player.lives = 1;
        session.world.kill_player(DeathCause::FuelEmpty);
        session.frame(&ControlState::new(), &ManualClock::new(0.0));
    }

    struct FailingBoard;

    impl LeaderboardService for FailingBoard {
        fn submit_score(&mut self, _: &str, _: u64) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Transport("offline".to_string()))
        }

        fn fetch_top_scores(&mut self, _: usize) -> Result<Vec<crate::highscores::HighScoreEntry>, LeaderboardError> {
            Err(LeaderboardError::Transport("offline".to_string()))
        }
    }

    #[test]
    fn test_idle_run_fuel_death() {
        let tuning = Tuning {
            fuel_consumption: 1.0,
            ..calm_tuning()
        };
        let mut session = Session::with_tuning(4, tuning, Box::new(MemoryStore::new()));
        assert!(session.start_game());

        let clock = ManualClock::new(0.0);
        for _ in 0..100 {
            session.frame(&ControlState::new(), &clock);
            clock.advance(ManualClock::FRAME_MS);
        }

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.world().player.lives, 4);
        assert_eq!(session.world().player.fuel, MAX_FUEL);
    }

    #[test]
    fn test_game_over_banks_gold_once() {
        let mut session = session_with_gold(10);
        session.start_game();
        session.world.player.gold = 7;
        session.loadout.weapon = WeaponType::Spread;

        end_run(&mut session);
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.ledger().banked(), 17);
        assert_eq!(session.loadout().weapon, WeaponType::Single);

        // Further frames and deaths bank nothing more
        session.world.kill_player(DeathCause::ShotByEnemy);
        session.frame(&ControlState::new(), &ManualClock::new(0.0));
        session.finish_run();
        assert_eq!(session.ledger().banked(), 17);
        assert_eq!(session.persistence.load_banked_gold(), 17);

        let banked = session
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::GoldBanked { .. }))
            .count();
        assert_eq!(banked, 1);
    }

    #[test]
    fn test_purchase_spends_run_gold_first() {
        let mut session = session_with_gold(20);
        session.start_game();
        session.world.player.gold = 5;
        session.toggle_shop();
        assert_eq!(session.displayed_gold(), 25);

        session.buy(ShopItem::WeaponDouble).unwrap();
        assert_eq!(session.world().player.gold, 0);
        assert_eq!(session.ledger().banked(), 10);
        assert_eq!(session.world().player.weapon, WeaponType::Double);
        assert_eq!(session.loadout().weapon, WeaponType::Double);
        assert_eq!(session.persistence.load_banked_gold(), 10);

        assert_eq!(session.buy(ShopItem::WeaponDouble), Err(PurchaseError::AlreadyOwned));
        assert_eq!(
            session.buy(ShopItem::Life),
            Err(PurchaseError::InsufficientGold { cost: 50, available: 10 })
        );
    }

    #[test]
    fn test_shop_freezes_and_resumes() {
        let mut session = session_with_gold(0);
        session.start_game();
        let clock = ManualClock::new(0.0);
        let shop = ControlState::holding(&[Control::ToggleShop]);

        session.frame(&shop, &clock);
        assert_eq!(session.state(), SessionState::Shop);
        let frame = session.world().frame_count;

        // Held key is not a new press
        session.frame(&shop, &clock);
        assert_eq!(session.state(), SessionState::Shop);
        assert_eq!(session.world().frame_count, frame);

        session.frame(&ControlState::new(), &clock);
        session.frame(&shop, &clock);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.world().frame_count, frame + 1);
    }

    #[test]
    fn test_browsing_shop_returns_to_start() {
        let mut session = session_with_gold(100);
        session.toggle_shop();
        assert!(!session.is_mid_run());
        assert_eq!(session.buy(ShopItem::Fuel), Err(PurchaseError::NotApplicable));
        assert_eq!(session.buy_hotkey('4'), Some(Ok(())));
        assert_eq!(session.loadout().extra_lives, 1);
        session.toggle_shop();
        assert_eq!(session.state(), SessionState::Start);
        assert_eq!(session.buy(ShopItem::Nuke), Err(PurchaseError::ShopClosed));
    }

    #[test]
    fn test_loadout_applies_to_next_run() {
        let mut session = session_with_gold(100);
        session.toggle_shop();
        session.buy(ShopItem::Shield).unwrap();
        session.buy(ShopItem::Life).unwrap();
        session.buy(ShopItem::Nuke).unwrap();
        assert_eq!(session.buy(ShopItem::Shield), Err(PurchaseError::AlreadyOwned));
        session.toggle_shop();

        assert!(session.start_game());
        let player = &session.world().player;
        assert_eq!(player.lives, 6);
        assert_eq!(player.nukes, 1);
        assert!(player.invulnerable);
        assert_eq!(player.invulnerable_timer, 900);
        assert!(!session.loadout().shield_ready);
        assert_eq!(session.loadout().extra_lives, 0);
        assert_eq!(session.loadout().nukes, 1);
    }

    #[test]
    fn test_nuke_control_consumes_stock() {
        let mut session = session_with_gold(0);
        session.loadout.nukes = 1;
        session.start_game();
        let clock = ManualClock::new(0.0);
        session.frame(&ControlState::holding(&[Control::ActivateNuke]), &clock);
        assert_eq!(session.world().player.nukes, 0);
        assert_eq!(session.loadout().nukes, 0);
        assert!(!session.activate_nuke());
    }

    #[test]
    fn test_cheat_code() {
        let mut session = session_with_gold(0);
        session.key_typed('o');
        assert_eq!(session.world().player.lives, 5);
        session.start_game();
        for c in "xOgg".chars() {
            session.key_typed(c);
        }
        assert_eq!(session.world().player.lives, CHEAT_LIVES);
    }

    #[test]
    fn test_submit_without_service_records_locally() {
        let mut session = session_with_gold(0);
        session.start_game();
        session.world.player.score = 1200;
        end_run(&mut session);

        assert_eq!(session.submit_score(None), Err(LeaderboardError::EmptyName));
        session.set_name_input("ace");
        assert_eq!(session.submit_score(None), Err(LeaderboardError::NotConfigured));
        assert_eq!(session.leaderboard().status.message(), "Config Error: No DB");
        assert_eq!(session.high_scores().top_score(), Some(1200));
        assert_eq!(session.persistence.load_high_scores().entries[0].name, "ACE");
    }

    #[test]
    fn test_failed_submit_keeps_name_for_retry() {
        let mut session = session_with_gold(0);
        session.start_game();
        session.world.player.score = 300;
        end_run(&mut session);
        session.set_name_input("bob");

        let mut failing = FailingBoard;
        assert!(session.submit_score(Some(&mut failing as &mut dyn LeaderboardService)).is_err());
        assert_eq!(session.leaderboard().status, SaveStatus::Failed);
        assert_eq!(session.leaderboard().name_input, "BOB");
        assert_eq!(session.state(), SessionState::GameOver);

        let mut board = crate::leaderboard::LocalLeaderboard::default();
        session.submit_score(Some(&mut board as &mut dyn LeaderboardService)).unwrap();
        assert_eq!(session.state(), SessionState::LeaderboardInput);
        assert_eq!(session.leaderboard().entries.len(), 1);
        // Local table only recorded the run once
        assert_eq!(session.high_scores().entries.len(), 1);
        assert!(session.start_game());
    }

    #[test]
    fn test_shield_pickup_arms_next_run() {
        use crate::sim::{Enemy, EnemyKind};

        let mut session = session_with_gold(0);
        session.start_game();
        let size = EnemyKind::ShieldItem.size();
        let pos = session.world.player.rect().center() - size * 0.5;
        session
            .world
            .enemies
            .push(Enemy::new(EnemyKind::ShieldItem, pos, glam::Vec2::ZERO, 100.0, 1));

        session.frame(&ControlState::new(), &ManualClock::new(0.0));
        assert!(session.world().player.invulnerable);
        assert!(session.loadout().shield_ready);

        end_run(&mut session);
        assert!(session.start_game());
        assert!(session.world().player.invulnerable);
        assert!(!session.loadout().shield_ready);
    }

    #[test]
    fn test_submit_refused_while_saving() {
        let mut session = session_with_gold(0);
        session.start_game();
        session.world.player.score = 400;
        end_run(&mut session);
        session.set_name_input("eve");
        session.leaderboard.status = SaveStatus::Saving;

        let mut board = crate::leaderboard::LocalLeaderboard::default();
        let result = session.submit_score(Some(&mut board as &mut dyn LeaderboardService));
        assert!(matches!(result, Err(LeaderboardError::Rejected(_))));
        assert!(board.scores().is_empty());
        assert!(session.high_scores().is_empty());
        assert_eq!(session.state(), SessionState::GameOver);
    }
}
