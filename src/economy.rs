//! Gold, the shop and the carried loadout
//!
//! Gold comes in two pools: gold earned during the current run (on the
//! player) and banked gold that persists between runs. Purchases draw on run
//! gold first when made mid-run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::WeaponType;
use crate::tuning::ShopPrices;

/// Persistent gold balance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoldLedger {
    banked: u64,
    /// A run is in progress and its gold has not been banked yet
    run_open: bool,
}

impl GoldLedger {
    pub fn new(banked: u64) -> Self {
        Self {
            banked,
            run_open: false,
        }
    }

    pub fn banked(&self) -> u64 {
        self.banked
    }

    /// Mark the start of a run whose gold will be banked once
    pub fn open_run(&mut self) {
        self.run_open = true;
    }

    /// Bank the gold of the run in progress.
    ///
    /// Returns false (and banks nothing) if this run was already settled.
    pub fn settle_run(&mut self, run_gold: u64) -> bool {
        if !self.run_open {
            return false;
        }
        self.run_open = false;
        self.banked = self.banked.saturating_add(run_gold);
        true
    }

    /// Pay `cost`, drawing from `run_gold` first when given.
    ///
    /// Nothing is deducted when the combined balance is short.
    pub fn spend(&mut self, cost: u64, run_gold: Option<&mut u64>) -> Result<Payment, PurchaseError> {
        let run_available = run_gold.as_deref().copied().unwrap_or(0);
        let available = self.banked.saturating_add(run_available);
        if available < cost {
            return Err(PurchaseError::InsufficientGold { cost, available });
        }

        let from_run = cost.min(run_available);
        if let Some(run) = run_gold {
            *run -= from_run;
        }
        let from_bank = cost - from_run;
        self.banked -= from_bank;

        Ok(Payment { from_run, from_bank })
    }
}

/// How a purchase was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    pub from_run: u64,
    pub from_bank: u64,
}

/// Items carried into the next run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub weapon: WeaponType,
    /// Shield applied at the start of the next run
    pub shield_ready: bool,
    /// Lives added at the start of the next run
    pub extra_lives: u32,
    pub nukes: u32,
}

/// Shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    Fuel,
    WeaponDouble,
    WeaponHelix,
    WeaponSpread,
    Life,
    Shield,
    Nuke,
}

impl ShopItem {
    pub fn price(&self, prices: &ShopPrices) -> u64 {
        match self {
            ShopItem::Fuel => prices.fuel,
            ShopItem::WeaponDouble => prices.weapon_double,
            ShopItem::WeaponHelix => prices.weapon_helix,
            ShopItem::WeaponSpread => prices.weapon_spread,
            ShopItem::Life => prices.life,
            ShopItem::Shield => prices.shield,
            ShopItem::Nuke => prices.nuke,
        }
    }

    /// Weapon unlocked by this item, if any
    pub fn weapon(&self) -> Option<WeaponType> {
        match self {
            ShopItem::WeaponDouble => Some(WeaponType::Double),
            ShopItem::WeaponHelix => Some(WeaponType::Helix),
            ShopItem::WeaponSpread => Some(WeaponType::Spread),
            _ => None,
        }
    }

    /// Shop hotkey mapping. Fuel is only on sale mid-run, which shifts the
    /// other items one key to the right.
    pub fn from_hotkey(key: char, mid_run: bool) -> Option<Self> {
        const MID_RUN: [ShopItem; 7] = [
            ShopItem::Fuel,
            ShopItem::WeaponDouble,
            ShopItem::WeaponHelix,
            ShopItem::WeaponSpread,
            ShopItem::Life,
            ShopItem::Shield,
            ShopItem::Nuke,
        ];
        let index = key.to_digit(10)?.checked_sub(1)? as usize;
        let items = if mid_run { &MID_RUN[..] } else { &MID_RUN[1..] };
        items.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShopItem::Fuel => "Refuel",
            ShopItem::WeaponDouble => "Double Shot",
            ShopItem::WeaponHelix => "Helix Cannon",
            ShopItem::WeaponSpread => "Spread Shot",
            ShopItem::Life => "Extra Life",
            ShopItem::Shield => "Shield",
            ShopItem::Nuke => "Nuke",
        }
    }
}

/// Why a purchase was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    /// The shop is not open
    ShopClosed,
    InsufficientGold { cost: u64, available: u64 },
    /// Weapon already equipped or shield already pending
    AlreadyOwned,
    /// Item makes no sense right now (e.g. fuel outside a run or with a full tank)
    NotApplicable,
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::ShopClosed => write!(f, "shop is closed"),
            PurchaseError::InsufficientGold { cost, available } => {
                write!(f, "need {} gold, have {}", cost, available)
            }
            PurchaseError::AlreadyOwned => write!(f, "already owned"),
            PurchaseError::NotApplicable => write!(f, "not available right now"),
        }
    }
}

impl std::error::Error for PurchaseError {}
