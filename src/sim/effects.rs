//! Timed powerup effects
//!
//! One slot per [`EffectKind`]; a slot with `remaining <= 0` is inactive.
//! Re-collecting an effect refreshes its slot to the full duration; neither
//! duration nor magnitude ever stacks.

use serde::{Deserialize, Serialize};

/// Timed effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Multiplies the value of collected coins
    ScoreMultiplier,
    /// Scales world speed by the effect magnitude
    SlowWorld,
    /// Obstacle overlaps do not end the run
    Invincibility,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [
        EffectKind::ScoreMultiplier,
        EffectKind::SlowWorld,
        EffectKind::Invincibility,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            EffectKind::ScoreMultiplier => 0,
            EffectKind::SlowWorld => 1,
            EffectKind::Invincibility => 2,
        }
    }
}

/// Remaining time and magnitude of one effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    /// Seconds left (0 = inactive)
    pub remaining: f32,
    pub magnitude: f32,
}

impl EffectSlot {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    slots: [EffectSlot; 3],
}

impl ActiveEffects {
    /// Start or refresh an effect. Returns true if it was already active.
    pub fn activate(&mut self, kind: EffectKind, duration: f32, magnitude: f32) -> bool {
        let slot = &mut self.slots[kind.index()];
        let refreshed = slot.is_active();
        *slot = EffectSlot {
            remaining: duration.max(0.0),
            magnitude,
        };
        refreshed
    }

    pub fn slot(&self, kind: EffectKind) -> EffectSlot {
        self.slots[kind.index()]
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.slot(kind).is_active()
    }

    pub fn remaining(&self, kind: EffectKind) -> f32 {
        self.slot(kind).remaining.max(0.0)
    }

    /// Magnitude of an active effect
    pub fn magnitude(&self, kind: EffectKind) -> Option<f32> {
        let slot = self.slot(kind);
        slot.is_active().then_some(slot.magnitude)
    }

    /// Coin value multiplier (1.0 when inactive)
    pub fn coin_multiplier(&self) -> f32 {
        self.magnitude(EffectKind::ScoreMultiplier).unwrap_or(1.0)
    }

    /// World speed factor (1.0 when inactive)
    pub fn slow_factor(&self) -> f32 {
        self.magnitude(EffectKind::SlowWorld).unwrap_or(1.0)
    }

    pub fn invincible(&self) -> bool {
        self.is_active(EffectKind::Invincibility)
    }

    /// Count every active effect down by `dt`; returns those that expired
    pub fn decay(&mut self, dt: f32) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        if dt <= 0.0 {
            return expired;
        }
        for kind in EffectKind::ALL {
            let slot = &mut self.slots[kind.index()];
            if !slot.is_active() {
                continue;
            }
            slot.remaining -= dt;
            if slot.remaining <= 0.0 {
                *slot = EffectSlot::default();
                expired.push(kind);
            }
        }
        expired
    }

    /// Active effects with their slots
    pub fn iter_active(&self) -> impl Iterator<Item = (EffectKind, EffectSlot)> + '_ {
        EffectKind::ALL
            .into_iter()
            .map(|kind| (kind, self.slot(kind)))
            .filter(|(_, slot)| slot.is_active())
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}
