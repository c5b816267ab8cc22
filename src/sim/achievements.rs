//! Per-run achievements

use serde::{Deserialize, Serialize};

/// Where a run stands, as the achievement checks see it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub score: u64,
    pub dodged: u32,
    /// Uncapped level, 1 at the start of a run
    pub level: u32,
    /// Base speed over start speed
    pub speed_multiplier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Achievement {
    FirstThousand,
    FiveThousandClub,
    /// 10000 points
    PerfectTen,
    /// 10 obstacles dodged
    DodgeMaster,
    ObstacleLegend,
    Untouchable,
    LevelFive,
    DoubleDigits,
    /// Twice the starting speed
    SpeedDemon,
    LightningFast,
}

impl Achievement {
    pub const ALL: [Achievement; 10] = [
        Achievement::FirstThousand,
        Achievement::FiveThousandClub,
        Achievement::PerfectTen,
        Achievement::DodgeMaster,
        Achievement::ObstacleLegend,
        Achievement::Untouchable,
        Achievement::LevelFive,
        Achievement::DoubleDigits,
        Achievement::SpeedDemon,
        Achievement::LightningFast,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn name(self) -> &'static str {
        match self {
            Achievement::FirstThousand => "First Thousand",
            Achievement::FiveThousandClub => "Five Thousand Club",
            Achievement::PerfectTen => "Perfect Ten",
            Achievement::DodgeMaster => "Dodge Master",
            Achievement::ObstacleLegend => "Obstacle Legend",
            Achievement::Untouchable => "Untouchable",
            Achievement::LevelFive => "Level 5 Reached",
            Achievement::DoubleDigits => "Double Digits",
            Achievement::SpeedDemon => "Speed Demon",
            Achievement::LightningFast => "Lightning Fast",
        }
    }

    fn is_met(self, p: &Progress) -> bool {
        match self {
            Achievement::FirstThousand => p.score >= 1_000,
            Achievement::FiveThousandClub => p.score >= 5_000,
            Achievement::PerfectTen => p.score >= 10_000,
            Achievement::DodgeMaster => p.dodged >= 10,
            Achievement::ObstacleLegend => p.dodged >= 50,
            Achievement::Untouchable => p.dodged >= 100,
            Achievement::LevelFive => p.level >= 5,
            Achievement::DoubleDigits => p.level >= 10,
            Achievement::SpeedDemon => p.speed_multiplier >= 2.0,
            Achievement::LightningFast => p.speed_multiplier >= 3.0,
        }
    }
}

/// Set of unlocked achievements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements(u16);

impl Achievements {
    pub fn contains(&self, achievement: Achievement) -> bool {
        self.0 & achievement.bit() != 0
    }

    /// Unlock everything newly earned; each achievement is reported once
    pub fn check(&mut self, progress: &Progress) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        for achievement in Achievement::ALL {
            if !self.contains(achievement) && achievement.is_met(progress) {
                self.0 |= achievement.bit();
                unlocked.push(achievement);
            }
        }
        unlocked
    }

    pub fn iter(&self) -> impl Iterator<Item = Achievement> + '_ {
        Achievement::ALL.into_iter().filter(|a| self.contains(*a))
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
