use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Item rarity. Stored as `SMALLINT` (1 = R, 2 = SR, 3 = SSR).
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum Rarity {
    R = 1,
    SR = 2,
    SSR = 3,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::R, Rarity::SR, Rarity::SSR];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::R => "R",
            Rarity::SR => "SR",
            Rarity::SSR => "SSR",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" | "1" => Ok(Rarity::R),
            "SR" | "2" => Ok(Rarity::SR),
            "SSR" | "3" => Ok(Rarity::SSR),
            other => Err(anyhow::anyhow!("unknown rarity: {}", other)),
        }
    }
}

/// Per-rarity tally of a batch of draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityCount {
    #[serde(rename = "R")]
    pub r: u64,
    #[serde(rename = "SR")]
    pub sr: u64,
    #[serde(rename = "SSR")]
    pub ssr: u64,
}

impl RarityCount {
    pub fn record(&mut self, rarity: Rarity) {
        match rarity {
            Rarity::R => self.r += 1,
            Rarity::SR => self.sr += 1,
            Rarity::SSR => self.ssr += 1,
        }
    }

    pub fn get(&self, rarity: Rarity) -> u64 {
        match rarity {
            Rarity::R => self.r,
            Rarity::SR => self.sr,
            Rarity::SSR => self.ssr,
        }
    }

    pub fn total(&self) -> u64 {
        self.r + self.sr + self.ssr
    }

    /// Observed share of `rarity`, 0 when nothing has been drawn.
    pub fn rate(&self, rarity: Rarity) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(rarity) as f64 / total as f64,
        }
    }
}

impl Add for RarityCount {
    type Output = RarityCount;

    fn add(self, rhs: RarityCount) -> RarityCount {
        RarityCount {
            r: self.r + rhs.r,
            sr: self.sr + rhs.sr,
            ssr: self.ssr + rhs.ssr,
        }
    }
}

impl AddAssign for RarityCount {
    fn add_assign(&mut self, rhs: RarityCount) {
        *self = *self + rhs;
    }
}
