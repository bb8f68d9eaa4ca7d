use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Banner variant. `Flash` and `Legend` are the rate-up galas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    #[default]
    Premium,
    Classic,
    Flash,
    Legend,
}

impl Promotion {
    pub const ALL: [Promotion; 4] = [Promotion::Premium, Promotion::Classic, Promotion::Flash, Promotion::Legend];

    pub fn is_rate_up(&self) -> bool {
        matches!(self, Promotion::Flash | Promotion::Legend)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Promotion::Premium => "premium",
            Promotion::Classic => "classic",
            Promotion::Flash => "flash",
            Promotion::Legend => "legend",
        }
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Promotion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "premium" | "standard" | "normal" => Ok(Promotion::Premium),
            "classic" => Ok(Promotion::Classic),
            "flash" | "flashfest" | "grand" => Ok(Promotion::Flash),
            "legend" | "legfest" => Ok(Promotion::Legend),
            other => Err(anyhow::anyhow!("unknown promotion: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Valentines,
    Summer,
    Halloween,
    Holiday,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Valentines, Season::Summer, Season::Halloween, Season::Holiday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Valentines => "valentines",
            Season::Summer => "summer",
            Season::Halloween => "halloween",
            Season::Holiday => "holiday",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valentines" | "valentine" => Ok(Season::Valentines),
            "summer" => Ok(Season::Summer),
            "halloween" => Ok(Season::Halloween),
            "holiday" | "holidays" | "christmas" => Ok(Season::Holiday),
            other => Err(anyhow::anyhow!("unknown season: {}", other)),
        }
    }
}

/// Which banners an item can appear on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionFlags {
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub classic: bool,
    #[serde(default)]
    pub flash: bool,
    #[serde(default)]
    pub legend: bool,
}

impl PromotionFlags {
    pub fn has(&self, promotion: Promotion) -> bool {
        match promotion {
            Promotion::Premium => self.premium,
            Promotion::Classic => self.classic,
            Promotion::Flash => self.flash,
            Promotion::Legend => self.legend,
        }
    }

    /// Flash or Legend without the evergreen premium/classic flags.
    pub fn is_gala_exclusive(&self) -> bool {
        (self.flash || self.legend) && !(self.premium || self.classic)
    }

    /// Premium wins over classic, classic over the galas.
    pub fn natural(&self) -> Option<Promotion> {
        Promotion::ALL
            .into_iter()
            .find(|p| self.has(*p))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonFlags {
    #[serde(default)]
    pub valentines: bool,
    #[serde(default)]
    pub summer: bool,
    #[serde(default)]
    pub halloween: bool,
    #[serde(default)]
    pub holiday: bool,
}

impl SeasonFlags {
    pub fn has(&self, season: Season) -> bool {
        match season {
            Season::Valentines => self.valentines,
            Season::Summer => self.summer,
            Season::Halloween => self.halloween,
            Season::Holiday => self.holiday,
        }
    }

    pub fn any(&self) -> bool {
        Season::ALL.iter().any(|s| self.has(*s))
    }

    pub fn first(&self) -> Option<Season> {
        Season::ALL.into_iter().find(|s| self.has(*s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gala_exclusive_excludes_evergreen_items() {
        let exclusive = PromotionFlags { flash: true, ..Default::default() };
        let evergreen = PromotionFlags { premium: true, flash: true, legend: true, ..Default::default() };

        assert!(exclusive.is_gala_exclusive());
        assert!(!evergreen.is_gala_exclusive());
        assert_eq!(exclusive.natural(), Some(Promotion::Flash));
        assert_eq!(evergreen.natural(), Some(Promotion::Premium));
    }

    #[test]
    fn test_promotion_aliases() -> anyhow::Result<()> {
        assert_eq!("Standard".parse::<Promotion>()?, Promotion::Premium);
        assert_eq!("legfest".parse::<Promotion>()?, Promotion::Legend);
        assert_eq!("christmas".parse::<Season>()?, Season::Holiday);
        assert!(Promotion::Flash.is_rate_up());
        assert!(!Promotion::Classic.is_rate_up());
        Ok(())
    }
}
