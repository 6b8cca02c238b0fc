use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profit ledger categories, stored verbatim in `pilot_profit.profit_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfitCategory {
    Trade,
    Bounty,
    Exploration,
    Exobiology,
    Cartography,
}

impl ProfitCategory {
    pub const ALL: [ProfitCategory; 5] = [
        ProfitCategory::Trade,
        ProfitCategory::Bounty,
        ProfitCategory::Exploration,
        ProfitCategory::Exobiology,
        ProfitCategory::Cartography,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfitCategory::Trade => "TRADE",
            ProfitCategory::Bounty => "BOUNTY",
            ProfitCategory::Exploration => "EXPLORATION",
            ProfitCategory::Exobiology => "EXOBIOLOGY",
            ProfitCategory::Cartography => "CARTOGRAPHY",
        }
    }

    /// Human-readable label for summaries.
    pub fn label(self) -> &'static str {
        match self {
            ProfitCategory::Trade => "Trade",
            ProfitCategory::Bounty => "Bounty",
            ProfitCategory::Exploration => "Exploration (data sales)",
            ProfitCategory::Exobiology => "Exobiology",
            ProfitCategory::Cartography => "Cartography",
        }
    }
}

impl fmt::Display for ProfitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfitCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfitCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown profit category: {s}"))
    }
}

/// Material inventory groups as they appear in the `Materials` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    Raw,
    Manufactured,
    Encoded,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 3] = [
        MaterialCategory::Raw,
        MaterialCategory::Manufactured,
        MaterialCategory::Encoded,
    ];

    /// Array key in the `Materials` event; also the stored category value.
    pub fn journal_key(self) -> &'static str {
        match self {
            MaterialCategory::Raw => "Raw",
            MaterialCategory::Manufactured => "Manufactured",
            MaterialCategory::Encoded => "Encoded",
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.journal_key())
    }
}

impl FromStr for MaterialCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialCategory::ALL
            .into_iter()
            .find(|c| c.journal_key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown material category: {s}"))
    }
}
