//! Rank tracks and their level names.
//!
//! Index values are the integers the game writes into `Rank`, `Promotion`
//! and `Progress` events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How progress toward the next level is reported for a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStyle {
    /// Pilots Federation ranks: percentage toward the next rank.
    Percentage,
    /// Navy ranks: reputation leveling toward the next title.
    Superpower,
}

/// A closed set of rank tracks recorded per pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankTrack {
    Combat,
    Trade,
    Explore,
    Cqc,
    Federation,
    Empire,
}

const COMBAT_LEVELS: &[&str] = &[
    "Harmless",
    "Mostly Harmless",
    "Novice",
    "Competent",
    "Expert",
    "Master",
    "Dangerous",
    "Deadly",
    "Elite",
];

const TRADE_LEVELS: &[&str] = &[
    "Penniless",
    "Mostly Penniless",
    "Dealer",
    "Merchant",
    "Broker",
    "Entrepreneur",
    "Tycoon",
    "Elite",
    "Elite I",
    "Elite II",
    "Elite III",
    "Elite IV",
    "Elite V",
];

const EXPLORE_LEVELS: &[&str] = &[
    "Aimless",
    "Mostly Aimless",
    "Scout",
    "Surveyor",
    "Trailblazer",
    "Pathfinder",
    "Pioneer",
    "Elite",
    "Elite I",
    "Elite II",
    "Elite III",
    "Elite IV",
    "Elite V",
];

const CQC_LEVELS: &[&str] = &[
    "Helpless",
    "Mostly Helpless",
    "Amateur",
    "Semi-Pro",
    "Professional",
    "Champion",
    "Hero",
    "Legend",
    "Elite",
];

const FEDERATION_LEVELS: &[&str] = &[
    "None",
    "Recruit",
    "Cadet",
    "Midshipman",
    "Petty Officer",
    "Chief Petty Officer",
    "Warrant Officer",
    "Ensign",
    "Lieutenant",
    "Lt. Commander",
    "Post Commander",
    "Post Captain",
    "Rear Admiral",
    "Vice Admiral",
    "Admiral",
];

const EMPIRE_LEVELS: &[&str] = &[
    "None", "Outsider", "Serf", "Master", "Squire", "Knight", "Lord", "Baron", "Viscount", "Count",
    "Earl", "Marquis", "Duke", "Prince", "King",
];

impl RankTrack {
    pub const ALL: [RankTrack; 6] = [
        RankTrack::Combat,
        RankTrack::Trade,
        RankTrack::Explore,
        RankTrack::Cqc,
        RankTrack::Federation,
        RankTrack::Empire,
    ];

    /// Key used for this track inside journal events.
    pub fn journal_key(self) -> &'static str {
        match self {
            RankTrack::Combat => "Combat",
            RankTrack::Trade => "Trade",
            RankTrack::Explore => "Explore",
            RankTrack::Cqc => "CQC",
            RankTrack::Federation => "Federation",
            RankTrack::Empire => "Empire",
        }
    }

    /// Column suffix in `pilot_status` (`rank_<suffix>`, `progress_<suffix>`).
    pub fn column_suffix(self) -> &'static str {
        match self {
            RankTrack::Combat => "combat",
            RankTrack::Trade => "trade",
            RankTrack::Explore => "explore",
            RankTrack::Cqc => "cqc",
            RankTrack::Federation => "federation",
            RankTrack::Empire => "empire",
        }
    }

    pub fn levels(self) -> &'static [&'static str] {
        match self {
            RankTrack::Combat => COMBAT_LEVELS,
            RankTrack::Trade => TRADE_LEVELS,
            RankTrack::Explore => EXPLORE_LEVELS,
            RankTrack::Cqc => CQC_LEVELS,
            RankTrack::Federation => FEDERATION_LEVELS,
            RankTrack::Empire => EMPIRE_LEVELS,
        }
    }

    pub fn progress_style(self) -> ProgressStyle {
        match self {
            RankTrack::Federation | RankTrack::Empire => ProgressStyle::Superpower,
            _ => ProgressStyle::Percentage,
        }
    }

    /// Highest valid rank index for this track.
    pub fn max_index(self) -> i64 {
        self.levels().len() as i64 - 1
    }

    pub fn level_name(self, index: i64) -> Option<&'static str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.levels().get(i).copied())
    }

    /// Name of the level after `index`, or `None` at the top of the track.
    pub fn next_level_name(self, index: i64) -> Option<&'static str> {
        if self.is_max(index) {
            return None;
        }
        self.level_name(index + 1)
    }

    pub fn is_max(self, index: i64) -> bool {
        index >= self.max_index()
    }

    /// Clamp a raw index from the journal into the valid range.
    pub fn clamp_index(self, index: i64) -> i64 {
        index.clamp(0, self.max_index())
    }

    pub fn from_journal_key(key: &str) -> Option<RankTrack> {
        RankTrack::ALL.into_iter().find(|t| t.journal_key() == key)
    }
}

impl fmt::Display for RankTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.journal_key())
    }
}
