//! # Categories
//! The six fixed dashboard categories and their boosted keyword profiles.
//!
//! Profiles are static tables. Multi-word entries ("vice president") never
//! match a single token; they are kept so the tables read like the topic
//! lists curators maintain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::TrendError;

/// Topical bucket. Declaration order is the fixed analysis/iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Gaming,
    Crypto,
    Stocks,
    Disasters,
    News,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Politics,
        Category::Gaming,
        Category::Crypto,
        Category::Stocks,
        Category::Disasters,
        Category::News,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Gaming => "gaming",
            Category::Crypto => "crypto",
            Category::Stocks => "stocks",
            Category::Disasters => "disasters",
            Category::News => "news",
        }
    }

    /// Keywords whose frequency is doubled before ranking.
    pub fn keyword_profile(self) -> &'static [&'static str] {
        match self {
            Category::Politics => POLITICS,
            Category::Gaming => GAMING,
            Category::Crypto => CRYPTO,
            Category::Stocks => STOCKS,
            Category::Disasters => DISASTERS,
            Category::News => NEWS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TrendError;

    /// Exact, case-sensitive match against the lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TrendError::InvalidCategory(s.to_string()))
    }
}

const POLITICS: &[&str] = &[
    "duterte",
    "marcos",
    "aquino",
    "senate",
    "congress",
    "malacañang",
    "palace",
    "philippine",
    "filipino",
    "manila",
    "quezon",
    "makati",
    "cebu",
    "davao",
    "election",
    "campaign",
    "vote",
    "president",
    "vice president",
    "senator",
    "representative",
    "governor",
    "mayor",
    "barangay",
    "lgu",
    "local government",
];

const GAMING: &[&str] = &[
    "mobile legends",
    "dota",
    "valorant",
    "csgo",
    "league of legends",
    "lol",
    "gaming",
    "esports",
    "tournament",
    "championship",
    "gamer",
    "streamer",
    "youtuber",
    "twitch",
    "facebook gaming",
    "nimo tv",
    "kumu",
    "bigo",
    "mobile game",
    "pc game",
    "console game",
    "playstation",
    "xbox",
    "nintendo",
];

const CRYPTO: &[&str] = &[
    "bitcoin",
    "ethereum",
    "binance",
    "coinbase",
    "cryptocurrency",
    "blockchain",
    "defi",
    "nft",
    "metamask",
    "wallet",
    "exchange",
    "trading",
    "mining",
    "philippine peso",
    "php",
    "usd",
    "stablecoin",
    "altcoin",
    "token",
    "smart contract",
    "web3",
    "dao",
    "yield farming",
    "liquidity",
];

const STOCKS: &[&str] = &[
    "psei",
    "philippine stock exchange",
    "index",
    "market",
    "trading",
    "investing",
    "portfolio",
    "dividend",
    "earnings",
    "revenue",
    "profit",
    "loss",
    "bull market",
    "bear market",
    "volatility",
    "market cap",
    "blue chip",
    "penny stock",
    "ipo",
    "initial public offering",
];

const DISASTERS: &[&str] = &[
    "typhoon",
    "earthquake",
    "flood",
    "landslide",
    "volcano",
    "eruption",
    "tsunami",
    "storm",
    "hurricane",
    "cyclone",
    "natural disaster",
    "emergency",
    "evacuation",
    "relief",
    "aid",
    "rescue",
    "damage",
    "casualty",
    "injury",
    "death",
    "missing",
    "affected",
];

const NEWS: &[&str] = &[
    "breaking",
    "latest",
    "update",
    "report",
    "announcement",
    "statement",
    "press release",
    "official",
    "government",
    "public",
    "community",
    "society",
    "culture",
    "tradition",
    "festival",
    "celebration",
    "event",
];
