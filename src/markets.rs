use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Market {
    #[serde(rename = "KOSPI")]
    #[strum(serialize = "KOSPI")]
    Kospi,
    #[serde(rename = "KOSDAQ")]
    #[strum(serialize = "KOSDAQ")]
    Kosdaq,
    #[strum(serialize = "Unknown")]
    Unknown,
}

// Listing exchange of the tracked game companies
static TICKER_TO_MARKET: Lazy<HashMap<&'static str, Market>> = Lazy::new(|| {
    HashMap::from([
        ("036570", Market::Kospi),  // NCSoft
        ("251270", Market::Kospi),  // Netmarble
        ("259960", Market::Kospi),  // Krafton
        ("293490", Market::Kospi),  // Kakao Games
        ("181710", Market::Kospi),  // NHN
        ("225570", Market::Kospi),  // Nexon Games
        ("263750", Market::Kosdaq), // Pearl Abyss
        ("078340", Market::Kosdaq), // Com2uS
        ("112040", Market::Kosdaq), // Wemade
        ("095660", Market::Kosdaq), // Neowiz
        ("069080", Market::Kosdaq), // Webzen
    ])
});

/// Exchange for a ticker, `Market::Unknown` when the ticker is not tracked.
pub fn market_for(symbol: &str) -> Market {
    TICKER_TO_MARKET
        .get(symbol)
        .copied()
        .unwrap_or(Market::Unknown)
}

pub fn tracked_symbols() -> Vec<&'static str> {
    let mut symbols: Vec<_> = TICKER_TO_MARKET.keys().copied().collect();
    symbols.sort_unstable();
    symbols
}
