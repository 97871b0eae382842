use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The finite set of spot venues this scanner knows how to poll.
///
/// Adding a venue means extending this set and registering an adapter for it
/// in `venue-adapters`; nothing in Stage-1 or Stage-2 names a venue inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueId {
    Binance,
    Bybit,
    Okx,
    Gate,
    Kucoin,
}

impl VenueId {
    pub const ALL: [VenueId; 5] = [
        VenueId::Binance,
        VenueId::Bybit,
        VenueId::Okx,
        VenueId::Gate,
        VenueId::Kucoin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VenueId::Binance => "binance",
            VenueId::Bybit => "bybit",
            VenueId::Okx => "okx",
            VenueId::Gate => "gate",
            VenueId::Kucoin => "kucoin",
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binance" => Ok(VenueId::Binance),
            "bybit" => Ok(VenueId::Bybit),
            "okx" => Ok(VenueId::Okx),
            "gate" => Ok(VenueId::Gate),
            "kucoin" => Ok(VenueId::Kucoin),
            other => Err(format!("unknown venue id: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for venue in VenueId::ALL {
            let parsed: VenueId = venue.to_string().parse().unwrap();
            assert_eq!(parsed, venue);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("BINANCE".parse::<VenueId>().unwrap(), VenueId::Binance);
    }

    #[test]
    fn unknown_venue_is_rejected() {
        assert!("deribit".parse::<VenueId>().is_err());
    }
}
