//! Player and game identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A player's numeric id on the match server.
///
/// The API keys participant maps by the decimal string form of this id,
/// so it deserializes transparently from either a JSON number or a map key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u64);

impl PlayerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for PlayerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Type alias for game ids as reported by the match API
pub type GameId = u64;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_player_id_from_str() {
        assert_eq!("2807".parse::<PlayerId>().unwrap(), PlayerId::new(2807));
        assert_eq!(" 42 \n".parse::<PlayerId>().unwrap(), PlayerId::new(42));
    }

    #[test]
    fn test_player_id_from_str_invalid() {
        assert!("abc".parse::<PlayerId>().is_err());
        assert!("".parse::<PlayerId>().is_err());
        assert!("-3".parse::<PlayerId>().is_err());
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId::new(1234).to_string(), "1234");
    }

    #[test]
    fn test_player_id_debug() {
        let debug_str = format!("{:?}", PlayerId::new(7));
        assert_eq!(debug_str, "PlayerId(7)");
    }

    #[test]
    fn test_player_id_as_json_number() {
        let id: PlayerId = serde_json::from_str("99").unwrap();
        assert_eq!(id.get(), 99);
        assert_eq!(serde_json::to_string(&id).unwrap(), "99");
    }

    #[test]
    fn test_player_id_as_map_key() {
        let map: BTreeMap<PlayerId, u32> =
            serde_json::from_str(r#"{"17": 1, "4": 2}"#).unwrap();
        assert_eq!(map.get(&PlayerId::new(17)), Some(&1));
        assert_eq!(map.get(&PlayerId::new(4)), Some(&2));
    }
}
