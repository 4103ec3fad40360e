//! Class levels of the lycée, ordered from lowest to highest.
//!
//! Two label sets exist for the same three levels: the wire labels the
//! frontend speaks (`2nde`, `1ère`, `Terminale`) and the canonical labels
//! used in storage (`SECONDE`, `PREMIERE`, `TERMINALE`). API input is parsed
//! strictly; stored data is decoded leniently so a bad row can never take
//! the matching pipeline down.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// School class level. Derived `Ord` follows declaration order, so
/// `Seconde < Premiere < Terminale` and `>=` expresses "can tutor".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum ClassLevel {
    #[serde(rename = "SECONDE")]
    Seconde,
    #[serde(rename = "PREMIERE")]
    Premiere,
    #[serde(rename = "TERMINALE")]
    Terminale,
}

impl ClassLevel {
    /// Numeric rank: Seconde = 1, Premiere = 2, Terminale = 3.
    pub fn rank(self) -> u8 {
        match self {
            ClassLevel::Seconde => 1,
            ClassLevel::Premiere => 2,
            ClassLevel::Terminale => 3,
        }
    }

    /// Label used by the frontend and in API payloads.
    pub fn wire_label(self) -> &'static str {
        match self {
            ClassLevel::Seconde => "2nde",
            ClassLevel::Premiere => "1ère",
            ClassLevel::Terminale => "Terminale",
        }
    }

    /// Canonical label used in database columns.
    pub fn db_label(self) -> &'static str {
        match self {
            ClassLevel::Seconde => "SECONDE",
            ClassLevel::Premiere => "PREMIERE",
            ClassLevel::Terminale => "TERMINALE",
        }
    }

    /// Strict parse of a wire label. `None` for anything unknown;
    /// callers at the API edge turn that into a validation error.
    pub fn parse_wire(s: &str) -> Option<Self> {
        match s {
            "2nde" => Some(ClassLevel::Seconde),
            "1ère" => Some(ClassLevel::Premiere),
            "Terminale" => Some(ClassLevel::Terminale),
            _ => None,
        }
    }

    /// Lenient decode of a stored label. Unknown labels map to the lowest
    /// level rather than failing the whole query; this is the single place
    /// where that default is applied.
    pub fn from_db(s: &str) -> Self {
        match s {
            "PREMIERE" => ClassLevel::Premiere,
            "TERMINALE" => ClassLevel::Terminale,
            _ => ClassLevel::Seconde,
        }
    }

    /// All levels, lowest first.
    pub fn all() -> [ClassLevel; 3] {
        [ClassLevel::Seconde, ClassLevel::Premiere, ClassLevel::Terminale]
    }
}

impl std::fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.db_label())
    }
}

impl From<&str> for ClassLevel {
    fn from(s: &str) -> Self {
        ClassLevel::from_db(s)
    }
}

impl From<ClassLevel> for String {
    fn from(level: ClassLevel) -> Self {
        level.db_label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_monotonic_with_rank() {
        assert!(ClassLevel::Seconde < ClassLevel::Premiere);
        assert!(ClassLevel::Premiere < ClassLevel::Terminale);

        let ranks: Vec<u8> = ClassLevel::all().iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn wire_labels_round_trip() {
        for level in ClassLevel::all() {
            assert_eq!(ClassLevel::parse_wire(level.wire_label()), Some(level));
        }
    }

    #[test]
    fn strict_wire_parse_rejects_unknown_labels() {
        assert_eq!(ClassLevel::parse_wire("SECONDE"), None);
        assert_eq!(ClassLevel::parse_wire("3ème"), None);
        assert_eq!(ClassLevel::parse_wire(""), None);
    }

    #[test]
    fn db_decode_defaults_to_lowest_level() {
        assert_eq!(ClassLevel::from_db("PREMIERE"), ClassLevel::Premiere);
        assert_eq!(ClassLevel::from_db("TERMINALE"), ClassLevel::Terminale);
        assert_eq!(ClassLevel::from_db("SECONDE"), ClassLevel::Seconde);
        // Unknown stored labels never fail, they rank lowest
        assert_eq!(ClassLevel::from_db("garbage"), ClassLevel::Seconde);
        assert_eq!(ClassLevel::from_db(""), ClassLevel::Seconde);
    }

    #[test]
    fn serde_uses_db_labels() {
        let json = serde_json::to_string(&ClassLevel::Premiere).unwrap();
        assert_eq!(json, "\"PREMIERE\"");
        let back: ClassLevel = serde_json::from_str("\"TERMINALE\"").unwrap();
        assert_eq!(back, ClassLevel::Terminale);
    }
}
