//! The fixed weekly timetable grid.
//!
//! A slot is one cell of the grid: a school day (Lundi..Vendredi) and one
//! of eight daily time codes (M1..M4 morning, S1..S4 afternoon). Slots
//! travel as `"<Day>_<Code>"` strings, e.g. `"Lundi_S3"`. Parsing is
//! strict: a malformed slot id is a validation error, never a guess.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::AppError;

/// School day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Lundi,
    Mardi,
    Mercredi,
    Jeudi,
    Vendredi,
}

impl Weekday {
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Lundi => "Lundi",
            Weekday::Mardi => "Mardi",
            Weekday::Mercredi => "Mercredi",
            Weekday::Jeudi => "Jeudi",
            Weekday::Vendredi => "Vendredi",
        }
    }

    pub fn all() -> [Weekday; 5] {
        [
            Weekday::Lundi,
            Weekday::Mardi,
            Weekday::Mercredi,
            Weekday::Jeudi,
            Weekday::Vendredi,
        ]
    }

    /// Lenient decode of a stored day name, defaulting to Lundi.
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(Weekday::Lundi)
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Weekday {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::all()
            .into_iter()
            .find(|day| day.name() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown day: {}", s)))
    }
}

/// Daily time code: M1..M4 before lunch, S1..S4 after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeCode {
    M1,
    M2,
    M3,
    M4,
    S1,
    S2,
    S3,
    S4,
}

impl TimeCode {
    pub fn code(self) -> &'static str {
        match self {
            TimeCode::M1 => "M1",
            TimeCode::M2 => "M2",
            TimeCode::M3 => "M3",
            TimeCode::M4 => "M4",
            TimeCode::S1 => "S1",
            TimeCode::S2 => "S2",
            TimeCode::S3 => "S3",
            TimeCode::S4 => "S4",
        }
    }

    pub fn all() -> [TimeCode; 8] {
        [
            TimeCode::M1,
            TimeCode::M2,
            TimeCode::M3,
            TimeCode::M4,
            TimeCode::S1,
            TimeCode::S2,
            TimeCode::S3,
            TimeCode::S4,
        ]
    }

    /// Lenient decode of a stored time code, defaulting to M1.
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(TimeCode::M1)
    }
}

impl std::fmt::Display for TimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for TimeCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeCode::all()
            .into_iter()
            .find(|code| code.code() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown time code: {}", s)))
    }
}

/// One cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotRef {
    pub day: Weekday,
    pub time: TimeCode,
}

impl SlotRef {
    pub fn new(day: Weekday, time: TimeCode) -> Self {
        Self { day, time }
    }

    /// Lenient decode of a stored slot id, defaulting each malformed
    /// component instead of failing the row.
    pub fn from_db(s: &str) -> Self {
        match s.split_once('_') {
            Some((day, time)) => SlotRef::new(Weekday::from_db(day), TimeCode::from_db(time)),
            None => SlotRef::new(Weekday::from_db(s), TimeCode::M1),
        }
    }
}

impl std::fmt::Display for SlotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.day, self.time)
    }
}

impl std::str::FromStr for SlotRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, time) = s
            .split_once('_')
            .ok_or_else(|| AppError::validation(format!("Invalid slot id: {}", s)))?;
        Ok(SlotRef {
            day: day.parse()?,
            time: time.parse()?,
        })
    }
}

impl Serialize for SlotRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SlotRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(&raw), &"a slot id like Lundi_S3")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_id_round_trips() {
        let slot = SlotRef::new(Weekday::Lundi, TimeCode::S3);
        assert_eq!(slot.to_string(), "Lundi_S3");
        assert_eq!("Lundi_S3".parse::<SlotRef>().unwrap(), slot);
    }

    #[test]
    fn parse_rejects_malformed_slot_ids() {
        assert!("Lundi".parse::<SlotRef>().is_err());
        assert!("Lundi-S3".parse::<SlotRef>().is_err());
        assert!("Dimanche_S3".parse::<SlotRef>().is_err());
        assert!("Lundi_S9".parse::<SlotRef>().is_err());
        assert!("".parse::<SlotRef>().is_err());
    }

    #[test]
    fn slots_order_by_day_then_time() {
        let a = SlotRef::new(Weekday::Lundi, TimeCode::S4);
        let b = SlotRef::new(Weekday::Mardi, TimeCode::M1);
        assert!(a < b);
    }

    #[test]
    fn serde_uses_the_combined_form() {
        let slot = SlotRef::new(Weekday::Vendredi, TimeCode::M3);
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, "\"Vendredi_M3\"");
        let back: SlotRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);

        assert!(serde_json::from_str::<SlotRef>("\"Samedi_M1\"").is_err());
    }
}
