//! Taught subjects, a closed vocabulary.
//!
//! The canonical French names are used on the wire and in storage.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// A subject a tutor can offer help in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Subject {
    #[serde(rename = "Mathématiques")]
    Mathematiques,
    #[serde(rename = "Physique-Chimie")]
    PhysiqueChimie,
    #[serde(rename = "Français")]
    Francais,
    #[serde(rename = "Anglais")]
    Anglais,
    #[serde(rename = "Histoire-Géo")]
    HistoireGeo,
    #[serde(rename = "SVT")]
    Svt,
}

impl Subject {
    /// Canonical name, identical on the wire and in storage.
    pub fn name(self) -> &'static str {
        match self {
            Subject::Mathematiques => "Mathématiques",
            Subject::PhysiqueChimie => "Physique-Chimie",
            Subject::Francais => "Français",
            Subject::Anglais => "Anglais",
            Subject::HistoireGeo => "Histoire-Géo",
            Subject::Svt => "SVT",
        }
    }

    /// Lenient decode of a stored name. Unknown names fall back to the
    /// first subject; rows only reach storage through validated input,
    /// so the fallback is a safety net, not a code path.
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(Subject::Mathematiques)
    }

    /// All subjects in display order.
    pub fn all() -> [Subject; 6] {
        [
            Subject::Mathematiques,
            Subject::PhysiqueChimie,
            Subject::Francais,
            Subject::Anglais,
            Subject::HistoireGeo,
            Subject::Svt,
        ]
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Subject {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::all()
            .into_iter()
            .find(|subject| subject.name() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown subject: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for subject in Subject::all() {
            let parsed: Subject = subject.name().parse().unwrap();
            assert_eq!(parsed, subject);
        }
    }

    #[test]
    fn parse_rejects_unknown_subject() {
        assert!("Philosophie".parse::<Subject>().is_err());
        assert!("".parse::<Subject>().is_err());
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Subject::HistoireGeo).unwrap();
        assert_eq!(json, "\"Histoire-Géo\"");
        let back: Subject = serde_json::from_str("\"SVT\"").unwrap();
        assert_eq!(back, Subject::Svt);
    }
}
