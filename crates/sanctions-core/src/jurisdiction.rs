//! # Sanctioned Jurisdictions
//!
//! The closed set of jurisdictions under trade sanctions, each carrying the
//! place-name variants that a reverse geocoder may return for a location
//! inside it. Declaration order is catalog order: when two boundaries
//! overlap, the jurisdiction declared first is checked first.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A sanctioned jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// Republic of Cuba.
    Cuba,
    /// Islamic Republic of Iran.
    Iran,
    /// Democratic People's Republic of Korea.
    NorthKorea,
    /// Syrian Arab Republic.
    Syria,
    /// Crimea and Sevastopol.
    Crimea,
    /// Occupied Donetsk oblast.
    Donetsk,
    /// Occupied Luhansk oblast.
    Luhansk,
    /// Russian Federation. Wildcard region whose boundary is a multipolygon
    /// split at the antimeridian.
    Russia,
}

impl Jurisdiction {
    /// All jurisdictions in catalog order.
    pub fn all() -> &'static [Jurisdiction] {
        &[
            Self::Cuba,
            Self::Iran,
            Self::NorthKorea,
            Self::Syria,
            Self::Crimea,
            Self::Donetsk,
            Self::Luhansk,
            Self::Russia,
        ]
    }

    /// The canonical snake_case name used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cuba => "cuba",
            Self::Iran => "iran",
            Self::NorthKorea => "north_korea",
            Self::Syria => "syria",
            Self::Crimea => "crimea",
            Self::Donetsk => "donetsk",
            Self::Luhansk => "luhansk",
            Self::Russia => "russia",
        }
    }

    /// Place-name variants, lowercase, as they appear in geocoder output.
    pub fn name_variants(&self) -> &'static [&'static str] {
        match self {
            Self::Cuba => &["cuba"],
            Self::Iran => &["iran", "ایران"],
            Self::NorthKorea => &[
                "north korea",
                "democratic people's republic of korea",
                "dprk",
                "조선민주주의인민공화국",
            ],
            Self::Syria => &["syria", "syrian arab republic", "سوريا"],
            Self::Crimea => &["crimea", "sevastopol", "крым", "севастополь"],
            Self::Donetsk => &["donetsk", "донецк", "донецьк"],
            Self::Luhansk => &["luhansk", "lugansk", "луганск", "луганськ"],
            Self::Russia => &["russia", "russian federation", "россия"],
        }
    }

    /// Whether a geocoded place name mentions this jurisdiction.
    ///
    /// Case-insensitive substring match against every name variant.
    pub fn matches_place_name(&self, place_name: &str) -> bool {
        let haystack = place_name.to_lowercase();
        self.name_variants()
            .iter()
            .any(|variant| haystack.contains(variant))
    }

    /// Whether this region is stored as a multipolygon.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Russia)
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Jurisdiction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|j| j.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownJurisdiction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_roundtrips_through_from_str() {
        for j in Jurisdiction::all() {
            assert_eq!(j.as_str().parse::<Jurisdiction>().unwrap(), *j);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("atlantis".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let v = serde_json::to_value(Jurisdiction::NorthKorea).unwrap();
        assert_eq!(v, "north_korea");
    }

    #[test]
    fn place_name_match_is_case_insensitive() {
        assert!(Jurisdiction::Iran.matches_place_name("Tehran, Iran"));
        assert!(Jurisdiction::Iran.matches_place_name("TEHRAN, IRAN"));
        assert!(Jurisdiction::NorthKorea.matches_place_name("Pyongyang, North Korea"));
        assert!(!Jurisdiction::NorthKorea.matches_place_name("Seoul, South Korea"));
    }

    #[test]
    fn place_name_match_handles_native_scripts() {
        assert!(Jurisdiction::Crimea.matches_place_name("Симферополь, Крым"));
        assert!(Jurisdiction::Iran.matches_place_name("تهران، ایران"));
    }

    #[test]
    fn every_variant_is_lowercase() {
        for j in Jurisdiction::all() {
            for v in j.name_variants() {
                assert_eq!(*v, v.to_lowercase(), "{j}: variant {v} must be lowercase");
            }
        }
    }

    #[test]
    fn only_russia_is_wildcard() {
        let wildcards: Vec<_> = Jurisdiction::all().iter().filter(|j| j.is_wildcard()).collect();
        assert_eq!(wildcards, vec![&Jurisdiction::Russia]);
    }
}
