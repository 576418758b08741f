//! # Geocode Verifier
//!
//! Confirms or refutes sanction membership for one seller by reverse
//! geocoding the sell location and matching the place name against each
//! candidate jurisdiction's name variants.
//!
//! The geocoder query depends only on the point, so one successful lookup
//! answers every jurisdiction. A failed lookup is retried once per remaining
//! jurisdiction. As soon as a place name is obtained it is matched against
//! every jurisdiction in catalog order, including those whose own attempt
//! failed, and the first match wins.
//!
//! The seller is [`Verdict::Unresolved`] only when no attempt returned a
//! place name, so that an outage never restores a seller by accident.

use sanctions_core::{Jurisdiction, SanctionedRegion, SellerId};
use sanctions_geocoder::ReverseGeocoder;
use sanctions_state::{SellerRecord, StateError, VisibleType};
use serde::{Deserialize, Serialize};

/// Which jurisdictions to verify a candidate against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Only jurisdictions whose boundary contains the seller's point.
    #[default]
    CoarseMembership,
    /// Every cataloged jurisdiction.
    WholeCatalog,
}

impl VerifyMode {
    /// Config name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoarseMembership => "coarse",
            Self::WholeCatalog => "whole_catalog",
        }
    }
}

impl std::fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coarse" | "coarse_membership" => Ok(Self::CoarseMembership),
            "whole_catalog" | "whole" => Ok(Self::WholeCatalog),
            other => Err(format!("unknown verify mode {other:?}")),
        }
    }
}

/// A lookup that failed for one (seller, jurisdiction) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFailure {
    /// Jurisdiction being checked.
    pub jurisdiction: Jurisdiction,
    /// Geocoder error, rendered.
    pub error: String,
}

/// Outcome of verifying one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The geocoder placed the seller in a sanctioned jurisdiction.
    Sanctioned {
        /// First matching jurisdiction in catalog order.
        jurisdiction: Jurisdiction,
        /// Place name returned by the geocoder.
        place_name: String,
    },
    /// A place name was obtained and matched no jurisdiction.
    Unsanctioned,
    /// Every lookup attempt failed.
    Unresolved {
        /// Failed lookups.
        failures: Vec<LookupFailure>,
    },
}

impl Verdict {
    /// Whether this verdict can drive a Phase B transition.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved { .. })
    }
}

/// Verdict plus the backup type needed by Phase B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Seller.
    pub seller_id: SellerId,
    /// Current type if visible, stored backup if restricted.
    pub backup_type: VisibleType,
    /// Verdict.
    pub verdict: Verdict,
}

/// Geocode verifier.
#[derive(Debug, Clone)]
pub struct Verifier<G> {
    geocoder: G,
    mode: VerifyMode,
}

impl<G: ReverseGeocoder> Verifier<G> {
    /// Create a verifier.
    pub fn new(geocoder: G, mode: VerifyMode) -> Self {
        Self { geocoder, mode }
    }

    /// Configured mode.
    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Jurisdictions to check for a seller, in catalog order, without
    /// duplicates.
    pub fn jurisdictions_for(
        &self,
        seller: &SellerRecord,
        regions: &[SanctionedRegion],
    ) -> Vec<Jurisdiction> {
        let mut out: Vec<Jurisdiction> = Vec::new();
        for r in regions {
            let relevant = match self.mode {
                VerifyMode::CoarseMembership => r.contains(seller.sell_map_center),
                VerifyMode::WholeCatalog => true,
            };
            if relevant && !out.contains(&r.location) {
                out.push(r.location);
            }
        }
        out
    }

    /// Classify one candidate.
    ///
    /// # Errors
    ///
    /// [`StateError::CorruptRecord`] if the seller is restricted without a
    /// backup type; such sellers cannot be classified.
    pub async fn classify(
        &self,
        seller: &SellerRecord,
        regions: &[SanctionedRegion],
    ) -> Result<Classification, StateError> {
        let backup_type = seller.status()?.backup();
        let point = seller.sell_map_center;

        let jurisdictions = self.jurisdictions_for(seller, regions);
        let mut place_name: Option<String> = None;
        let mut failures = Vec::new();

        for &jurisdiction in &jurisdictions {
            match self.geocoder.reverse_geocode(point.lat(), point.lon()).await {
                Ok(name) => {
                    place_name = Some(name);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        seller_id = %seller.seller_id,
                        %jurisdiction,
                        error = %e,
                        "reverse geocode failed"
                    );
                    failures.push(LookupFailure {
                        jurisdiction,
                        error: e.to_string(),
                    });
                }
            }
        }

        let verdict = match place_name {
            Some(name) => jurisdictions
                .iter()
                .find(|j| j.matches_place_name(&name))
                .map_or(Verdict::Unsanctioned, |&jurisdiction| Verdict::Sanctioned {
                    jurisdiction,
                    place_name: name,
                }),
            None if failures.is_empty() => Verdict::Unsanctioned,
            None => Verdict::Unresolved { failures },
        };

        tracing::debug!(seller_id = %seller.seller_id, ?verdict, "classified seller");
        Ok(Classification {
            seller_id: seller.seller_id.clone(),
            backup_type,
            verdict,
        })
    }
}
