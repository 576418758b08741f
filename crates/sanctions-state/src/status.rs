//! # Seller Status
//!
//! The persisted [`SellerType`] is a flat four-way enum. In memory the engine
//! works with [`SellerStatus`], which carries the backup inside the
//! `Restricted` variant.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// A seller type under which the seller is shown to buyers (subject to the
/// marketplace's own rules for `Test` and `Inactive`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibleType {
    /// Normal trading seller.
    Active,
    /// Test account.
    Test,
    /// Dormant seller.
    Inactive,
}

impl VisibleType {
    /// All visible types.
    pub fn all() -> &'static [VisibleType] {
        &[Self::Active, Self::Test, Self::Inactive]
    }

    /// Storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Test => "test",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for VisibleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VisibleType {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<SellerType>()?.as_visible() {
            Some(v) => Ok(v),
            None => Err(StateError::UnknownSellerType(s.to_string())),
        }
    }
}

/// The seller type column as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerType {
    /// See [`VisibleType::Active`].
    Active,
    /// See [`VisibleType::Test`].
    Test,
    /// See [`VisibleType::Inactive`].
    Inactive,
    /// Hidden because the sell location is in a sanctioned jurisdiction.
    Restricted,
}

impl SellerType {
    /// Storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Test => "test",
            Self::Inactive => "inactive",
            Self::Restricted => "restricted",
        }
    }

    /// The visible type, or `None` for `Restricted`.
    pub fn as_visible(&self) -> Option<VisibleType> {
        match self {
            Self::Active => Some(VisibleType::Active),
            Self::Test => Some(VisibleType::Test),
            Self::Inactive => Some(VisibleType::Inactive),
            Self::Restricted => None,
        }
    }

    /// Whether this is `Restricted`.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted)
    }
}

impl From<VisibleType> for SellerType {
    fn from(v: VisibleType) -> Self {
        match v {
            VisibleType::Active => Self::Active,
            VisibleType::Test => Self::Test,
            VisibleType::Inactive => Self::Inactive,
        }
    }
}

impl std::fmt::Display for SellerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SellerType {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "test" => Ok(Self::Test),
            "inactive" => Ok(Self::Inactive),
            "restricted" => Ok(Self::Restricted),
            other => Err(StateError::UnknownSellerType(other.to_string())),
        }
    }
}

/// Validated seller status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SellerStatus {
    /// Shown under the given type.
    Visible {
        /// Current type.
        seller_type: VisibleType,
    },
    /// Hidden; `previous` is restored when the restriction lifts.
    Restricted {
        /// Type before restriction.
        previous: VisibleType,
    },
}

impl SellerStatus {
    /// Visible status.
    pub fn visible(seller_type: VisibleType) -> Self {
        Self::Visible { seller_type }
    }

    /// The visible type this seller would have if unrestricted: the current
    /// type when visible, the backup when restricted.
    pub fn backup(&self) -> VisibleType {
        match self {
            Self::Visible { seller_type } => *seller_type,
            Self::Restricted { previous } => *previous,
        }
    }

    /// Persisted type.
    pub fn seller_type(&self) -> SellerType {
        match self {
            Self::Visible { seller_type } => (*seller_type).into(),
            Self::Restricted { .. } => SellerType::Restricted,
        }
    }

    /// Whether restricted.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted { .. })
    }

    /// Restrict, keeping any existing backup.
    pub fn restrict(self) -> Self {
        Self::Restricted {
            previous: self.backup(),
        }
    }

    /// Lift a restriction. Visible sellers are unchanged.
    pub fn restore(self) -> Self {
        Self::visible(self.backup())
    }
}
