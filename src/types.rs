// src/types.rs

use std::fmt;
use std::str::FromStr;

use crate::errors::SeqdagError;

/// Ordering method requested by the caller.
///
/// - `Manual`: use the caller-supplied order verbatim; only the coupling
///   matrix is computed.
/// - `SingleSwap` / `TwoSwap` / `HybridSwap`: local search over the coupled
///   partition (optionally multi-start).
/// - `BruteForce` / `BranchAndBound`: exact single-shot optimizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    Manual,
    SingleSwap,
    TwoSwap,
    HybridSwap,
    BruteForce,
    #[default]
    BranchAndBound,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Manual,
        Method::SingleSwap,
        Method::TwoSwap,
        Method::HybridSwap,
        Method::BruteForce,
        Method::BranchAndBound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Manual => "manual",
            Method::SingleSwap => "single-swap",
            Method::TwoSwap => "two-swap",
            Method::HybridSwap => "hybrid-swap",
            Method::BruteForce => "brute-force",
            Method::BranchAndBound => "branch-and-bound",
        }
    }

    /// Whether the method can be run from several random starting points.
    pub fn supports_multi_start(&self) -> bool {
        matches!(
            self,
            Method::SingleSwap | Method::TwoSwap | Method::HybridSwap
        )
    }

    /// Whether the method is guaranteed to return an optimal order.
    pub fn is_exact(&self) -> bool {
        matches!(self, Method::BruteForce | Method::BranchAndBound)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = SeqdagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| SeqdagError::UnknownMethod(s.trim().to_string()))
    }
}
