//! Type-safe identifier wrappers.
//!
//! Vessels and routes are keyed by the relational store's `BIGSERIAL`
//! primary keys, so their identifiers wrap an `i64`. Simulation runs are
//! purely in-memory and use UUID v7 (time-ordered) identifiers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a database key with standard derives.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub i64);

        impl $name {
            /// Return the inner key value.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_key! {
    /// Identifier of a vessel record.
    VesselId
}

define_key! {
    /// Identifier of a route record.
    RouteId
}

/// Identifier of a single simulation run.
///
/// A vessel that is stopped and started again gets a fresh run id, which
/// lets a finishing run deregister itself without touching its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationRunId(pub Uuid);

impl SimulationRunId {
    /// Create a new run identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SimulationRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SimulationRunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn vessel_id_parses_from_path_segment() {
        let id: VesselId = " 42".parse().unwrap();
        assert_eq!(id, VesselId(42));
        assert!("forty-two".parse::<VesselId>().is_err());
    }

    #[test]
    fn keys_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&RouteId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(SimulationRunId::new(), SimulationRunId::new());
    }
}
