//! Canonical entity names.
//!
//! RULE: every name that enters the sandbox (events, topology, codec) goes
//! through exactly one normalisation function for its kind. The newtypes
//! below can only be built through those functions, serde included, so two
//! names are equal only when their canonical forms are.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical form for sections, signals and indicators.
pub fn normalize_object_name(raw: &str) -> String {
    raw.trim().replace("&sol;", "/").to_uppercase()
}

/// Canonical `SW<id>` form for switches. `"1"`, `"sw1"` and `"SW1"` agree.
pub fn normalize_switch_name(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    let id = match s.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("sw") => &s[2..],
        _ => s,
    };
    format!("SW{id}").to_uppercase()
}

/// Object name from a metadata reference such as `Station/Sections/1-3СП`.
pub fn name_from_ref(reference: &str) -> String {
    let tail = reference.rsplit('/').next().unwrap_or(reference);
    normalize_object_name(tail)
}

macro_rules! canonical_name {
    ($(#[$meta:meta])* $name:ident, $normalize:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: &str) -> Self {
                Self($normalize(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(&raw)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

canonical_name!(
    /// A track-circuit section ("RC").
    SectionName,
    normalize_object_name
);
canonical_name!(
    /// A switch, always in `SW<id>` form.
    SwitchName,
    normalize_switch_name
);
canonical_name!(SignalName, normalize_object_name);
canonical_name!(IndicatorName, normalize_object_name);
