//! Place attributes shared by areas, sectors and routes
//!
//! Climbing types and seasons are bit sets stored as plain integers in the
//! staged files and the primary store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

macro_rules! place_flags {
    (
        $(#[$meta:meta])*
        $name:ident { $($flag:ident = $bits:expr, $label:literal;)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const NOT_SPECIFIED: Self = Self(0);
            $(pub const $flag: Self = Self($bits);)+

            const ALL_BITS: u32 = 0 $(| $bits)+;
            const NAMED: &'static [(&'static str, Self)] = &[$(($label, Self::$flag)),+];

            /// Builds a flag set from raw bits, dropping unknown bits
            pub fn from_bits(bits: u32) -> Self {
                Self(bits & Self::ALL_BITS)
            }

            pub fn bits(self) -> u32 {
                self.0
            }

            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Matches a single flag by name, case-insensitively
            pub fn from_name(name: &str) -> Option<Self> {
                Self::NAMED
                    .iter()
                    .find(|(label, _)| label.eq_ignore_ascii_case(name))
                    .map(|(_, flag)| *flag)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_empty() {
                    return write!(f, "NotSpecified");
                }
                let names: Vec<&str> = Self::NAMED
                    .iter()
                    .filter(|(_, flag)| self.contains(*flag))
                    .map(|(label, _)| *label)
                    .collect();
                write!(f, "{}", names.join(", "))
            }
        }
    };
}

place_flags! {
    /// Kinds of climbing offered by a place or route
    ClimbingTypes {
        SPORT = 1, "Sport";
        TRAD = 2, "Trad";
        BOULDERING = 4, "Bouldering";
    }
}

place_flags! {
    /// Best climbing seasons of a place
    Seasons {
        AUTUMN = 1, "Autumn";
        WINTER = 2, "Winter";
        SPRING = 4, "Spring";
        SUMMER = 8, "Summer";
    }
}

/// Geographical coordinates of a place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Creates a location, rejecting latitudes outside [-90, 90]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !latitude.is_finite() || !longitude.is_finite()
        {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    /// Parses the staged `"lat,long"` form
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(',').map(str::trim).filter(|p| !p.is_empty());
        let latitude = parts.next()?.parse::<f64>().ok()?;
        let longitude = parts.next()?.parse::<f64>().ok()?;
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let mut climbing = ClimbingTypes::SPORT;
        climbing |= ClimbingTypes::BOULDERING;

        assert_eq!(climbing.bits(), 5);
        assert!(climbing.contains(ClimbingTypes::SPORT));
        assert!(!climbing.contains(ClimbingTypes::TRAD));
        assert_eq!(climbing.to_string(), "Sport, Bouldering");
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Seasons::from_name("spring"), Some(Seasons::SPRING));
        assert_eq!(Seasons::from_name("SUMMER"), Some(Seasons::SUMMER));
        assert_eq!(Seasons::from_name("monsoon"), None);
        assert_eq!(ClimbingTypes::from_name("trad"), Some(ClimbingTypes::TRAD));
    }

    #[test]
    fn test_from_bits_masks_unknown() {
        assert_eq!(Seasons::from_bits(0xff).bits(), 15);
        assert!(ClimbingTypes::from_bits(8).is_empty());
    }

    #[test]
    fn test_location_latitude_bounds() {
        assert!(Location::new(90.0, 10.0).is_some());
        assert!(Location::new(-90.5, 10.0).is_none());
        assert!(Location::new(120.0, 10.0).is_none());
    }

    #[test]
    fn test_location_parse_and_display() {
        let location = Location::parse("41.25, 0.93").unwrap();
        assert_eq!(location.latitude, 41.25);
        assert_eq!(location.to_string(), "41.25,0.93");

        assert!(Location::parse("").is_none());
        assert!(Location::parse("95,10").is_none());
        assert!(Location::parse("abc,10").is_none());
    }
}
