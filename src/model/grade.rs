//! Route grades
//!
//! A grade is stored as one ordered raw value (50 = 5.0, 510.1 = 5.10a, ...)
//! and rendered into the regional notations on demand.

use crate::model::ClimbingTypes;
use once_cell::sync::Lazy;
use regex::Regex;

/// Grade notation systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeSystem {
    Yds,
    French,
    Hueco,
    Ewbank,
}

/// Coarse difficulty buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DifficultyLevel {
    VeryEasy,
    Easy,
    Moderate,
    AboveModerate,
    Hard,
    VeryHard,
}

const YDS: &[(f64, &str)] = &[
    (50.0, "5.0"), (51.0, "5.1"), (52.0, "5.2"), (53.0, "5.3"),
    (54.0, "5.4"), (55.0, "5.5"), (56.0, "5.6"), (57.0, "5.7"),
    (58.0, "5.8"), (59.0, "5.9"), (510.1, "5.10a"), (510.2, "5.10b"),
    (510.3, "5.10c"), (510.4, "5.10d"), (511.1, "5.11a"), (511.2, "5.11b"),
    (511.3, "5.11c"), (511.4, "5.11d"), (512.1, "5.12a"), (512.2, "5.12b"),
    (512.3, "5.12c"), (512.4, "5.12d"), (513.1, "5.13a"), (513.2, "5.13b"),
    (513.3, "5.13c"), (513.4, "5.13d"), (514.1, "5.14a"), (514.2, "5.14b"),
    (514.3, "5.14c"), (514.4, "5.14d"), (515.1, "5.15a"), (515.2, "5.15b"),
    (515.3, "5.15c"), (515.4, "5.15d"), (516.1, "5.16a"),
];

const FRENCH: &[(f64, &str)] = &[
    (50.0, "1"), (51.0, "1"), (52.0, "2"), (53.0, "3"),
    (54.0, "4a"), (55.0, "4b"), (56.0, "4c"), (57.0, "5a"),
    (58.0, "5b"), (59.0, "5c"), (510.1, "6a"), (510.2, "6a+"),
    (510.3, "6b"), (510.4, "6b+"), (511.1, "6c"), (511.2, "6c"),
    (511.3, "6c+"), (511.4, "7a"), (512.1, "7a+"), (512.2, "7b"),
    (512.3, "7b+"), (512.4, "7c"), (513.1, "7c+"), (513.2, "8a"),
    (513.3, "8a+"), (513.4, "8b"), (514.1, "8b+"), (514.2, "8c"),
    (514.3, "8c+"), (514.4, "9a"), (515.1, "9a+"), (515.2, "9b"),
    (515.3, "9b+"), (515.4, "9c"), (516.1, "9c+"),
];

const HUECO: &[(f64, &str)] = &[
    (54.0, "V0"), (55.0, "V0+"), (57.0, "V1"), (58.0, "V2"),
    (510.1, "V3"), (510.2, "V3"), (510.3, "V4"), (510.4, "V4"),
    (511.1, "V5"), (511.3, "V5"), (511.4, "V6"), (512.1, "V7"),
    (512.2, "V8"), (512.3, "V8"), (512.4, "V9"), (513.1, "V10"),
    (513.2, "V11"), (513.3, "V12"), (513.4, "V13"), (514.1, "V14"),
    (514.2, "V15"), (514.3, "V16"),
];

const EWBANK: &[(f64, &str)] = &[
    (52.0, "4"), (53.0, "5"), (54.0, "8"), (55.0, "13"), (56.0, "14"), (57.0, "15"),
    (58.0, "16"), (59.0, "17"), (510.1, "18"), (510.2, "19"),
    (510.3, "20"), (510.4, "21"), (511.1, "22"), (511.2, "23"),
    (511.3, "24"), (511.4, "24"), (512.1, "25"), (512.2, "26"),
    (512.3, "27"), (512.4, "28"), (513.1, "29"), (513.2, "29"),
    (513.3, "30"), (513.4, "31"), (514.1, "32"), (514.2, "33"),
    (514.3, "34"), (514.4, "35"), (515.1, "36"), (515.2, "37"),
    (515.3, "38"), (515.4, "39"), (516.1, "40"),
];

static YDS_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)5\.[0-9]{1,2}[abcd]?").unwrap());
static FRENCH_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[1-9][abc]?\+?").unwrap());
static HUECO_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)v[0-9]{1,2}\+?").unwrap());
static EWBANK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// A route difficulty rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteGrade {
    value: f64,
    parsed_climbing: ClimbingTypes,
}

impl RouteGrade {
    pub const MIN_VALUE: f64 = 50.0;
    pub const MAX_VALUE: f64 = 516.1;

    /// Creates a grade from its raw value, clamped into the legal range
    pub fn new(value: f64) -> Self {
        Self {
            value: Self::clamp(value),
            parsed_climbing: ClimbingTypes::NOT_SPECIFIED,
        }
    }

    fn clamp(value: f64) -> f64 {
        if value.is_nan() || value < Self::MIN_VALUE {
            Self::MIN_VALUE
        } else if value > 59.0 && value < 510.0 {
            59.0
        } else if value > Self::MAX_VALUE {
            Self::MAX_VALUE
        } else {
            value
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Climbing type implied by the notation the grade was parsed from
    pub fn parsed_climbing(&self) -> ClimbingTypes {
        self.parsed_climbing
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        match self.value {
            v if v <= 57.0 => DifficultyLevel::VeryEasy,
            v if v < 511.0 => DifficultyLevel::Easy,
            v if v < 512.2 => DifficultyLevel::Moderate,
            v if v < 513.2 => DifficultyLevel::AboveModerate,
            v if v < 514.2 => DifficultyLevel::Hard,
            _ => DifficultyLevel::VeryHard,
        }
    }

    /// Parses a grade written in any supported notation
    ///
    /// Notations are tried in order: YDS, French, Hueco, Ewbank.
    pub fn parse(grade: &str) -> Option<Self> {
        Self::from_notation(grade, GradeSystem::Yds)
            .or_else(|| Self::from_notation(grade, GradeSystem::French))
            .or_else(|| Self::from_notation(grade, GradeSystem::Hueco))
            .or_else(|| Self::from_notation(grade, GradeSystem::Ewbank))
    }

    /// Parses a grade written in the given notation
    pub fn from_notation(grade: &str, system: GradeSystem) -> Option<Self> {
        let grade = grade.trim().to_lowercase();
        if grade.is_empty() {
            return None;
        }

        let (table, token, max_len, climbing) = match system {
            GradeSystem::Yds => (YDS, &*YDS_TOKEN, 5, ClimbingTypes::SPORT),
            GradeSystem::French => (FRENCH, &*FRENCH_TOKEN, 3, ClimbingTypes::SPORT),
            GradeSystem::Hueco => (HUECO, &*HUECO_TOKEN, 3, ClimbingTypes::BOULDERING),
            GradeSystem::Ewbank => (EWBANK, &*EWBANK_TOKEN, 3, ClimbingTypes::SPORT),
        };

        // Long cells carry extra text ("5.10a R", "6a+ (soft)")
        let candidate = if grade.chars().count() > max_len {
            token
                .find(&grade)
                .map(|m| m.as_str().to_string())
                .unwrap_or(grade)
        } else {
            grade
        };

        table
            .iter()
            .find(|(_, label)| label.eq_ignore_ascii_case(&candidate))
            .map(|(value, _)| Self {
                value: *value,
                parsed_climbing: climbing,
            })
    }

    pub fn to_notation(&self, system: GradeSystem) -> &'static str {
        let table = match system {
            GradeSystem::Yds => YDS,
            GradeSystem::French => FRENCH,
            GradeSystem::Hueco => HUECO,
            GradeSystem::Ewbank => EWBANK,
        };
        table
            .iter()
            .find(|(value, _)| *value == self.value)
            .map(|(_, label)| *label)
            .unwrap_or("-")
    }

    pub fn to_yds(&self) -> &'static str {
        self.to_notation(GradeSystem::Yds)
    }

    pub fn to_french(&self) -> &'static str {
        self.to_notation(GradeSystem::French)
    }

    pub fn to_hueco(&self) -> &'static str {
        self.to_notation(GradeSystem::Hueco)
    }

    pub fn to_ewbank(&self) -> &'static str {
        self.to_notation(GradeSystem::Ewbank)
    }
}
