use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Differentiation strategy the questions and the report are framed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PedagogyModel {
    #[default]
    Renzulli,
    Bloom,
    Gardner,
    Purdue,
    Scamper,
    Kaplan,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown pedagogy model: {0}")]
pub struct UnknownModel(pub String);

impl PedagogyModel {
    pub const ALL: [PedagogyModel; 6] = [
        PedagogyModel::Renzulli,
        PedagogyModel::Bloom,
        PedagogyModel::Gardner,
        PedagogyModel::Purdue,
        PedagogyModel::Scamper,
        PedagogyModel::Kaplan,
    ];

    /// Form value used in `<select>` options.
    pub fn slug(&self) -> &'static str {
        match self {
            PedagogyModel::Renzulli => "renzulli",
            PedagogyModel::Bloom => "bloom",
            PedagogyModel::Gardner => "gardner",
            PedagogyModel::Purdue => "purdue",
            PedagogyModel::Scamper => "scamper",
            PedagogyModel::Kaplan => "kaplan",
        }
    }

    /// Human-readable name, passed verbatim into prompts.
    pub fn label(&self) -> &'static str {
        match self {
            PedagogyModel::Renzulli => "Renzulli Enrichment Triad",
            PedagogyModel::Bloom => "Bloom's Taxonomy",
            PedagogyModel::Gardner => "Gardner's Multiple Intelligences",
            PedagogyModel::Purdue => "Purdue Three-Stage Model",
            PedagogyModel::Scamper => "SCAMPER",
            PedagogyModel::Kaplan => "Kaplan Depth and Complexity",
        }
    }
}

impl fmt::Display for PedagogyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PedagogyModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PedagogyModel::ALL
            .into_iter()
            .find(|m| m.slug() == wanted || m.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// School grade, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GradeLevel(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("grade level must be between 1 and 12, got {0}")]
pub struct InvalidGrade(pub i64);

impl GradeLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 12;

    pub fn new(value: u8) -> Result<Self, InvalidGrade> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidGrade(value as i64))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for GradeLevel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for GradeLevel {
    type Error = InvalidGrade;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GradeLevel> for u8 {
    fn from(grade: GradeLevel) -> Self {
        grade.0
    }
}

impl FromStr for GradeLevel {
    type Err = InvalidGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| InvalidGrade(0))?;
        u8::try_from(value)
            .map_err(|_| InvalidGrade(value))
            .and_then(Self::new)
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
