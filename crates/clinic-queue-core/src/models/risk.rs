//! Triage risk classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a risk tier name does not match any known tier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown risk tier: {0}")]
pub struct RiskParseError(pub String);

/// Risk classification tier, from most to least urgent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    /// Emergency
    #[serde(rename = "Vermelho")]
    Red,
    /// Very urgent
    #[serde(rename = "Amarelo")]
    Yellow,
    /// Standard
    #[serde(rename = "Verde")]
    Green,
    /// Non-urgent
    #[serde(rename = "Azul")]
    Blue,
}

impl RiskLevel {
    /// All tiers, in urgency order. Admission draws uniformly from this list.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Red,
        RiskLevel::Yellow,
        RiskLevel::Green,
        RiskLevel::Blue,
    ];

    /// Label shown on the dashboard and in reports.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Red => "Vermelho",
            RiskLevel::Yellow => "Amarelo",
            RiskLevel::Green => "Verde",
            RiskLevel::Blue => "Azul",
        }
    }

    /// Visual tag used by the presentation layer to color the cell.
    pub fn css_class(&self) -> &'static str {
        match self {
            RiskLevel::Red => "risk-vermelho",
            RiskLevel::Yellow => "risk-amarelo",
            RiskLevel::Green => "risk-verde",
            RiskLevel::Blue => "risk-azul",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = RiskParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RiskLevel::ALL
            .iter()
            .copied()
            .find(|level| level.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RiskParseError(trimmed.to_string()))
    }
}
