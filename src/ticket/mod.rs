//! Downloadable ticket images.
//!
//! The front shows the concert photo cut to a ticket outline with the concert
//! name in the bottom-right corner. The back darkens the same photo and lays
//! out Title, Artist, Audience and Date/Time in a bordered grid.

pub mod export;
pub mod layout;
pub mod mask;
pub mod render;
pub mod text;

use crate::common::error::StageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketFace {
    Front,
    Back,
}

impl fmt::Display for TicketFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketFace::Front => write!(f, "front"),
            TicketFace::Back => write!(f, "back"),
        }
    }
}

impl FromStr for TicketFace {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(TicketFace::Front),
            "back" => Ok(TicketFace::Back),
            other => Err(StageError::validation(format!("unknown ticket face '{}'", other))),
        }
    }
}
