//! Pet identity chosen during onboarding.
//!
//! Identity is cosmetic: it has no effect on the economy. It is set once by
//! [`PetEconomy::adopt`](crate::PetEconomy::adopt) and cleared by a reset after
//! death, which sends the user back through onboarding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Maximum pet name length, in characters.
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetKind {
    Cat,
    Pufferfish,
    Chicken,
}

impl PetKind {
    pub const ALL: [PetKind; 3] = [PetKind::Cat, PetKind::Pufferfish, PetKind::Chicken];

    pub fn id(&self) -> &'static str {
        match self {
            PetKind::Cat => "cat",
            PetKind::Pufferfish => "pufferfish",
            PetKind::Chicken => "chicken",
        }
    }
}

impl fmt::Display for PetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PetKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PetKind::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "kind".into(),
                message: format!("unknown pet '{s}' (expected cat, pufferfish or chicken)"),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetGender {
    Male,
    Female,
    Other,
}

impl PetGender {
    pub fn label(&self) -> &'static str {
        match self {
            PetGender::Male => "Male",
            PetGender::Female => "Female",
            PetGender::Other => "Other",
        }
    }
}

impl FromStr for PetGender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(PetGender::Male),
            "female" => Ok(PetGender::Female),
            "other" => Ok(PetGender::Other),
            "" => Err(ValidationError::Required {
                field: "gender".into(),
            }),
            _ => Err(ValidationError::InvalidValue {
                field: "gender".into(),
                message: format!("unknown gender '{s}'"),
            }),
        }
    }
}

/// The user's chosen pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetIdentity {
    pub kind: PetKind,
    pub name: String,
    pub gender: PetGender,
}

impl PetIdentity {
    /// Build an identity, trimming and validating the name.
    ///
    /// # Errors
    /// Returns [`ValidationError::Required`] for a blank name and
    /// [`ValidationError::TooLong`] for names over [`MAX_NAME_LEN`] characters.
    pub fn new(kind: PetKind, name: &str, gender: PetGender) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "name".into(),
            });
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name".into(),
                len,
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self {
            kind,
            name: name.to_string(),
            gender,
        })
    }
}
