//! Version de l'API DHL et schéma filaire associé

use crate::error::{Result, ShipmentError};
use std::fmt;
use std::str::FromStr;

/// Version la plus récente prise en charge
pub const NEWEST_VERSION: &str = "3.2.2";

/// Famille de schéma filaire, déterminée par la version majeure
///
/// L'ensemble est fermé : une version majeure sans schéma (ex: 1) est
/// refusée avant tout appel distant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    V2,
    V3,
}

impl Schema {
    /// Namespace des éléments de requête (`bcs:`)
    pub fn namespace(self) -> &'static str {
        match self {
            Schema::V2 => "http://dhl.de/webservices/businesscustomershipping",
            Schema::V3 => "http://dhl.de/webservices/businesscustomershipping/3.0",
        }
    }

    /// `labelFormat` et `labelFormatRetoure` n'existent qu'à partir de 3.x
    pub fn supports_label_format(self) -> bool {
        matches!(self, Schema::V3)
    }
}

/// Version d'API au format `MAJOR.MINOR[.BUILD]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    major: u32,
    minor: u32,
    build: Option<u32>,
}

impl ApiVersion {
    pub fn new(major: u32, minor: u32, build: Option<u32>) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    /// Version [`NEWEST_VERSION`]
    pub fn newest() -> Self {
        Self::new(3, 2, Some(2))
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn build(&self) -> Option<u32> {
        self.build
    }

    /// Schéma filaire de cette version
    ///
    /// # Errors
    ///
    /// [`ShipmentError::UnsupportedVersion`] si la version majeure n'a pas
    /// de schéma (tout ce qui n'est pas 2.x ou 3.x).
    pub fn schema(&self) -> Result<Schema> {
        match self.major {
            2 => Ok(Schema::V2),
            3 => Ok(Schema::V3),
            _ => Err(ShipmentError::UnsupportedVersion(self.to_string())),
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::newest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        Ok(())
    }
}

impl FromStr for ApiVersion {
    type Err = ShipmentError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ShipmentError::InvalidVersion(s.to_string());

        let parts = s
            .trim()
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, None)),
            [major, minor, build] => Ok(Self::new(*major, *minor, Some(*build))),
            _ => Err(invalid()),
        }
    }
}
