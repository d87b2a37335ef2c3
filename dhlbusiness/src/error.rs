//! Gestion des erreurs du client d'expédition

use dhlsoap::TransportError;
use thiserror::Error;

/// Type Result personnalisé pour dhlbusiness
pub type Result<T> = std::result::Result<T, ShipmentError>;

/// Erreurs possibles lors de l'utilisation du client
///
/// Les opérations de [`BusinessShipment`](crate::BusinessShipment) ne
/// renvoient jamais ces erreurs directement : elles sont accumulées dans la
/// liste d'erreurs de l'instance.
#[derive(Error, Debug)]
pub enum ShipmentError {
    /// Trop d'éléments dans un seul appel (non bloquant)
    #[error(
        "There are only {max} Request/s for one call allowed for the action \"{action}\"! You tried to request {count} ones"
    )]
    TooManyRequests {
        action: &'static str,
        max: usize,
        count: usize,
    },

    /// Opération n'acceptant qu'une seule expédition
    #[error("{action}: Updating Shipments is a Single-Operation only!")]
    SingleOperationOnly { action: &'static str },

    /// Aucun ordre d'expédition attaché au client
    #[error("{action}: No shipment order attached")]
    NoShipmentOrders { action: &'static str },

    /// Liste de numéros d'expédition vide
    #[error("{action}: No shipment number given")]
    NoShipmentNumbers { action: &'static str },

    /// Timestamp impossible à convertir en date
    #[error("Could not convert given time() value \"{0}\" to YYYY-MM-DD")]
    InvalidTimestamp(i64),

    /// Version d'API non prise en charge (ex: 1.x)
    #[error("API version {0} is not supported (supported major releases: 2, 3)")]
    UnsupportedVersion(String),

    /// Chaîne de version illisible
    #[error("Invalid API version \"{0}\" (expected MAJOR.MINOR[.BUILD])")]
    InvalidVersion(String),

    /// Valeur de réglage inconnue (mode, type de réponse...)
    #[error("Invalid value \"{value}\" for {name}")]
    InvalidSetting { name: &'static str, value: String },

    /// Longueur de champ hors des limites documentées (non bloquant)
    #[error("{field} has {len} characters (allowed: {min} to {max})")]
    FieldLength {
        field: String,
        len: usize,
        min: usize,
        max: usize,
    },

    /// Poids non strictement positif
    #[error("Weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),

    /// Participant utilisé dans un rôle qui ne lui correspond pas
    #[error("A {kind} cannot be used as {role}")]
    ParticipantRole {
        kind: &'static str,
        role: &'static str,
    },

    /// SOAP Fault renvoyé par DHL (message conservé tel quel)
    #[error("{0}")]
    Fault(String),

    /// Erreur de transport (connectivité, sérialisation)
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// Réponse DHL incomplète
    #[error("Unexpected response to {action}: {reason}")]
    InvalidResponse { action: &'static str, reason: String },

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ShipmentError {
    /// Vrai pour les erreurs qui n'empêchent pas l'appel distant
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ShipmentError::TooManyRequests { .. } | ShipmentError::FieldLength { .. }
        )
    }
}
