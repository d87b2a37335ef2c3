//! Extension pour lire la configuration DHL depuis dhlconfig
//!
//! Ce module fournit le trait `BusinessShipmentConfigExt` qui ajoute à
//! `dhlconfig::Config` la lecture et l'écriture de la section `dhl` :
//!
//! ```yaml
//! dhl:
//!   mode: sandbox          # live | sandbox | thermo
//!   version: "3.2.2"
//!   label_response_type: URL
//!   custom_api_url: ""
//!   timeout_secs: 30
//!   credentials:
//!     api_user: ...
//!     api_password: ...
//!     user: ...
//!     signature: ...
//!     ekp: "6299999999"
//! ```
//!
//! `api_password` et `signature` sont écrits chiffrés (`encrypted:...`, voir
//! [`dhlconfig::encryption`]) et déchiffrés à la lecture. Une valeur saisie en
//! clair dans le fichier est acceptée telle quelle.
//!
//! # Exemple
//!
//! ```no_run
//! use dhlbusiness::{BusinessShipment, BusinessShipmentConfigExt};
//!
//! # fn main() -> Result<(), dhlbusiness::ShipmentError> {
//! let config = dhlconfig::get_config();
//! println!("DHL mode: {}", config.get_dhl_mode()?);
//!
//! let mut dhl = BusinessShipment::from_config(&config)?;
//! let version = dhl.get_version(false, true, false);
//! # Ok(())
//! # }
//! ```

use crate::business_shipment::{BusinessShipment, BusinessShipmentBuilder};
use crate::credentials::{Credentials, Mode, TestMode};
use crate::error::ShipmentError;
use crate::shipment::LabelResponseType;
use crate::version::ApiVersion;
use anyhow::{Result, anyhow};
use dhlconfig::{Config, encryption};
use dhlsoap::DEFAULT_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::time::Duration;

/// Section `dhl.credentials` telle qu'écrite dans le fichier
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CredentialsSection {
    api_user: String,
    api_password: String,
    user: String,
    signature: String,
    ekp: String,
}

/// Trait d'extension pour gérer la configuration DHL dans dhlconfig
///
/// Les valeurs vides ou absentes sont considérées comme non définies et
/// remplacées par les valeurs par défaut du client.
pub trait BusinessShipmentConfigExt {
    /// Identifiants (`dhl.credentials.*`)
    fn get_dhl_credentials(&self) -> Result<Credentials>;

    /// Enregistre les identifiants, mot de passe et signature chiffrés
    fn set_dhl_credentials(&self, credentials: &Credentials) -> Result<()>;

    /// Mode d'exécution
    ///
    /// Une valeur vide vaut sandbox : un fichier de configuration neuf ne
    /// doit pas viser la production.
    fn get_dhl_mode(&self) -> Result<Mode>;

    fn set_dhl_mode(&self, mode: Mode) -> Result<()>;

    /// Version d'API (défaut : la plus récente)
    fn get_dhl_version(&self) -> Result<ApiVersion>;

    /// Type de réponse des étiquettes, s'il est défini
    fn get_dhl_label_response_type(&self) -> Result<Option<LabelResponseType>>;

    /// URL remplaçant les endpoints DHL, si elle est définie
    fn get_dhl_custom_api_url(&self) -> Result<Option<String>>;

    /// Timeout HTTP en secondes (défaut : 30)
    fn get_dhl_timeout_secs(&self) -> Result<u64>;
}

impl BusinessShipmentConfigExt for Config {
    fn get_dhl_credentials(&self) -> Result<Credentials> {
        let field = |name: &str| -> Result<String> {
            Ok(self
                .get_string(&["dhl", "credentials", name])?
                .unwrap_or_default())
        };

        let secret = |name: &str| -> Result<String> {
            encryption::get_secret(&field(name)?)
                .map_err(|e| anyhow!("Failed to decrypt dhl.credentials.{}: {}", name, e))
        };

        Ok(Credentials::new(field("api_user")?, secret("api_password")?)
            .with_user(field("user")?)
            .with_signature(secret("signature")?)
            .with_ekp(field("ekp")?))
    }

    fn set_dhl_credentials(&self, credentials: &Credentials) -> Result<()> {
        let section = CredentialsSection {
            api_user: credentials.api_user().to_string(),
            api_password: encryption::seal_secret(credentials.api_password())?,
            user: credentials.user().to_string(),
            signature: encryption::seal_secret(credentials.signature())?,
            ekp: credentials.raw_ekp().to_string(),
        };
        self.set_value(&["dhl", "credentials"], serde_yaml::to_value(&section)?)
    }

    fn get_dhl_mode(&self) -> Result<Mode> {
        match self.get_string(&["dhl", "mode"])? {
            Some(mode) => Ok(mode.parse()?),
            None => Ok(Mode::Sandbox(TestMode::Normal)),
        }
    }

    fn set_dhl_mode(&self, mode: Mode) -> Result<()> {
        self.set_value(&["dhl", "mode"], Value::String(mode.to_string()))
    }

    fn get_dhl_version(&self) -> Result<ApiVersion> {
        match self.get_string(&["dhl", "version"])? {
            Some(version) => Ok(version.parse()?),
            None => Ok(ApiVersion::newest()),
        }
    }

    fn get_dhl_label_response_type(&self) -> Result<Option<LabelResponseType>> {
        self.get_string(&["dhl", "label_response_type"])?
            .map(|t| t.parse::<LabelResponseType>())
            .transpose()
            .map_err(Into::into)
    }

    fn get_dhl_custom_api_url(&self) -> Result<Option<String>> {
        self.get_string(&["dhl", "custom_api_url"])
    }

    fn get_dhl_timeout_secs(&self) -> Result<u64> {
        match self.get_value(&["dhl", "timeout_secs"]) {
            Ok(Value::Number(n)) => Ok(n.as_u64().unwrap_or(DEFAULT_TIMEOUT_SECS)),
            _ => Ok(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BusinessShipmentBuilder {
    /// Builder prérempli depuis la section `dhl` de la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Self::new(config.get_dhl_credentials()?)
            .mode(config.get_dhl_mode()?)
            .version(config.get_dhl_version()?.to_string())
            .timeout(Duration::from_secs(config.get_dhl_timeout_secs()?));

        if let Some(response_type) = config.get_dhl_label_response_type()? {
            builder = builder.label_response_type(response_type);
        }
        if let Some(url) = config.get_dhl_custom_api_url()? {
            builder = builder.custom_api_url(url);
        }
        Ok(builder)
    }
}

impl BusinessShipment {
    /// Client HTTP configuré depuis la section `dhl` de la configuration
    pub fn from_config(config: &Config) -> Result<Self, ShipmentError> {
        BusinessShipmentBuilder::from_config(config)?.build()
    }
}
