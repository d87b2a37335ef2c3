//! Identifiants DHL et mode d'exécution

use crate::error::ShipmentError;
use std::fmt;
use std::str::FromStr;

/// Jeu d'identifiants sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestMode {
    /// Compte sandbox standard
    #[default]
    Normal,
    /// Compte sandbox pour imprimante thermique
    ThermoPrinter,
}

/// Mode d'exécution : production ou sandbox
///
/// Le mode par défaut est la production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    Sandbox(TestMode),
}

impl Mode {
    pub fn is_test(&self) -> bool {
        matches!(self, Mode::Sandbox(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Live => write!(f, "live"),
            Mode::Sandbox(TestMode::Normal) => write!(f, "sandbox"),
            Mode::Sandbox(TestMode::ThermoPrinter) => write!(f, "thermo"),
        }
    }
}

impl FromStr for Mode {
    type Err = ShipmentError;

    /// Accepte `live`/`production`, `sandbox`/`test`/`normal` et
    /// `thermo`/`thermoprinter` (insensible à la casse)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" | "production" => Ok(Mode::Live),
            "sandbox" | "test" | "normal" => Ok(Mode::Sandbox(TestMode::Normal)),
            "thermo" | "thermoprinter" | "thermo_printer" => {
                Ok(Mode::Sandbox(TestMode::ThermoPrinter))
            }
            _ => Err(ShipmentError::InvalidSetting {
                name: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Identifiants d'accès à l'API
///
/// `api_user` / `api_password` sont les identifiants du portail développeur
/// (HTTP Basic). `user` / `signature` authentifient le compte client dans le
/// header SOAP. L'EKP est le numéro client DHL à 10 chiffres.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_user: String,
    api_password: String,
    user: String,
    signature: String,
    ekp: String,
}

impl Credentials {
    /// Crée des identifiants avec le compte développeur uniquement
    pub fn new(api_user: impl Into<String>, api_password: impl Into<String>) -> Self {
        Self {
            api_user: api_user.into(),
            api_password: api_password.into(),
            ..Default::default()
        }
    }

    /// Identifiants publics de la sandbox DHL
    ///
    /// Le compte développeur reste vide : il doit toujours venir de
    /// l'appelant (voir [`Credentials::for_sandbox`]).
    pub fn sandbox(test_mode: TestMode) -> Self {
        let (user, ekp) = match test_mode {
            TestMode::Normal => ("2222222222_01", "2222222222"),
            TestMode::ThermoPrinter => ("3333333333_01", "3333333333"),
        };

        Self {
            user: user.to_string(),
            signature: "pass".to_string(),
            ekp: ekp.to_string(),
            ..Default::default()
        }
    }

    /// Remplace le compte client par celui de la sandbox en conservant le
    /// compte développeur
    pub fn for_sandbox(&self, test_mode: TestMode) -> Self {
        Self {
            api_user: self.api_user.clone(),
            api_password: self.api_password.clone(),
            ..Self::sandbox(test_mode)
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_ekp(mut self, ekp: impl Into<String>) -> Self {
        self.ekp = ekp.into();
        self
    }

    pub fn api_user(&self) -> &str {
        &self.api_user
    }

    pub fn set_api_user(&mut self, api_user: impl Into<String>) {
        self.api_user = api_user.into();
    }

    pub fn api_password(&self) -> &str {
        &self.api_password
    }

    pub fn set_api_password(&mut self, api_password: impl Into<String>) {
        self.api_password = api_password.into();
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = user.into();
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn set_signature(&mut self, signature: impl Into<String>) {
        self.signature = signature.into();
    }

    pub fn set_ekp(&mut self, ekp: impl Into<String>) {
        self.ekp = ekp.into();
    }

    /// EKP tel qu'il a été saisi
    pub fn raw_ekp(&self) -> &str {
        &self.ekp
    }

    /// EKP ramené à `len` caractères
    ///
    /// Complété par des zéros à gauche s'il est trop court, tronqué à droite
    /// s'il est trop long.
    pub fn ekp(&self, len: usize) -> String {
        let ekp: String = self.ekp.trim().chars().take(len).collect();
        format!("{ekp:0>len$}")
    }

    /// Numéro de compte de facturation (EKP sur 10 + procédure + participation)
    ///
    /// # Exemple
    ///
    /// ```
    /// use dhlbusiness::{Credentials, TestMode};
    ///
    /// let credentials = Credentials::sandbox(TestMode::Normal);
    /// assert_eq!(credentials.account_number("01", "01"), "22222222220101");
    /// ```
    pub fn account_number(&self, procedure: &str, participation: &str) -> String {
        format!("{}{procedure}{participation}", self.ekp(10))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_user", &self.api_user)
            .field("api_password", &"***")
            .field("user", &self.user)
            .field("signature", &"***")
            .field("ekp", &self.ekp)
            .finish()
    }
}
