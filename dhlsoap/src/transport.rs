//! Point d'injection du transport SOAP
//!
//! Le client d'expédition ne parle jamais HTTP directement : il remet une
//! [`SoapRequest`] à un [`SoapTransport`] et reçoit soit le contenu du Body,
//! soit un [`SoapFault`]. Les tests injectent un transport en mémoire.

use crate::{SoapFault, SoapParseError};
use thiserror::Error;
use xmltree::Element;

/// Identifiants HTTP Basic (compte développeur du portail)
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Un appel SOAP prêt à être envoyé
#[derive(Debug, Clone)]
pub struct SoapRequest<'a> {
    /// URL du service (sandbox, production ou personnalisée)
    pub endpoint: &'a str,

    /// Nom de la méthode distante (ex: "createShipmentOrder")
    pub action: &'a str,

    /// Authentification HTTP Basic optionnelle
    pub basic_auth: Option<BasicAuth>,

    /// Contenu du Header SOAP (authentification hors corps)
    pub header: Option<Element>,

    /// Élément de requête placé dans le Body
    pub payload: Element,
}

/// Réponse d'un appel SOAP
#[derive(Debug, Clone)]
pub enum SoapReply {
    /// Premier élément du Body
    Body(Element),

    /// Le serveur a répondu par un SOAP Fault
    Fault(SoapFault),
}

/// Erreurs de transport (connectivité, sérialisation, réponse illisible)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build SOAP request: {0}")]
    Build(#[from] xmltree::Error),

    #[error("HTTP error when sending SOAP request to {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Invalid SOAP response: {0}")]
    Parse(#[from] SoapParseError),

    #[error("SOAP response has an empty Body")]
    EmptyBody,

    #[error("HTTP status {status} with non-SOAP body: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Transport capable d'exécuter un appel SOAP
///
/// Une instance n'est pas prévue pour être partagée entre threads : elle
/// conserve la dernière requête et la dernière réponse pour diagnostic.
pub trait SoapTransport {
    /// Envoie la requête et renvoie le Body ou le Fault
    fn call(&mut self, request: SoapRequest<'_>) -> Result<SoapReply, TransportError>;

    /// XML de la dernière requête envoyée
    fn last_request(&self) -> Option<&str>;

    /// XML brut de la dernière réponse reçue
    fn last_response(&self) -> Option<&str>;
}
