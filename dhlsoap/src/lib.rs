//! # dhlsoap - Couche SOAP pour l'API DHL Geschäftskundenversand
//!
//! Cette crate isole tout ce qui relève du protocole SOAP 1.1 : construction
//! des enveloppes, parsing des réponses, détection des SOAP Faults et envoi
//! HTTP bloquant. Elle ne connaît rien du modèle d'expédition : les requêtes
//! arrivent déjà sous forme d'[`xmltree::Element`].
//!
//! ## Architecture
//!
//! - [`SoapEnvelope`] : Enveloppe SOAP complète (header optionnel + body)
//! - [`build_soap_request`] : Sérialisation d'une requête dans une enveloppe
//! - [`parse_soap_envelope`] : Parsing d'une réponse brute
//! - [`SoapFault`] : Erreur SOAP renvoyée par le serveur
//! - [`SoapTransport`] : Point d'injection du transport (HTTP ou simulé)
//! - [`HttpSoapTransport`] : Transport HTTP basé sur `ureq`
//!
//! ## Example
//!
//! ```ignore
//! use dhlsoap::{SoapRequest, SoapTransport, HttpSoapTransport, text_element};
//! use xmltree::{Element, XMLNode};
//!
//! let mut payload = Element::new("bcs:Version");
//! payload.children.push(XMLNode::Element(text_element("majorRelease", "3")));
//! payload.children.push(XMLNode::Element(text_element("minorRelease", "2")));
//!
//! let mut transport = HttpSoapTransport::new();
//! let reply = transport.call(SoapRequest {
//!     endpoint: "https://cig.dhl.de/services/sandbox/soap",
//!     action: "getVersion",
//!     basic_auth: None,
//!     header: None,
//!     payload,
//! })?;
//! ```

mod builder;
mod client;
mod envelope;
mod fault;
mod parser;
mod transport;

pub use builder::{build_soap_request, text_element};
pub use client::{DEFAULT_TIMEOUT_SECS, HttpSoapTransport, MAX_RESPONSE_BYTES};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, build_soap_fault};
pub use parser::{SoapParseError, parse_soap_envelope};
pub use transport::{BasicAuth, SoapReply, SoapRequest, SoapTransport, TransportError};

/// Namespace de l'enveloppe SOAP 1.1
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Préfixe utilisé pour l'enveloppe dans les requêtes émises
pub const SOAP_ENVELOPE_PREFIX: &str = "soapenv";
