//! Modèle d'une enveloppe SOAP reçue

use crate::SoapFault;
use xmltree::Element;

/// Enveloppe SOAP analysée
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    pub header: Option<SoapHeader>,
    pub body: SoapBody,
}

/// `Header` tel que reçu (DHL n'en renvoie normalement pas)
#[derive(Debug, Clone)]
pub struct SoapHeader {
    pub content: Element,
}

/// `Body` tel que reçu
#[derive(Debug, Clone)]
pub struct SoapBody {
    pub content: Element,
}

impl SoapEnvelope {
    /// Élément de réponse, s'il ne s'agit pas d'un fault
    pub fn payload(&self) -> Option<&Element> {
        self.body.payload().filter(|e| e.name != "Fault")
    }

    /// Fault contenu dans le Body, s'il y en a un
    pub fn fault(&self) -> Option<SoapFault> {
        SoapFault::from_body(&self.body)
    }
}

impl SoapBody {
    /// Premier élément enfant du Body (la réponse ou le fault)
    pub fn payload(&self) -> Option<&Element> {
        self.content.children.iter().find_map(|n| n.as_element())
    }

    /// Enfant direct du Body portant ce nom local
    pub fn find(&self, local_name: &str) -> Option<&Element> {
        self.content
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .find(|e| e.name == local_name)
    }
}
