//! SOAP Faults

use crate::{SOAP_ENVELOPE_NS, SOAP_ENVELOPE_PREFIX, SoapBody, text_element};
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault) renvoyée par le serveur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Code d'erreur (ex: "soap:Server", "env:Client")
    pub fault_code: String,

    /// Description de l'erreur, telle que renvoyée par le serveur
    pub fault_string: String,

    /// Contenu textuel de l'élément `detail`, s'il existe
    pub detail: Option<String>,
}

impl SoapFault {
    /// Crée un fault SOAP simple
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
            detail: None,
        }
    }

    /// Extrait un fault d'un corps SOAP, si le corps en contient un
    pub fn from_body(body: &SoapBody) -> Option<Self> {
        let fault = body.find("Fault")?;

        Some(Self {
            fault_code: child_text(fault, "faultcode").unwrap_or_default(),
            fault_string: child_text(fault, "faultstring").unwrap_or_default(),
            detail: fault.get_child("detail").map(collect_text),
        })
    }
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fault_string)
    }
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    parent
        .get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

// Le détail DHL est parfois imbriqué sur plusieurs niveaux
fn collect_text(elem: &Element) -> String {
    let mut parts = Vec::new();
    for node in &elem.children {
        match node {
            XMLNode::Text(t) if !t.trim().is_empty() => parts.push(t.trim().to_string()),
            XMLNode::Element(e) => {
                let inner = collect_text(e);
                if !inner.is_empty() {
                    parts.push(inner);
                }
            }
            _ => {}
        }
    }
    parts.join(" ")
}

/// Construit un SOAP Fault XML
///
/// # Arguments
///
/// * `fault_code` - Code du fault (ex: "soapenv:Server")
/// * `fault_string` - Message d'erreur
/// * `detail` - Détail textuel optionnel
///
/// # Returns
///
/// XML SOAP Fault formaté
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    detail: Option<&str>,
) -> Result<String, xmltree::Error> {
    let mut fault = Element::new(&format!("{SOAP_ENVELOPE_PREFIX}:Fault"));
    fault
        .children
        .push(XMLNode::Element(text_element("faultcode", fault_code)));
    fault
        .children
        .push(XMLNode::Element(text_element("faultstring", fault_string)));

    if let Some(detail) = detail {
        fault
            .children
            .push(XMLNode::Element(text_element("detail", detail)));
    }

    let mut body = Element::new(&format!("{SOAP_ENVELOPE_PREFIX}:Body"));
    body.children.push(XMLNode::Element(fault));

    let mut envelope = Element::new(&format!("{SOAP_ENVELOPE_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{SOAP_ENVELOPE_PREFIX}"),
        SOAP_ENVELOPE_NS.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_soap_envelope;

    #[test]
    fn test_build_simple_fault() {
        let xml = build_soap_fault("soapenv:Server", "Invalid Version", None).unwrap();

        assert!(xml.contains("<soapenv:Fault>"));
        assert!(xml.contains("<faultcode>soapenv:Server</faultcode>"));
        assert!(xml.contains("<faultstring>Invalid Version</faultstring>"));
        assert!(!xml.contains("<detail>"));
    }

    #[test]
    fn test_fault_roundtrip_through_parser() {
        let xml = build_soap_fault("soapenv:Client", "login failed", Some("bad signature")).unwrap();
        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();

        let fault = SoapFault::from_body(&envelope.body).unwrap();
        assert_eq!(fault.fault_code, "soapenv:Client");
        assert_eq!(fault.fault_string, "login failed");
        assert_eq!(fault.detail.as_deref(), Some("bad signature"));
        assert_eq!(fault.to_string(), "login failed");
    }

    #[test]
    fn test_nested_detail() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>Unauthorized</faultstring>
      <detail><error><message>Invalid credentials</message></error></detail>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        let fault = SoapFault::from_body(&envelope.body).unwrap();
        assert_eq!(fault.detail.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_no_fault_in_regular_body() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body><bcs:GetVersionResponse xmlns:bcs="urn:x"/></soap:Body>
</soap:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        assert!(SoapFault::from_body(&envelope.body).is_none());
    }
}
