//! Parser des enveloppes SOAP reçues

use crate::{SoapBody, SoapEnvelope, SoapHeader};
use xmltree::Element;

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parse une réponse SOAP brute
///
/// Le parser xmltree sépare le préfixe (`soap:`, `SOAP-ENV:`, `env:`...) du
/// nom : seuls les noms locaux sont comparés.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let mut root = Element::parse(xml)?;

    if root.name != "Envelope" {
        return Err(SoapParseError::MissingEnvelope);
    }

    let body = root
        .take_child("Body")
        .map(|content| SoapBody { content })
        .ok_or(SoapParseError::MissingBody)?;
    let header = root
        .take_child("Header")
        .map(|content| SoapHeader { content });

    Ok(SoapEnvelope { header, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_envelope() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header/>
  <soap:Body>
    <bcs:GetVersionResponse xmlns:bcs="http://dhl.de/webservices/businesscustomershipping/3.0">
      <bcs:Version>
        <majorRelease>3</majorRelease>
        <minorRelease>2</minorRelease>
        <build>2</build>
      </bcs:Version>
    </bcs:GetVersionResponse>
  </soap:Body>
</soap:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        assert!(envelope.header.is_some());

        assert!(envelope.fault().is_none());
        let payload = envelope.payload().unwrap();
        assert_eq!(payload.name, "GetVersionResponse");

        let version = payload.get_child("Version").unwrap();
        assert_eq!(
            version.get_child("build").unwrap().get_text().unwrap(),
            "2"
        );
    }

    #[test]
    fn test_parse_missing_body() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"/>"#;

        let err = parse_soap_envelope(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapParseError::MissingBody));
    }

    #[test]
    fn test_parse_not_an_envelope() {
        let err = parse_soap_envelope(b"<html><body>Bad Gateway</body></html>").unwrap_err();
        assert!(matches!(err, SoapParseError::MissingEnvelope));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_soap_envelope(b"not xml at all").unwrap_err();
        assert!(matches!(err, SoapParseError::XmlError(_)));
    }
}
