//! Construction des requêtes SOAP

use crate::{SOAP_ENVELOPE_NS, SOAP_ENVELOPE_PREFIX};
use xmltree::{Element, XMLNode};

/// Crée un élément ne contenant que du texte (`<name>text</name>`)
pub fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}

/// Construit une requête SOAP complète
///
/// # Arguments
///
/// * `header` - Contenu optionnel du `Header` (ex: l'en-tête d'authentification)
/// * `payload` - Élément de requête placé dans le `Body`
///
/// # Returns
///
/// XML SOAP formaté en String
pub fn build_soap_request(
    header: Option<Element>,
    payload: Element,
) -> Result<String, xmltree::Error> {
    let mut envelope = Element::new(&format!("{SOAP_ENVELOPE_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{SOAP_ENVELOPE_PREFIX}"),
        SOAP_ENVELOPE_NS.to_string(),
    );

    if let Some(content) = header {
        let mut header_elem = Element::new(&format!("{SOAP_ENVELOPE_PREFIX}:Header"));
        header_elem.children.push(XMLNode::Element(content));
        envelope.children.push(XMLNode::Element(header_elem));
    }

    let mut body = Element::new(&format!("{SOAP_ENVELOPE_PREFIX}:Body"));
    body.children.push(XMLNode::Element(payload));
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
