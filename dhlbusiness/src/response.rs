//! Lecture des réponses DHL
//!
//! Une [`Response`] conserve l'élément de réponse brut et expose, pour
//! chaque expédition traitée, un [`ShipmentEntry`] (numéro, statut,
//! étiquettes).

use crate::version::ApiVersion;
use crate::wire::Operation;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use xmltree::{Element, XMLNode};

/// Éléments de réponse décrivant une expédition
const ENTRY_ELEMENTS: &[&str] = &[
    "CreationState",
    "ValidationState",
    "DeletionState",
    "ManifestState",
    "LabelData",
    "ExportDocData",
];

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn children<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    parent.children.iter().filter_map(move |node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

fn find_child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    find_child(parent, name)
        .and_then(|child| child.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Statut DHL (`statusCode`, `statusText`, `statusMessage`*)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub code: Option<i32>,
    pub text: Option<String>,
    pub messages: Vec<String>,
}

impl Status {
    fn from_element(elem: &Element) -> Self {
        Self {
            code: child_text(elem, "statusCode").and_then(|c| c.parse().ok()),
            text: child_text(elem, "statusText"),
            messages: children(elem, "statusMessage")
                .filter_map(|m| m.get_text())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    fn from_parent(parent: &Element) -> Option<Self> {
        find_child(parent, "Status").map(Self::from_element)
    }

    /// 0 (ok) ou 1 (ok avec avertissements)
    pub fn is_success(&self) -> bool {
        matches!(self.code, Some(0) | Some(1))
    }

    pub fn is_warning(&self) -> bool {
        self.code == Some(1)
    }

    /// Messages détaillés, ou à défaut le texte du statut
    pub fn message(&self) -> Option<String> {
        if self.messages.is_empty() {
            self.text.clone()
        } else {
            Some(self.messages.join("; "))
        }
    }
}

/// Document renvoyé par DHL : lien ou contenu encodé en Base64
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPayload {
    Url(String),
    Base64(String),
}

impl LabelPayload {
    fn from_parent(parent: &Element, url_name: &str, data_name: &str) -> Option<Self> {
        child_text(parent, url_name)
            .map(LabelPayload::Url)
            .or_else(|| child_text(parent, data_name).map(LabelPayload::Base64))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            LabelPayload::Url(url) => Some(url),
            LabelPayload::Base64(_) => None,
        }
    }

    /// Contenu binaire (PDF) d'un document embarqué
    ///
    /// Renvoie `Ok(None)` pour un lien : le document n'est pas dans la
    /// réponse.
    pub fn decode(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        match self {
            LabelPayload::Url(_) => Ok(None),
            LabelPayload::Base64(data) => {
                let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD.decode(compact).map(Some)
            }
        }
    }
}

/// Résultat pour une expédition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentEntry {
    sequence_number: Option<String>,
    shipment_number: Option<String>,
    status: Status,
    label: Option<LabelPayload>,
    return_label: Option<LabelPayload>,
    export_label: Option<LabelPayload>,
    cod_label: Option<LabelPayload>,
}

impl ShipmentEntry {
    fn from_element(elem: &Element) -> Self {
        // CreationState imbrique le statut et les étiquettes dans LabelData
        let data = find_child(elem, "LabelData").unwrap_or(elem);
        let status = Status::from_parent(data)
            .or_else(|| Status::from_parent(elem))
            .unwrap_or_default();

        let label = if local_name(&elem.name) == "ExportDocData" {
            None
        } else {
            LabelPayload::from_parent(data, "labelUrl", "labelData")
        };
        let export_label = LabelPayload::from_parent(data, "exportLabelUrl", "exportLabelData")
            .or_else(|| LabelPayload::from_parent(data, "exportDocURL", "exportDocData"));

        Self {
            sequence_number: child_text(elem, "sequenceNumber"),
            shipment_number: child_text(elem, "shipmentNumber")
                .or_else(|| child_text(data, "shipmentNumber")),
            status,
            label,
            return_label: LabelPayload::from_parent(data, "returnLabelUrl", "returnLabelData"),
            export_label,
            cod_label: LabelPayload::from_parent(data, "codLabelUrl", "codLabelData"),
        }
    }

    pub fn sequence_number(&self) -> Option<&str> {
        self.sequence_number.as_deref()
    }

    pub fn shipment_number(&self) -> Option<&str> {
        self.shipment_number.as_deref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_code(&self) -> Option<i32> {
        self.status.code
    }

    pub fn status_message(&self) -> Option<String> {
        self.status.message()
    }

    pub fn label(&self) -> Option<&LabelPayload> {
        self.label.as_ref()
    }

    pub fn return_label(&self) -> Option<&LabelPayload> {
        self.return_label.as_ref()
    }

    /// Documents douaniers (étiquette export ou document getExportDoc)
    pub fn export_label(&self) -> Option<&LabelPayload> {
        self.export_label.as_ref()
    }

    pub fn cod_label(&self) -> Option<&LabelPayload> {
        self.cod_label.as_ref()
    }
}

/// Version annoncée par le serveur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
}

impl VersionInfo {
    fn from_element(elem: &Element) -> Option<Self> {
        Some(Self {
            major: child_text(elem, "majorRelease")?.parse().ok()?,
            minor: child_text(elem, "minorRelease")?.parse().ok()?,
            build: child_text(elem, "build").and_then(|b| b.parse().ok()),
        })
    }
}

/// Réponse structurée d'une opération
#[derive(Debug, Clone)]
pub struct Response {
    operation: Operation,
    requested_version: ApiVersion,
    raw: Element,
    status: Status,
    version: Option<VersionInfo>,
    entries: Vec<ShipmentEntry>,
    manifest_data: Option<LabelPayload>,
}

impl Response {
    /// Analyse le premier élément du Body
    pub fn new(operation: Operation, requested_version: ApiVersion, raw: Element) -> Self {
        let entries = raw
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(elem) if ENTRY_ELEMENTS.contains(&local_name(&elem.name)) => {
                    Some(ShipmentEntry::from_element(elem))
                }
                _ => None,
            })
            .collect();

        // getVersion renvoie directement {majorRelease, minorRelease, build}
        let version = find_child(&raw, "Version")
            .and_then(VersionInfo::from_element)
            .or_else(|| VersionInfo::from_element(&raw));

        Self {
            operation,
            requested_version,
            status: Status::from_parent(&raw).unwrap_or_default(),
            version,
            entries,
            manifest_data: child_text(&raw, "manifestData").map(LabelPayload::Base64),
            raw,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Version utilisée pour la requête
    pub fn requested_version(&self) -> &ApiVersion {
        &self.requested_version
    }

    /// Version annoncée dans la réponse
    pub fn version(&self) -> Option<&VersionInfo> {
        self.version.as_ref()
    }

    /// Statut global
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_code(&self) -> Option<i32> {
        self.status.code
    }

    pub fn status_message(&self) -> Option<String> {
        self.status.message()
    }

    /// Vrai si le statut global indique un succès (avec ou sans avertissement)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn entries(&self) -> &[ShipmentEntry] {
        &self.entries
    }

    pub fn label_data(&self) -> &[ShipmentEntry] {
        self.entries()
    }

    pub fn first_entry(&self) -> Option<&ShipmentEntry> {
        self.entries.first()
    }

    /// Manifeste (PDF Base64) renvoyé par getManifest
    pub fn manifest_data(&self) -> Option<&LabelPayload> {
        self.manifest_data.as_ref()
    }

    /// Élément de réponse brut
    pub fn raw(&self) -> &Element {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    const CREATE_RESPONSE: &str = r#"
<bcs:CreateShipmentOrderResponse xmlns:bcs="http://dhl.de/webservices/businesscustomershipping/3.0">
  <bcs:Version><majorRelease>3</majorRelease><minorRelease>2</minorRelease></bcs:Version>
  <Status><statusCode>0</statusCode><statusText>ok</statusText></Status>
  <CreationState>
    <sequenceNumber>1</sequenceNumber>
    <shipmentNumber>22222222201019582121</shipmentNumber>
    <LabelData>
      <Status>
        <statusCode>0</statusCode>
        <statusText>ok</statusText>
        <statusMessage>Der Webservice wurde ohne Fehler ausgeführt.</statusMessage>
      </Status>
      <labelUrl>https://cig.dhl.de/gkvlabel/SANDBOX/dhl-vls/gw/shpmntws/printShipment?token=abc</labelUrl>
    </LabelData>
  </CreationState>
  <CreationState>
    <sequenceNumber>2</sequenceNumber>
    <LabelData>
      <Status>
        <statusCode>1101</statusCode>
        <statusText>Hard validation error occured.</statusText>
        <statusMessage>Bitte geben Sie eine Hausnummer an.</statusMessage>
        <statusMessage>Die Postleitzahl ist ungültig.</statusMessage>
      </Status>
    </LabelData>
  </CreationState>
</bcs:CreateShipmentOrderResponse>"#;

    #[test]
    fn test_creation_states() {
        let response = Response::new(
            Operation::CreateShipmentOrder,
            ApiVersion::newest(),
            parse(CREATE_RESPONSE),
        );

        assert!(response.is_success());
        assert_eq!(response.version().map(|v| (v.major, v.minor)), Some((3, 2)));
        assert_eq!(response.entries().len(), 2);

        let ok = &response.entries()[0];
        assert_eq!(ok.sequence_number(), Some("1"));
        assert_eq!(ok.shipment_number(), Some("22222222201019582121"));
        assert_eq!(ok.status_code(), Some(0));
        assert_eq!(
            ok.status_message().as_deref(),
            Some("Der Webservice wurde ohne Fehler ausgeführt.")
        );
        assert!(ok.label().and_then(LabelPayload::url).unwrap().starts_with("https://"));

        let failed = &response.entries()[1];
        assert_eq!(failed.shipment_number(), None);
        assert_eq!(failed.status_code(), Some(1101));
        assert!(!failed.status().is_success());
        assert_eq!(
            failed.status_message().as_deref(),
            Some("Bitte geben Sie eine Hausnummer an.; Die Postleitzahl ist ungültig.")
        );
        assert_eq!(failed.label(), None);
    }

    #[test]
    fn test_base64_label_is_decoded() {
        let xml = r#"
<GetLabelResponse>
  <Status><statusCode>0</statusCode><statusText>ok</statusText></Status>
  <LabelData>
    <Status><statusCode>0</statusCode><statusText>ok</statusText></Status>
    <shipmentNumber>22222222201019582121</shipmentNumber>
    <labelData>JVBERi0x
    LjQK</labelData>
  </LabelData>
</GetLabelResponse>"#;

        let response = Response::new(Operation::GetLabel, ApiVersion::newest(), parse(xml));
        let entry = response.first_entry().unwrap();
        let bytes = entry.label().unwrap().decode().unwrap().unwrap();
        assert_eq!(bytes, b"%PDF-1.4\n");
    }

    #[test]
    fn test_url_payload_has_no_bytes() {
        let payload = LabelPayload::Url("https://example.org/label.pdf".to_string());
        assert_eq!(payload.decode().unwrap(), None);
        assert!(LabelPayload::Base64("***".to_string()).decode().is_err());
    }

    #[test]
    fn test_export_doc_and_deletion_states() {
        let export = parse(
            r#"<GetExportDocResponse>
  <ExportDocData>
    <shipmentNumber>1</shipmentNumber>
    <Status><statusCode>0</statusCode><statusText>ok</statusText></Status>
    <exportDocURL>https://example.org/export.pdf</exportDocURL>
  </ExportDocData>
</GetExportDocResponse>"#,
        );
        let response = Response::new(Operation::GetExportDoc, ApiVersion::newest(), export);
        let entry = response.first_entry().unwrap();
        assert_eq!(entry.label(), None);
        assert_eq!(
            entry.export_label().and_then(LabelPayload::url),
            Some("https://example.org/export.pdf")
        );

        let deletion = parse(
            r#"<DeleteShipmentOrderResponse>
  <Status><statusCode>0</statusCode><statusText>ok</statusText></Status>
  <DeletionState>
    <shipmentNumber>1</shipmentNumber>
    <Status><statusCode>2000</statusCode><statusText>Unknown shipment number.</statusText></Status>
  </DeletionState>
</DeleteShipmentOrderResponse>"#,
        );
        let response = Response::new(Operation::DeleteShipmentOrder, ApiVersion::newest(), deletion);
        assert!(response.is_success());
        let entry = response.first_entry().unwrap();
        assert_eq!(entry.status_code(), Some(2000));
        assert_eq!(entry.status_message().as_deref(), Some("Unknown shipment number."));
    }

    #[test]
    fn test_manifest_data_and_warning_status() {
        let xml = r#"<GetManifestResponse>
  <Status><statusCode>1</statusCode><statusText>Weak validation error occured.</statusText></Status>
  <manifestData>JVBERi0xLjQK</manifestData>
</GetManifestResponse>"#;
        let response = Response::new(Operation::GetManifest, ApiVersion::newest(), parse(xml));

        assert!(response.is_success());
        assert!(response.status().is_warning());
        assert!(response.entries().is_empty());
        assert_eq!(
            response.manifest_data().unwrap().decode().unwrap().unwrap(),
            b"%PDF-1.4\n"
        );
    }

    #[test]
    fn test_version_response() {
        let xml = r#"<GetVersionResponse>
  <Version><majorRelease>3</majorRelease><minorRelease>2</minorRelease><build>2</build></Version>
</GetVersionResponse>"#;
        let response = Response::new(Operation::GetVersion, ApiVersion::newest(), parse(xml));
        assert_eq!(
            response.version(),
            Some(&VersionInfo {
                major: 3,
                minor: 2,
                build: Some(2)
            })
        );
    }
}
