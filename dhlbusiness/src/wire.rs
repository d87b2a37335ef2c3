//! Conversion du modèle en éléments XML de requête
//!
//! Les éléments sont construits avec leurs préfixes littéraux, comme le fait
//! `dhlsoap` pour l'enveloppe : `bcs:` pour les éléments racines propres au
//! service, `cis:` pour les types partagés (noms, adresses, compte), et sans
//! préfixe pour le reste.

use crate::address::{Participant, ParticipantKind};
use crate::credentials::Credentials;
use crate::shipment::{LabelResponseType, ShipmentNumbers, ShipmentOrder};
use crate::version::{ApiVersion, Schema};
use dhlsoap::text_element;
use xmltree::{Element, XMLNode};

/// Namespace des types partagés et de l'en-tête d'authentification
pub const CIS_NAMESPACE: &str = "http://dhl.de/webservice/cisbase";

/// Opérations du service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateShipmentOrder,
    ValidateShipment,
    UpdateShipmentOrder,
    DeleteShipmentOrder,
    GetLabel,
    GetExportDoc,
    DoManifest,
    GetManifest,
    GetVersion,
}

impl Operation {
    /// Nom de la méthode distante (utilisé pour le SOAPAction)
    pub fn method_name(self) -> &'static str {
        match self {
            Operation::CreateShipmentOrder => "createShipmentOrder",
            Operation::ValidateShipment => "validateShipment",
            Operation::UpdateShipmentOrder => "updateShipmentOrder",
            Operation::DeleteShipmentOrder => "deleteShipmentOrder",
            Operation::GetLabel => "getLabel",
            Operation::GetExportDoc => "getExportDoc",
            Operation::DoManifest => "doManifest",
            Operation::GetManifest => "getManifest",
            Operation::GetVersion => "getVersion",
        }
    }

    /// Nom local de l'élément de requête placé dans le Body
    pub fn request_element(self) -> &'static str {
        match self {
            Operation::CreateShipmentOrder => "CreateShipmentOrderRequest",
            Operation::ValidateShipment => "ValidateShipmentOrderRequest",
            Operation::UpdateShipmentOrder => "UpdateShipmentOrderRequest",
            Operation::DeleteShipmentOrder => "DeleteShipmentOrderRequest",
            Operation::GetLabel => "GetLabelRequest",
            Operation::GetExportDoc => "GetExportDocRequest",
            Operation::DoManifest => "DoManifestRequest",
            Operation::GetManifest => "GetManifestRequest",
            Operation::GetVersion => "Version",
        }
    }

    /// Nom local de l'élément de réponse attendu
    pub fn response_element(self) -> &'static str {
        match self {
            Operation::CreateShipmentOrder => "CreateShipmentOrderResponse",
            Operation::ValidateShipment => "ValidateShipmentResponse",
            Operation::UpdateShipmentOrder => "UpdateShipmentOrderResponse",
            Operation::DeleteShipmentOrder => "DeleteShipmentOrderResponse",
            Operation::GetLabel => "GetLabelResponse",
            Operation::GetExportDoc => "GetExportDocResponse",
            Operation::DoManifest => "DoManifestResponse",
            Operation::GetManifest => "GetManifestResponse",
            Operation::GetVersion => "GetVersionResponse",
        }
    }
}

fn cis(name: &str) -> String {
    format!("cis:{name}")
}

fn push(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

fn push_text(parent: &mut Element, name: &str, text: &str) {
    push(parent, text_element(name, text));
}

fn push_opt(parent: &mut Element, name: &str, text: Option<&str>) {
    if let Some(text) = text {
        push_text(parent, name, text);
    }
}

/// Section `Name` (name1..name3) de l'expéditeur
fn name_section(participant: &Participant) -> Element {
    let person = participant.person();
    let mut name = Element::new("Name");
    push_text(&mut name, &cis("name1"), person.name());
    push_opt(&mut name, &cis("name2"), person.name2());
    push_opt(&mut name, &cis("name3"), person.name3());
    name
}

/// Section `Origin` : seulement si le code ISO est connu
fn origin_section(participant: &Participant) -> Option<Element> {
    let address = participant.address();
    let iso_code = address.country_iso_code()?;

    let mut origin = Element::new(&cis("Origin"));
    push_opt(&mut origin, &cis("country"), address.country());
    push_text(&mut origin, &cis("countryISOCode"), iso_code);
    push_opt(&mut origin, &cis("state"), address.state());
    Some(origin)
}

/// Section `Address` ; le destinataire y place aussi name2/name3
fn address_section(participant: &Participant, with_extra_names: bool) -> Element {
    let address = participant.address();
    let person = participant.person();
    let mut section = Element::new("Address");

    if with_extra_names {
        push_opt(&mut section, &cis("name2"), person.name2());
        push_opt(&mut section, &cis("name3"), person.name3());
    }
    push_text(&mut section, &cis("streetName"), address.street_name());
    push_text(&mut section, &cis("streetNumber"), person.street_number());
    push_opt(&mut section, &cis("addressAddition"), address.address_addition());
    push_opt(
        &mut section,
        &cis("dispatchingInformation"),
        address.dispatching_info(),
    );
    push_text(&mut section, &cis("zip"), address.zip());
    push_text(&mut section, &cis("city"), address.location());
    if let Some(origin) = origin_section(participant) {
        push(&mut section, origin);
    }
    section
}

/// Section `Packstation` (numéro client Post, numéro de station)
fn pack_station_section(
    participant: &Participant,
    post_number: &str,
    pack_station_number: &str,
) -> Element {
    let address = participant.address();
    let mut section = Element::new("Packstation");
    push_text(&mut section, &cis("postNumber"), post_number);
    push_text(&mut section, &cis("packstationNumber"), pack_station_number);
    push_text(&mut section, &cis("zip"), address.zip());
    push_text(&mut section, &cis("city"), address.location());
    if let Some(origin) = origin_section(participant) {
        push(&mut section, origin);
    }
    section
}

/// Section `Communication` : absente si aucun moyen de contact
fn communication_section(participant: &Participant) -> Option<Element> {
    let person = participant.person();
    if !person.has_communication() {
        return None;
    }

    let mut section = Element::new("Communication");
    push_opt(&mut section, &cis("phone"), person.phone());
    push_opt(&mut section, &cis("email"), person.email());
    push_opt(&mut section, &cis("contactPerson"), person.contact_person());
    Some(section)
}

/// Enregistrement filaire d'un participant
///
/// La forme dépend du rôle :
///
/// - expéditeur : `Shipper { Name, Address, Communication }`
/// - destinataire : `Receiver { cis:name1, Address, Communication }`, name2
///   et name3 étant portés par l'adresse
/// - Packstation : `Receiver { cis:name1, Packstation, Communication }`
///
/// Les sections facultatives vides sont omises. Les familles 2.x et 3.x
/// partagent ces formes.
pub fn to_wire_record(participant: &Participant, schema: Schema) -> Element {
    match (participant.kind(), schema) {
        (ParticipantKind::Sender, Schema::V2 | Schema::V3) => {
            let mut record = Element::new("Shipper");
            push(&mut record, name_section(participant));
            push(&mut record, address_section(participant, false));
            if let Some(communication) = communication_section(participant) {
                push(&mut record, communication);
            }
            record
        }
        (ParticipantKind::Receiver, Schema::V2 | Schema::V3) => {
            let mut record = Element::new("Receiver");
            push_text(&mut record, &cis("name1"), participant.person().name());
            push(&mut record, address_section(participant, true));
            if let Some(communication) = communication_section(participant) {
                push(&mut record, communication);
            }
            record
        }
        (
            ParticipantKind::PackStation {
                post_number,
                pack_station_number,
            },
            Schema::V2 | Schema::V3,
        ) => {
            let mut record = Element::new("Receiver");
            push_text(&mut record, &cis("name1"), participant.person().name());
            push(
                &mut record,
                pack_station_section(participant, post_number, pack_station_number),
            );
            if let Some(communication) = communication_section(participant) {
                push(&mut record, communication);
            }
            record
        }
    }
}

/// En-tête SOAP d'authentification du compte client
pub fn auth_header(credentials: &Credentials) -> Element {
    let mut header = Element::new(&cis("Authentification"));
    header
        .attributes
        .insert("xmlns:cis".to_string(), CIS_NAMESPACE.to_string());
    push_text(&mut header, &cis("user"), credentials.user());
    push_text(&mut header, &cis("signature"), credentials.signature());
    push_text(&mut header, &cis("type"), "0");
    header
}

/// Formate un décimal sans zéros superflus (1.0 -> "1", 1.25 -> "1.25")
fn format_decimal(value: f64) -> String {
    format!("{value}")
}

fn shipment_details_section(order: &ShipmentOrder) -> Element {
    let details = order.details();
    let mut section = Element::new("ShipmentDetails");
    push_text(&mut section, "product", details.product());
    push_text(&mut section, &cis("accountNumber"), details.account_number());
    push_opt(&mut section, "customerReference", details.customer_reference());
    push_text(
        &mut section,
        "shipmentDate",
        &details.shipment_date().format("%Y-%m-%d").to_string(),
    );
    push_opt(
        &mut section,
        "returnShipmentAccountNumber",
        details.return_account_number(),
    );
    push_opt(
        &mut section,
        "returnShipmentReference",
        details.return_reference(),
    );

    let mut item = Element::new("ShipmentItem");
    push_text(&mut item, "weightInKG", &format_decimal(details.weight_kg()));
    if let Some((length, width, height)) = details.dimensions_cm() {
        push_text(&mut item, "lengthInCM", &length.to_string());
        push_text(&mut item, "widthInCM", &width.to_string());
        push_text(&mut item, "heightInCM", &height.to_string());
    }
    push(&mut section, item);

    if let Some(email) = details.notification_email() {
        let mut notification = Element::new("Notification");
        push_text(&mut notification, "recipientEmailAddress", email);
        push(&mut section, notification);
    }
    section
}

/// Élément `ShipmentOrder` complet
pub fn shipment_order_record(order: &ShipmentOrder, schema: Schema) -> Element {
    let mut shipment = Element::new("Shipment");
    push(&mut shipment, shipment_details_section(order));
    push(&mut shipment, to_wire_record(order.sender(), schema));
    push(&mut shipment, to_wire_record(order.receiver(), schema));
    if let Some(return_receiver) = order.return_receiver() {
        let mut record = to_wire_record(return_receiver, schema);
        record.name = "ReturnReceiver".to_string();
        push(&mut shipment, record);
    }

    let mut record = Element::new("ShipmentOrder");
    push_text(&mut record, "sequenceNumber", order.sequence_number());
    push(&mut record, shipment);
    if order.print_only_if_codeable() {
        let mut codeable = Element::new("PrintOnlyIfCodeable");
        codeable
            .attributes
            .insert("active".to_string(), "1".to_string());
        push(&mut record, codeable);
    }
    record
}

/// Élément de version `{majorRelease, minorRelease}`
pub fn version_record(version: &ApiVersion) -> Element {
    let mut record = Element::new("bcs:Version");
    push_text(&mut record, "majorRelease", &version.major().to_string());
    push_text(&mut record, "minorRelease", &version.minor().to_string());
    record
}

/// Paramètres communs à toutes les requêtes d'un appel
#[derive(Debug, Clone, Copy)]
pub struct WireContext<'a> {
    pub schema: Schema,
    pub version: &'a ApiVersion,
    pub label_response_type: Option<LabelResponseType>,
    pub label_format: Option<&'a str>,
    pub label_format_retoure: Option<&'a str>,
}

impl WireContext<'_> {
    /// Élément racine `bcs:<Operation>Request` avec sa version
    fn request_root(&self, operation: Operation) -> Element {
        let mut root = Element::new(&format!("bcs:{}", operation.request_element()));
        root.attributes
            .insert("xmlns:bcs".to_string(), self.schema.namespace().to_string());
        root.attributes
            .insert("xmlns:cis".to_string(), CIS_NAMESPACE.to_string());
        push(&mut root, version_record(self.version));
        root
    }

    fn push_label_options(&self, root: &mut Element, with_retoure: bool) {
        if let Some(response_type) = self.label_response_type {
            push_text(root, "labelResponseType", response_type.as_str());
        }
        if self.schema.supports_label_format() {
            push_opt(root, "labelFormat", self.label_format);
            if with_retoure {
                push_opt(root, "labelFormatRetoure", self.label_format_retoure);
            }
        }
    }

    /// Requête de création, de validation ou de mise à jour
    ///
    /// `shipment_number` n'est utilisé que par la mise à jour.
    pub fn shipment_order_request(
        &self,
        operation: Operation,
        orders: &[ShipmentOrder],
        shipment_number: Option<&str>,
    ) -> Element {
        let mut root = self.request_root(operation);
        push_opt(&mut root, "shipmentNumber", shipment_number);
        for order in orders {
            push(&mut root, shipment_order_record(order, self.schema));
        }
        if operation != Operation::ValidateShipment {
            self.push_label_options(&mut root, true);
        }
        root
    }

    /// Requête portant une liste de numéros d'expédition
    pub fn shipment_numbers_request(
        &self,
        operation: Operation,
        numbers: &ShipmentNumbers,
    ) -> Element {
        let mut root = self.request_root(operation);
        for number in numbers.iter() {
            push_text(&mut root, "shipmentNumber", number);
        }
        match operation {
            Operation::GetLabel => self.push_label_options(&mut root, true),
            Operation::GetExportDoc => {
                if let Some(response_type) = self.label_response_type {
                    push_text(&mut root, "exportDocResponseType", response_type.as_str());
                }
            }
            _ => {}
        }
        root
    }

    /// Requête de manifeste pour une date `YYYY-MM-DD`
    pub fn manifest_request(&self, manifest_date: &str) -> Element {
        let mut root = self.request_root(Operation::GetManifest);
        push_text(&mut root, "manifestDate", manifest_date);
        root
    }

    /// Requête getVersion : l'élément de version seul
    pub fn version_request(&self) -> Element {
        let mut root = version_record(self.version);
        root.attributes
            .insert("xmlns:bcs".to_string(), self.schema.namespace().to_string());
        root
    }
}
