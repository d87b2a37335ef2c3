//! Ordres d'expédition et paramètres des opérations

use crate::address::{Participant, ParticipantKind, check_length};
use crate::error::{Result, ShipmentError};
use chrono::{Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Codes produit DHL courants
pub mod product_codes {
    /// DHL Paket (national)
    pub const NATIONAL: &str = "V01PAK";
    /// DHL Paket Prio
    pub const PRIO: &str = "V01PRIO";
    /// DHL Paket International
    pub const INTERNATIONAL: &str = "V53WPAK";
    /// DHL Europaket
    pub const EUROPAKET: &str = "V54EPAK";
    /// DHL Paket Connect
    pub const CONNECT: &str = "V55PAK";
    /// DHL Warenpost
    pub const WARENPOST: &str = "V62WP";
    /// DHL Warenpost International
    pub const WARENPOST_INTERNATIONAL: &str = "V66WPI";
}

const ACCOUNT_NUMBER: (usize, usize) = (14, 14);
const CUSTOMER_REFERENCE: (usize, usize) = (0, 35);
const RETURN_REFERENCE: (usize, usize) = (0, 35);
const NOTIFICATION_EMAIL: (usize, usize) = (0, 70);

/// Détails d'un envoi (produit, compte, poids, dimensions)
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentDetails {
    account_number: String,
    product: String,
    customer_reference: Option<String>,
    shipment_date: NaiveDate,
    return_account_number: Option<String>,
    return_reference: Option<String>,
    weight_kg: f64,
    dimensions_cm: Option<(u32, u32, u32)>,
    notification_email: Option<String>,
}

impl ShipmentDetails {
    /// Crée les détails d'un colis national expédié aujourd'hui
    ///
    /// # Errors
    ///
    /// [`ShipmentError::InvalidWeight`] si le poids n'est pas strictement
    /// positif.
    pub fn new(account_number: impl Into<String>, weight_kg: f64) -> Result<Self> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(ShipmentError::InvalidWeight(weight_kg));
        }

        Ok(Self {
            account_number: account_number.into(),
            product: product_codes::NATIONAL.to_string(),
            customer_reference: None,
            shipment_date: Local::now().date_naive(),
            return_account_number: None,
            return_reference: None,
            weight_kg,
            dimensions_cm: None,
            notification_email: None,
        })
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_customer_reference(mut self, reference: impl Into<String>) -> Self {
        self.customer_reference = Some(reference.into());
        self
    }

    pub fn with_shipment_date(mut self, date: NaiveDate) -> Self {
        self.shipment_date = date;
        self
    }

    /// Compte (et référence optionnelle) facturé pour l'étiquette retour
    pub fn with_return_account(
        mut self,
        account_number: impl Into<String>,
        reference: Option<String>,
    ) -> Self {
        self.return_account_number = Some(account_number.into());
        self.return_reference = reference;
        self
    }

    /// Longueur, largeur, hauteur en centimètres
    pub fn with_dimensions(mut self, length: u32, width: u32, height: u32) -> Self {
        self.dimensions_cm = Some((length, width, height));
        self
    }

    /// Adresse e-mail notifiée par DHL lors de l'envoi
    pub fn with_notification_email(mut self, email: impl Into<String>) -> Self {
        self.notification_email = Some(email.into());
        self
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn customer_reference(&self) -> Option<&str> {
        self.customer_reference.as_deref()
    }

    pub fn shipment_date(&self) -> NaiveDate {
        self.shipment_date
    }

    pub fn return_account_number(&self) -> Option<&str> {
        self.return_account_number.as_deref()
    }

    pub fn return_reference(&self) -> Option<&str> {
        self.return_reference.as_deref()
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn dimensions_cm(&self) -> Option<(u32, u32, u32)> {
        self.dimensions_cm
    }

    pub fn notification_email(&self) -> Option<&str> {
        self.notification_email.as_deref()
    }

    fn length_violations(&self, prefix: &str) -> Vec<ShipmentError> {
        let mut violations = Vec::new();
        check_length(
            &mut violations,
            format!("{prefix}.accountNumber"),
            &self.account_number,
            ACCOUNT_NUMBER,
        );
        if let Some(number) = &self.return_account_number {
            check_length(
                &mut violations,
                format!("{prefix}.returnShipmentAccountNumber"),
                number,
                ACCOUNT_NUMBER,
            );
        }
        for (name, value, limit) in [
            ("customerReference", &self.customer_reference, CUSTOMER_REFERENCE),
            ("returnShipmentReference", &self.return_reference, RETURN_REFERENCE),
            ("recipientEmailAddress", &self.notification_email, NOTIFICATION_EMAIL),
        ] {
            if let Some(value) = value {
                check_length(&mut violations, format!("{prefix}.{name}"), value, limit);
            }
        }
        violations
    }
}

/// Un ordre d'expédition : expéditeur, destinataire, détails
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentOrder {
    sequence_number: String,
    sender: Participant,
    receiver: Participant,
    return_receiver: Option<Participant>,
    details: ShipmentDetails,
    print_only_if_codeable: bool,
}

impl ShipmentOrder {
    /// Crée un ordre avec le numéro de séquence "1"
    ///
    /// # Errors
    ///
    /// [`ShipmentError::ParticipantRole`] si `sender` n'est pas un
    /// expéditeur ou si `receiver` n'est pas un destinataire.
    pub fn new(
        sender: Participant,
        receiver: Participant,
        details: ShipmentDetails,
    ) -> Result<Self> {
        if sender.kind() != &ParticipantKind::Sender {
            return Err(ShipmentError::ParticipantRole {
                kind: sender.kind().label(),
                role: "Shipper",
            });
        }
        if !receiver.kind().is_receiver() {
            return Err(ShipmentError::ParticipantRole {
                kind: receiver.kind().label(),
                role: "Receiver",
            });
        }

        Ok(Self {
            sequence_number: "1".to_string(),
            sender,
            receiver,
            return_receiver: None,
            details,
            print_only_if_codeable: false,
        })
    }

    /// Numéro libre renvoyé tel quel dans la réponse DHL
    pub fn with_sequence_number(mut self, sequence_number: impl Into<String>) -> Self {
        self.sequence_number = sequence_number.into();
        self
    }

    /// Adresse de retour (forme expéditeur)
    pub fn with_return_receiver(mut self, return_receiver: Participant) -> Result<Self> {
        if return_receiver.kind() != &ParticipantKind::Sender {
            return Err(ShipmentError::ParticipantRole {
                kind: return_receiver.kind().label(),
                role: "ReturnReceiver",
            });
        }
        self.return_receiver = Some(return_receiver);
        Ok(self)
    }

    /// Refuser l'étiquette si l'adresse n'est pas codable
    pub fn with_print_only_if_codeable(mut self, active: bool) -> Self {
        self.print_only_if_codeable = active;
        self
    }

    pub fn sequence_number(&self) -> &str {
        &self.sequence_number
    }

    pub fn sender(&self) -> &Participant {
        &self.sender
    }

    pub fn receiver(&self) -> &Participant {
        &self.receiver
    }

    pub fn return_receiver(&self) -> Option<&Participant> {
        self.return_receiver.as_ref()
    }

    pub fn details(&self) -> &ShipmentDetails {
        &self.details
    }

    pub fn print_only_if_codeable(&self) -> bool {
        self.print_only_if_codeable
    }

    /// Champs hors limites dans tout l'ordre
    pub fn length_violations(&self) -> Vec<ShipmentError> {
        let prefix = format!("ShipmentOrder[{}]", self.sequence_number);
        let mut violations = self
            .details
            .length_violations(&format!("{prefix}.ShipmentDetails"));
        violations.extend(self.sender.length_violations(&format!("{prefix}.Shipper")));
        violations.extend(
            self.receiver
                .length_violations(&format!("{prefix}.Receiver")),
        );
        if let Some(return_receiver) = &self.return_receiver {
            violations.extend(
                return_receiver.length_violations(&format!("{prefix}.ReturnReceiver")),
            );
        }
        violations
    }
}

/// Un ou plusieurs numéros d'expédition
///
/// La forme [`ShipmentNumbers::Batch`] est refusée par les opérations
/// unitaires, même si elle ne contient qu'un seul numéro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipmentNumbers {
    Single(String),
    Batch(Vec<String>),
}

impl ShipmentNumbers {
    pub fn len(&self) -> usize {
        match self {
            ShipmentNumbers::Single(_) => 1,
            ShipmentNumbers::Batch(numbers) => numbers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let numbers: &[String] = match self {
            ShipmentNumbers::Single(number) => std::slice::from_ref(number),
            ShipmentNumbers::Batch(numbers) => numbers,
        };
        numbers.iter().map(String::as_str)
    }
}

impl From<&str> for ShipmentNumbers {
    fn from(number: &str) -> Self {
        ShipmentNumbers::Single(number.to_string())
    }
}

impl From<String> for ShipmentNumbers {
    fn from(number: String) -> Self {
        ShipmentNumbers::Single(number)
    }
}

impl From<Vec<String>> for ShipmentNumbers {
    fn from(numbers: Vec<String>) -> Self {
        ShipmentNumbers::Batch(numbers)
    }
}

impl From<Vec<&str>> for ShipmentNumbers {
    fn from(numbers: Vec<&str>) -> Self {
        ShipmentNumbers::Batch(numbers.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ShipmentNumbers {
    fn from(numbers: &[&str]) -> Self {
        ShipmentNumbers::Batch(numbers.iter().map(|n| n.to_string()).collect())
    }
}

/// Forme sous laquelle DHL renvoie les étiquettes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelResponseType {
    /// Lien de téléchargement
    Url,
    /// PDF encodé en Base64 dans la réponse
    Base64,
}

impl LabelResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelResponseType::Url => "URL",
            LabelResponseType::Base64 => "B64",
        }
    }
}

impl fmt::Display for LabelResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelResponseType {
    type Err = ShipmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "URL" => Ok(LabelResponseType::Url),
            "B64" | "BASE64" => Ok(LabelResponseType::Base64),
            _ => Err(ShipmentError::InvalidSetting {
                name: "label response type",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Participant {
        Participant::sender()
            .name("Muster AG")
            .street("Erich-Weinert-Strasse", "5")
            .zip("39240")
            .city("Calbe")
    }

    fn receiver() -> Participant {
        Participant::receiver()
            .name("Jane Doe")
            .street("Charles-de-Gaulle-Strasse", "20")
            .zip("53113")
            .city("Bonn")
    }

    #[test]
    fn test_details_defaults() {
        let details = ShipmentDetails::new("22222222220101", 1.2).unwrap();
        assert_eq!(details.product(), product_codes::NATIONAL);
        assert_eq!(details.shipment_date(), Local::now().date_naive());
        assert_eq!(details.dimensions_cm(), None);
    }

    #[test]
    fn test_weight_must_be_positive() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ShipmentDetails::new("22222222220101", weight),
                Err(ShipmentError::InvalidWeight(_))
            ));
        }
    }

    #[test]
    fn test_order_rejects_swapped_roles() {
        let details = ShipmentDetails::new("22222222220101", 1.0).unwrap();

        let err = ShipmentOrder::new(receiver(), receiver(), details.clone()).unwrap_err();
        assert_eq!(err.to_string(), "A Receiver cannot be used as Shipper");

        let err = ShipmentOrder::new(sender(), sender(), details.clone()).unwrap_err();
        assert_eq!(err.to_string(), "A Sender cannot be used as Receiver");

        let station = Participant::pack_station("12345678", "123").name("Max");
        assert!(ShipmentOrder::new(sender(), station, details).is_ok());
    }

    #[test]
    fn test_order_length_violations_are_prefixed() {
        let details = ShipmentDetails::new("2222", 1.0).unwrap();
        let order = ShipmentOrder::new(sender(), receiver(), details)
            .unwrap()
            .with_sequence_number("7");

        let violations = order.length_violations();
        assert_eq!(violations.len(), 1);
        assert!(
            violations[0]
                .to_string()
                .starts_with("ShipmentOrder[7].ShipmentDetails.accountNumber")
        );
    }

    #[test]
    fn test_shipment_numbers_forms() {
        let single = ShipmentNumbers::from("22222222201019582121");
        assert_eq!(single.len(), 1);

        let batch = ShipmentNumbers::from(vec!["1", "2", "3"]);
        assert_eq!(batch.iter().collect::<Vec<_>>(), vec!["1", "2", "3"]);

        // Un lot d'un seul numéro reste un lot
        assert!(matches!(
            ShipmentNumbers::from(vec!["1".to_string()]),
            ShipmentNumbers::Batch(_)
        ));
        assert!(ShipmentNumbers::Batch(Vec::new()).is_empty());
    }

    #[test]
    fn test_label_response_type_parse() {
        assert_eq!("url".parse::<LabelResponseType>().unwrap(), LabelResponseType::Url);
        assert_eq!("B64".parse::<LabelResponseType>().unwrap(), LabelResponseType::Base64);
        assert_eq!(LabelResponseType::Base64.to_string(), "B64");
        assert!("pdf".parse::<LabelResponseType>().is_err());
    }
}
