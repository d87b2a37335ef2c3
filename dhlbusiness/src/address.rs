//! Adresses et participants d'une expédition
//!
//! Un [`Participant`] réunit une [`Address`] et des [`PersonDetails`] ; son
//! rôle ([`ParticipantKind`]) détermine la forme de l'enregistrement émis
//! (voir [`crate::wire::to_wire_record`]).

use crate::error::ShipmentError;

/// Limites de longueur documentées par DHL (en caractères)
pub mod limits {
    pub const NAME: (usize, usize) = (1, 35);
    pub const NAME_EXTRA: (usize, usize) = (0, 35);
    pub const STREET_NAME: (usize, usize) = (0, 35);
    pub const STREET_NUMBER: (usize, usize) = (1, 5);
    pub const ADDRESS_ADDITION: (usize, usize) = (0, 35);
    pub const DISPATCHING_INFO: (usize, usize) = (0, 35);
    pub const ZIP: (usize, usize) = (0, 10);
    pub const CITY: (usize, usize) = (0, 35);
    pub const COUNTRY: (usize, usize) = (0, 30);
    pub const COUNTRY_ISO_CODE: (usize, usize) = (2, 2);
    pub const STATE: (usize, usize) = (0, 30);
    pub const PHONE: (usize, usize) = (0, 20);
    pub const EMAIL: (usize, usize) = (0, 70);
    pub const CONTACT_PERSON: (usize, usize) = (0, 50);
    pub const POST_NUMBER: (usize, usize) = (1, 10);
    pub const PACK_STATION_NUMBER: (usize, usize) = (3, 3);
}

/// Vérifie la longueur d'un champ et ajoute une erreur si elle sort des limites
pub(crate) fn check_length(
    violations: &mut Vec<ShipmentError>,
    field: String,
    value: &str,
    (min, max): (usize, usize),
) {
    let len = value.chars().count();
    if len < min || len > max {
        violations.push(ShipmentError::FieldLength {
            field,
            len,
            min,
            max,
        });
    }
}

/// Adresse postale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    street_name: String,
    address_addition: Option<String>,
    dispatching_info: Option<String>,
    zip: String,
    location: String,
    country: Option<String>,
    country_iso_code: Option<String>,
    state: Option<String>,
}

impl Address {
    pub fn street_name(&self) -> &str {
        &self.street_name
    }

    pub fn set_street_name(&mut self, street_name: impl Into<String>) {
        self.street_name = street_name.into();
    }

    pub fn address_addition(&self) -> Option<&str> {
        self.address_addition.as_deref()
    }

    pub fn set_address_addition(&mut self, addition: Option<String>) {
        self.address_addition = addition;
    }

    pub fn dispatching_info(&self) -> Option<&str> {
        self.dispatching_info.as_deref()
    }

    pub fn set_dispatching_info(&mut self, info: Option<String>) {
        self.dispatching_info = info;
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }

    pub fn set_zip(&mut self, zip: impl Into<String>) {
        self.zip = zip.into();
    }

    /// Ville
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Nom du pays, stocké en minuscules
    pub fn set_country(&mut self, country: Option<&str>) {
        self.country = country.map(str::to_lowercase);
    }

    pub fn country_iso_code(&self) -> Option<&str> {
        self.country_iso_code.as_deref()
    }

    /// Code pays ISO 3166-1 alpha-2, stocké en majuscules
    pub fn set_country_iso_code(&mut self, code: Option<&str>) {
        self.country_iso_code = code.map(str::to_uppercase);
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn set_state(&mut self, state: Option<String>) {
        self.state = state;
    }

    /// Un bloc Origin n'est émis que si le code ISO est connu
    pub fn has_origin(&self) -> bool {
        self.country_iso_code.is_some()
    }

    fn length_violations(&self, prefix: &str, with_street: bool) -> Vec<ShipmentError> {
        let mut violations = Vec::new();
        if with_street {
            check_length(
                &mut violations,
                format!("{prefix}.streetName"),
                &self.street_name,
                limits::STREET_NAME,
            );
            for (name, value, limit) in [
                ("addressAddition", &self.address_addition, limits::ADDRESS_ADDITION),
                ("dispatchingInformation", &self.dispatching_info, limits::DISPATCHING_INFO),
            ] {
                if let Some(value) = value {
                    check_length(&mut violations, format!("{prefix}.{name}"), value, limit);
                }
            }
        }
        check_length(&mut violations, format!("{prefix}.zip"), &self.zip, limits::ZIP);
        check_length(
            &mut violations,
            format!("{prefix}.city"),
            &self.location,
            limits::CITY,
        );
        for (name, value, limit) in [
            ("country", &self.country, limits::COUNTRY),
            ("countryISOCode", &self.country_iso_code, limits::COUNTRY_ISO_CODE),
            ("state", &self.state, limits::STATE),
        ] {
            if let Some(value) = value {
                check_length(&mut violations, format!("{prefix}.{name}"), value, limit);
            }
        }
        violations
    }
}

/// Identité et moyens de contact d'une personne ou d'une entreprise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDetails {
    name: String,
    name2: Option<String>,
    name3: Option<String>,
    street_number: String,
    phone: Option<String>,
    email: Option<String>,
    contact_person: Option<String>,
}

impl PersonDetails {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name2(&self) -> Option<&str> {
        self.name2.as_deref()
    }

    pub fn set_name2(&mut self, name2: Option<String>) {
        self.name2 = name2;
    }

    pub fn name3(&self) -> Option<&str> {
        self.name3.as_deref()
    }

    pub fn set_name3(&mut self, name3: Option<String>) {
        self.name3 = name3;
    }

    pub fn street_number(&self) -> &str {
        &self.street_number
    }

    pub fn set_street_number(&mut self, number: impl Into<String>) {
        self.street_number = number.into();
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn set_phone(&mut self, phone: Option<String>) {
        self.phone = phone;
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
    }

    pub fn contact_person(&self) -> Option<&str> {
        self.contact_person.as_deref()
    }

    pub fn set_contact_person(&mut self, contact: Option<String>) {
        self.contact_person = contact;
    }

    /// Vrai si au moins un moyen de contact est renseigné
    pub fn has_communication(&self) -> bool {
        self.phone.is_some() || self.email.is_some() || self.contact_person.is_some()
    }

    fn length_violations(&self, prefix: &str, with_street: bool) -> Vec<ShipmentError> {
        let mut violations = Vec::new();
        check_length(
            &mut violations,
            format!("{prefix}.name1"),
            &self.name,
            limits::NAME,
        );
        if with_street {
            check_length(
                &mut violations,
                format!("{prefix}.streetNumber"),
                &self.street_number,
                limits::STREET_NUMBER,
            );
        }
        for (name, value, limit) in [
            ("name2", &self.name2, limits::NAME_EXTRA),
            ("name3", &self.name3, limits::NAME_EXTRA),
            ("phone", &self.phone, limits::PHONE),
            ("email", &self.email, limits::EMAIL),
            ("contactPerson", &self.contact_person, limits::CONTACT_PERSON),
        ] {
            if let Some(value) = value {
                check_length(&mut violations, format!("{prefix}.{name}"), value, limit);
            }
        }
        violations
    }
}

/// Rôle d'un participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantKind {
    /// Expéditeur (ou destinataire des retours)
    Sender,
    /// Destinataire à une adresse postale
    Receiver,
    /// Destinataire retirant son colis dans une Packstation
    PackStation {
        post_number: String,
        pack_station_number: String,
    },
}

impl ParticipantKind {
    /// Nom lisible du rôle
    pub fn label(&self) -> &'static str {
        match self {
            ParticipantKind::Sender => "Sender",
            ParticipantKind::Receiver => "Receiver",
            ParticipantKind::PackStation { .. } => "PackStation",
        }
    }

    /// Destinataire, quelle que soit la forme (adresse ou Packstation)
    pub fn is_receiver(&self) -> bool {
        !matches!(self, ParticipantKind::Sender)
    }
}

/// Participant d'une expédition (expéditeur, destinataire, Packstation)
///
/// Construit par chaînage :
///
/// ```
/// use dhlbusiness::Participant;
///
/// let sender = Participant::sender()
///     .name("Muster AG")
///     .street("Erich-Weinert-Strasse", "5")
///     .zip("39240")
///     .city("Calbe")
///     .country_iso_code("de");
///
/// assert_eq!(sender.address().country_iso_code(), Some("DE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    kind: ParticipantKind,
    address: Address,
    person: PersonDetails,
}

impl Participant {
    fn with_kind(kind: ParticipantKind) -> Self {
        Self {
            kind,
            address: Address::default(),
            person: PersonDetails::default(),
        }
    }

    pub fn sender() -> Self {
        Self::with_kind(ParticipantKind::Sender)
    }

    pub fn receiver() -> Self {
        Self::with_kind(ParticipantKind::Receiver)
    }

    pub fn pack_station(
        post_number: impl Into<String>,
        pack_station_number: impl Into<String>,
    ) -> Self {
        Self::with_kind(ParticipantKind::PackStation {
            post_number: post_number.into(),
            pack_station_number: pack_station_number.into(),
        })
    }

    pub fn kind(&self) -> &ParticipantKind {
        &self.kind
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Numéro client DHL (Postnummer), pour une Packstation seulement
    pub fn post_number(&self) -> Option<&str> {
        match &self.kind {
            ParticipantKind::PackStation { post_number, .. } => Some(post_number),
            _ => None,
        }
    }

    /// Numéro de la Packstation, pour une Packstation seulement
    pub fn pack_station_number(&self) -> Option<&str> {
        match &self.kind {
            ParticipantKind::PackStation {
                pack_station_number,
                ..
            } => Some(pack_station_number),
            _ => None,
        }
    }

    /// # Errors
    ///
    /// [`ShipmentError::ParticipantRole`] si le participant n'est pas une
    /// Packstation.
    pub fn set_post_number(&mut self, number: impl Into<String>) -> Result<(), ShipmentError> {
        match &mut self.kind {
            ParticipantKind::PackStation { post_number, .. } => {
                *post_number = number.into();
                Ok(())
            }
            other => Err(ShipmentError::ParticipantRole {
                kind: other.label(),
                role: "PackStation",
            }),
        }
    }

    /// # Errors
    ///
    /// [`ShipmentError::ParticipantRole`] si le participant n'est pas une
    /// Packstation.
    pub fn set_pack_station_number(
        &mut self,
        number: impl Into<String>,
    ) -> Result<(), ShipmentError> {
        match &mut self.kind {
            ParticipantKind::PackStation {
                pack_station_number,
                ..
            } => {
                *pack_station_number = number.into();
                Ok(())
            }
            other => Err(ShipmentError::ParticipantRole {
                kind: other.label(),
                role: "PackStation",
            }),
        }
    }

    pub fn address_mut(&mut self) -> &mut Address {
        &mut self.address
    }

    pub fn person(&self) -> &PersonDetails {
        &self.person
    }

    pub fn person_mut(&mut self) -> &mut PersonDetails {
        &mut self.person
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.person.set_name(name);
        self
    }

    pub fn name2(mut self, name2: impl Into<String>) -> Self {
        self.person.set_name2(Some(name2.into()));
        self
    }

    pub fn name3(mut self, name3: impl Into<String>) -> Self {
        self.person.set_name3(Some(name3.into()));
        self
    }

    /// Rue et numéro
    pub fn street(mut self, name: impl Into<String>, number: impl Into<String>) -> Self {
        self.address.set_street_name(name);
        self.person.set_street_number(number);
        self
    }

    pub fn address_addition(mut self, addition: impl Into<String>) -> Self {
        self.address.set_address_addition(Some(addition.into()));
        self
    }

    pub fn dispatching_info(mut self, info: impl Into<String>) -> Self {
        self.address.set_dispatching_info(Some(info.into()));
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.address.set_zip(zip);
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.address.set_location(city);
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.address.set_country(Some(country));
        self
    }

    pub fn country_iso_code(mut self, code: &str) -> Self {
        self.address.set_country_iso_code(Some(code));
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.address.set_state(Some(state.into()));
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.person.set_phone(Some(phone.into()));
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.person.set_email(Some(email.into()));
        self
    }

    pub fn contact_person(mut self, contact: impl Into<String>) -> Self {
        self.person.set_contact_person(Some(contact.into()));
        self
    }

    /// Champs dont la longueur sort des limites documentées
    ///
    /// `prefix` identifie le participant dans les messages
    /// (ex: `ShipmentOrder[1].Shipper`).
    pub fn length_violations(&self, prefix: &str) -> Vec<ShipmentError> {
        let with_street = !matches!(self.kind, ParticipantKind::PackStation { .. });
        let mut violations = self.person.length_violations(prefix, with_street);
        violations.extend(self.address.length_violations(prefix, with_street));

        if let ParticipantKind::PackStation {
            post_number,
            pack_station_number,
        } = &self.kind
        {
            check_length(
                &mut violations,
                format!("{prefix}.postNumber"),
                post_number,
                limits::POST_NUMBER,
            );
            check_length(
                &mut violations,
                format!("{prefix}.packstationNumber"),
                pack_station_number,
                limits::PACK_STATION_NUMBER,
            );
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_normalization() {
        let participant = Participant::receiver()
            .country("Deutschland")
            .country_iso_code("de");
        assert_eq!(participant.address().country(), Some("deutschland"));
        assert_eq!(participant.address().country_iso_code(), Some("DE"));

        let mut address = Address::default();
        address.set_country_iso_code(None);
        assert!(!address.has_origin());
    }

    #[test]
    fn test_clearing_country_fields() {
        let mut address = Address::default();
        address.set_country(Some("Deutschland"));
        address.set_country_iso_code(Some("de"));
        assert!(address.has_origin());

        address.set_country(None);
        address.set_country_iso_code(None);
        assert_eq!(address.country(), None);
        assert_eq!(address.country_iso_code(), None);
        assert!(!address.has_origin());
    }

    #[test]
    fn test_pack_station_accessors() {
        let mut station = Participant::pack_station("12345678", "139");
        assert_eq!(station.post_number(), Some("12345678"));
        assert_eq!(station.pack_station_number(), Some("139"));

        station.set_post_number("87654321").unwrap();
        station.set_pack_station_number("205").unwrap();
        assert_eq!(
            station.kind(),
            &ParticipantKind::PackStation {
                post_number: "87654321".to_string(),
                pack_station_number: "205".to_string(),
            }
        );

        let mut receiver = Participant::receiver();
        assert_eq!(receiver.post_number(), None);
        assert_eq!(receiver.pack_station_number(), None);
        assert!(matches!(
            receiver.set_post_number("1"),
            Err(ShipmentError::ParticipantRole { kind: "Receiver", role: "PackStation" })
        ));
        assert!(receiver.set_pack_station_number("1").is_err());
    }

    #[test]
    fn test_valid_sender_has_no_violation() {
        let sender = Participant::sender()
            .name("Muster AG")
            .street("Erich-Weinert-Strasse", "5")
            .zip("39240")
            .city("Calbe")
            .country_iso_code("DE");
        assert!(sender.length_violations("Shipper").is_empty());
    }

    #[test]
    fn test_length_violations_are_named() {
        let receiver = Participant::receiver()
            .name("")
            .street("A".repeat(36), "123456")
            .country_iso_code("DEU");

        let fields: Vec<String> = receiver
            .length_violations("Receiver")
            .into_iter()
            .map(|e| match e {
                ShipmentError::FieldLength { field, .. } => field,
                other => panic!("unexpected error: {other}"),
            })
            .collect();

        assert_eq!(
            fields,
            vec![
                "Receiver.name1",
                "Receiver.streetNumber",
                "Receiver.streetName",
                "Receiver.countryISOCode",
            ]
        );
    }

    #[test]
    fn test_pack_station_checks_its_own_fields() {
        let station = Participant::pack_station("12345678", "1234")
            .name("Max Mustermann")
            .zip("53113")
            .city("Bonn");

        let violations = station.length_violations("Receiver");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().starts_with("Receiver.packstationNumber"));
        assert!(station.kind().is_receiver());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 35 caractères, mais plus de 35 octets
        let name = "ä".repeat(35);
        let sender = Participant::sender().name(name).street("Weg", "1");
        assert!(sender.length_violations("Shipper").is_empty());
    }
}
