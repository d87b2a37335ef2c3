//! # dhlbusiness - Client de l'API DHL Geschäftskundenversand
//!
//! Cette crate permet de créer, valider, modifier et annuler des expéditions
//! DHL, de récupérer étiquettes, documents douaniers et manifestes, via
//! l'API SOAP « Geschäftskundenversand » (versions 2.x et 3.x).
//!
//! ## Architecture
//!
//! - [`Participant`] : expéditeur, destinataire ou Packstation
//! - [`ShipmentOrder`] : un ordre d'expédition complet
//! - [`BusinessShipment`] : la façade qui porte identifiants, version,
//!   ordres attachés et erreurs consignées
//! - [`Response`] : la réponse DHL analysée
//! - [`BusinessShipmentConfigExt`] : lecture de la section `dhl` de
//!   `dhlconfig`
//!
//! Le transport SOAP vient de `dhlsoap` ; il peut être remplacé par
//! n'importe quel [`dhlsoap::SoapTransport`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use dhlbusiness::{
//!     BusinessShipment, Credentials, Mode, Participant, ShipmentDetails, ShipmentOrder,
//!     TestMode,
//! };
//!
//! # fn main() -> Result<(), dhlbusiness::ShipmentError> {
//! let mut dhl = BusinessShipment::builder(Credentials::new("developer", "secret"))
//!     .mode(Mode::Sandbox(TestMode::Normal))
//!     .build()?;
//!
//! let sender = Participant::sender()
//!     .name("Muster AG")
//!     .street("Erich-Weinert-Strasse", "5")
//!     .zip("39240")
//!     .city("Calbe")
//!     .country_iso_code("DE");
//! let receiver = Participant::receiver()
//!     .name("Jane Doe")
//!     .street("Charles-de-Gaulle-Strasse", "20")
//!     .zip("53113")
//!     .city("Bonn")
//!     .country_iso_code("DE");
//!
//! let account = dhl.credentials().account_number("01", "01");
//! let details = ShipmentDetails::new(account, 1.2)?;
//! dhl.add_shipment_order(ShipmentOrder::new(sender, receiver, details)?);
//!
//! match dhl.create_shipment_order() {
//!     Some(response) => {
//!         for entry in response.entries() {
//!             println!("{:?} -> {:?}", entry.shipment_number(), entry.label());
//!         }
//!     }
//!     None => eprintln!("DHL errors: {:?}", dhl.error_messages()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod business_shipment;
pub mod config_ext;
pub mod credentials;
pub mod error;
pub mod response;
pub mod shipment;
pub mod version;
pub mod wire;

pub use address::{Address, Participant, ParticipantKind, PersonDetails};
pub use business_shipment::{
    BusinessShipment, BusinessShipmentBuilder, DHL_PRODUCTION_URL, DHL_SANDBOX_URL,
    MAX_DHL_REQUESTS, ManifestDate, VersionReport,
};
pub use config_ext::BusinessShipmentConfigExt;
pub use credentials::{Credentials, Mode, TestMode};
pub use error::{Result, ShipmentError};
pub use response::{LabelPayload, Response, ShipmentEntry, Status, VersionInfo};
pub use shipment::{
    LabelResponseType, ShipmentDetails, ShipmentNumbers, ShipmentOrder, product_codes,
};
pub use version::{ApiVersion, NEWEST_VERSION, Schema};
pub use wire::{CIS_NAMESPACE, Operation, to_wire_record};
