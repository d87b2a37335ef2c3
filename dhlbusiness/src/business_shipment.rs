//! Façade du service d'expédition DHL
//!
//! [`BusinessShipment`] porte les identifiants, la version d'API, la liste
//! des ordres d'expédition et la liste cumulative des erreurs. Chaque
//! opération construit sa requête, l'envoie par le [`SoapTransport`] injecté
//! et renvoie `Some(Response)` en cas de succès, `None` sinon. Les
//! opérations ne paniquent jamais et ne propagent pas d'erreur : tout est
//! consigné dans [`BusinessShipment::errors`].

use crate::credentials::{Credentials, Mode};
use crate::error::{Result, ShipmentError};
use crate::response::{Response, VersionInfo};
use crate::shipment::{LabelResponseType, ShipmentNumbers, ShipmentOrder};
use crate::version::{ApiVersion, Schema};
use crate::wire::{self, Operation, WireContext};
use chrono::{DateTime, NaiveDate};
use dhlsoap::{
    BasicAuth, DEFAULT_TIMEOUT_SECS, HttpSoapTransport, SoapReply, SoapRequest, SoapTransport,
};
use std::time::Duration;
use tracing::{debug, info, warn};
use xmltree::Element;

/// Endpoint de la sandbox
pub const DHL_SANDBOX_URL: &str = "https://cig.dhl.de/services/sandbox/soap";

/// Endpoint de production
pub const DHL_PRODUCTION_URL: &str = "https://cig.dhl.de/services/production/soap";

/// Nombre maximal d'ordres ou de numéros par appel
pub const MAX_DHL_REQUESTS: usize = 30;

/// Date de manifeste : date calendaire ou timestamp Unix (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestDate {
    Date(NaiveDate),
    Timestamp(i64),
}

impl ManifestDate {
    /// Forme `YYYY-MM-DD` attendue par le service
    pub fn to_wire(&self) -> Result<String> {
        let date = match self {
            ManifestDate::Date(date) => *date,
            ManifestDate::Timestamp(ts) => DateTime::from_timestamp(*ts, 0)
                .ok_or(ShipmentError::InvalidTimestamp(*ts))?
                .date_naive(),
        };
        Ok(date.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveDate> for ManifestDate {
    fn from(date: NaiveDate) -> Self {
        ManifestDate::Date(date)
    }
}

impl From<i64> for ManifestDate {
    fn from(timestamp: i64) -> Self {
        ManifestDate::Timestamp(timestamp)
    }
}

/// Résultat de [`BusinessShipment::get_version`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionReport {
    /// `"3.2"` ou `"3.2.2"`
    Text(String),
    Structured(VersionInfo),
}

/// Builder de [`BusinessShipment`]
#[derive(Debug, Clone)]
pub struct BusinessShipmentBuilder {
    credentials: Credentials,
    mode: Mode,
    version: Option<String>,
    custom_api_url: Option<String>,
    label_response_type: Option<LabelResponseType>,
    label_format: Option<String>,
    label_format_retoure: Option<String>,
    timeout: Duration,
}

impl BusinessShipmentBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            mode: Mode::default(),
            version: None,
            custom_api_url: None,
            label_response_type: None,
            label_format: None,
            label_format_retoure: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Production ou sandbox (défaut : production)
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Version d'API au format `MAJOR.MINOR[.BUILD]` (défaut : la plus récente)
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// URL remplaçant les endpoints sandbox/production
    pub fn custom_api_url(mut self, url: impl Into<String>) -> Self {
        self.custom_api_url = Some(url.into());
        self
    }

    pub fn label_response_type(mut self, response_type: LabelResponseType) -> Self {
        self.label_response_type = Some(response_type);
        self
    }

    /// Format d'étiquette (3.x uniquement), ex: "910-300-700"
    pub fn label_format(mut self, format: impl Into<String>) -> Self {
        self.label_format = Some(format.into());
        self
    }

    /// Format de l'étiquette retour (3.x uniquement)
    pub fn label_format_retoure(mut self, format: impl Into<String>) -> Self {
        self.label_format_retoure = Some(format.into());
        self
    }

    /// Timeout HTTP du transport par défaut
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Construit le client avec le transport HTTP
    pub fn build(self) -> Result<BusinessShipment> {
        let transport = HttpSoapTransport::with_timeout(self.timeout);
        self.build_with_transport(transport)
    }

    /// Construit le client avec un transport fourni (tests, proxy...)
    ///
    /// # Errors
    ///
    /// [`ShipmentError::InvalidVersion`] si la version n'est pas lisible.
    /// Une version lisible mais sans schéma (1.x) est acceptée ici et
    /// refusée au premier appel.
    pub fn build_with_transport<T: SoapTransport>(
        self,
        transport: T,
    ) -> Result<BusinessShipment<T>> {
        let version = match &self.version {
            Some(version) => version.parse()?,
            None => ApiVersion::newest(),
        };

        let credentials = match self.mode {
            Mode::Live => self.credentials,
            Mode::Sandbox(test_mode) => self.credentials.for_sandbox(test_mode),
        };

        debug!(mode = %self.mode, version = %version, "Built DHL business shipment client");

        Ok(BusinessShipment {
            credentials,
            mode: self.mode,
            version,
            custom_api_url: self.custom_api_url,
            label_response_type: self.label_response_type,
            label_format: self.label_format,
            label_format_retoure: self.label_format_retoure,
            shipment_orders: Vec::new(),
            errors: Vec::new(),
            transport,
        })
    }
}

/// Client du service d'expédition
///
/// Une instance correspond à une session logique : elle n'est pas partagée
/// entre threads, toutes les opérations prennent `&mut self`.
///
/// # Exemple
///
/// ```rust,no_run
/// use dhlbusiness::{BusinessShipment, Credentials, LabelResponseType, Mode, TestMode};
///
/// let mut dhl = BusinessShipment::builder(Credentials::new("developer", "secret"))
///     .mode(Mode::Sandbox(TestMode::Normal))
///     .label_response_type(LabelResponseType::Url)
///     .build()?;
///
/// if let Some(response) = dhl.get_label("22222222201019582121") {
///     println!("{:?}", response.first_entry().and_then(|e| e.label()));
/// } else {
///     eprintln!("{:?}", dhl.error_messages());
/// }
/// # Ok::<(), dhlbusiness::ShipmentError>(())
/// ```
#[derive(Debug)]
pub struct BusinessShipment<T = HttpSoapTransport> {
    credentials: Credentials,
    mode: Mode,
    version: ApiVersion,
    custom_api_url: Option<String>,
    label_response_type: Option<LabelResponseType>,
    label_format: Option<String>,
    label_format_retoure: Option<String>,
    shipment_orders: Vec<ShipmentOrder>,
    errors: Vec<ShipmentError>,
    transport: T,
}

impl BusinessShipment {
    pub fn builder(credentials: Credentials) -> BusinessShipmentBuilder {
        BusinessShipmentBuilder::new(credentials)
    }
}

impl<T: SoapTransport> BusinessShipment<T> {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_test(&self) -> bool {
        self.mode.is_test()
    }

    pub fn version(&self) -> &ApiVersion {
        &self.version
    }

    pub fn set_version(&mut self, version: ApiVersion) {
        self.version = version;
    }

    pub fn custom_api_url(&self) -> Option<&str> {
        self.custom_api_url.as_deref()
    }

    pub fn set_custom_api_url(&mut self, url: Option<String>) {
        self.custom_api_url = url;
    }

    pub fn label_response_type(&self) -> Option<LabelResponseType> {
        self.label_response_type
    }

    pub fn set_label_response_type(&mut self, response_type: Option<LabelResponseType>) {
        self.label_response_type = response_type;
    }

    pub fn label_format(&self) -> Option<&str> {
        self.label_format.as_deref()
    }

    pub fn set_label_format(&mut self, format: Option<String>, retoure: Option<String>) {
        self.label_format = format;
        self.label_format_retoure = retoure;
    }

    /// Endpoint effectif : URL personnalisée, sinon sandbox ou production
    pub fn api_url(&self) -> &str {
        match (&self.custom_api_url, self.mode) {
            (Some(url), _) => url,
            (None, Mode::Live) => DHL_PRODUCTION_URL,
            (None, Mode::Sandbox(_)) => DHL_SANDBOX_URL,
        }
    }

    /// En-tête SOAP d'authentification
    pub fn auth_header(&self) -> Element {
        wire::auth_header(&self.credentials)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// XML de la dernière requête envoyée
    pub fn last_xml(&self) -> Option<&str> {
        self.transport.last_request()
    }

    /// XML brut de la dernière réponse DHL
    pub fn last_dhl_xml_response(&self) -> Option<&str> {
        self.transport.last_response()
    }

    // Ordres d'expédition

    pub fn add_shipment_order(&mut self, order: ShipmentOrder) {
        self.shipment_orders.push(order);
    }

    pub fn set_shipment_orders(&mut self, orders: Vec<ShipmentOrder>) {
        self.shipment_orders = orders;
    }

    pub fn clear_shipment_orders(&mut self) {
        self.shipment_orders.clear();
    }

    pub fn shipment_orders(&self) -> &[ShipmentOrder] {
        &self.shipment_orders
    }

    pub fn count_shipment_orders(&self) -> usize {
        self.shipment_orders.len()
    }

    // Erreurs

    pub fn errors(&self) -> &[ShipmentError] {
        &self.errors
    }

    /// Messages des erreurs consignées, dans l'ordre
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn last_error(&self) -> Option<&ShipmentError> {
        self.errors.last()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn add_error(&mut self, error: ShipmentError) {
        warn!(error = %error, "DHL business shipment error");
        self.errors.push(error);
    }

    /// Consigne une erreur non bloquante si le lot dépasse la limite
    fn check_request_count(&mut self, count: usize, operation: Operation) {
        if count > MAX_DHL_REQUESTS {
            self.add_error(ShipmentError::TooManyRequests {
                action: operation.method_name(),
                max: MAX_DHL_REQUESTS,
                count,
            });
        }
    }

    fn check_field_lengths(&mut self) {
        let violations: Vec<ShipmentError> = self
            .shipment_orders
            .iter()
            .flat_map(ShipmentOrder::length_violations)
            .collect();
        for violation in violations {
            self.add_error(violation);
        }
    }

    fn schema(&mut self) -> Option<Schema> {
        match self.version.schema() {
            Ok(schema) => Some(schema),
            Err(err) => {
                self.add_error(err);
                None
            }
        }
    }

    fn wire_context(&self, schema: Schema) -> WireContext<'_> {
        WireContext {
            schema,
            version: &self.version,
            label_response_type: self.label_response_type,
            label_format: self.label_format.as_deref(),
            label_format_retoure: self.label_format_retoure.as_deref(),
        }
    }

    /// Envoie la requête et convertit la réponse
    ///
    /// Les fautes SOAP et erreurs de transport sont consignées, le résultat
    /// est alors `None`.
    fn dispatch(&mut self, operation: Operation, payload: Element) -> Option<Response> {
        let endpoint = self.api_url().to_string();
        let basic_auth = BasicAuth {
            user: self.credentials.api_user().to_string(),
            password: self.credentials.api_password().to_string(),
        };
        let request = SoapRequest {
            endpoint: &endpoint,
            action: operation.method_name(),
            basic_auth: Some(basic_auth),
            header: Some(self.auth_header()),
            payload,
        };

        info!(
            action = operation.method_name(),
            endpoint = %endpoint,
            version = %self.version,
            "Calling DHL business shipment service"
        );

        match self.transport.call(request) {
            Ok(SoapReply::Body(body)) => {
                let response = Response::new(operation, self.version, body);
                debug!(
                    action = operation.method_name(),
                    status = ?response.status_code(),
                    entries = response.entries().len(),
                    "DHL response received"
                );
                Some(response)
            }
            Ok(SoapReply::Fault(fault)) => {
                self.add_error(ShipmentError::Fault(fault.fault_string));
                None
            }
            Err(err) => {
                self.add_error(ShipmentError::Transport(err));
                None
            }
        }
    }

    /// Requête portant les ordres attachés (création, validation)
    fn send_shipment_orders(&mut self, operation: Operation) -> Option<Response> {
        if self.shipment_orders.is_empty() {
            self.add_error(ShipmentError::NoShipmentOrders {
                action: operation.method_name(),
            });
            return None;
        }

        let schema = self.schema()?;
        self.check_request_count(self.shipment_orders.len(), operation);
        self.check_field_lengths();

        debug!(
            action = operation.method_name(),
            orders = self.shipment_orders.len(),
            "Building shipment order request"
        );
        let payload =
            self.wire_context(schema)
                .shipment_order_request(operation, &self.shipment_orders, None);
        self.dispatch(operation, payload)
    }

    /// Requête portant des numéros d'expédition
    fn send_shipment_numbers(
        &mut self,
        operation: Operation,
        numbers: ShipmentNumbers,
    ) -> Option<Response> {
        if numbers.is_empty() {
            self.add_error(ShipmentError::NoShipmentNumbers {
                action: operation.method_name(),
            });
            return None;
        }

        let schema = self.schema()?;
        self.check_request_count(numbers.len(), operation);

        debug!(
            action = operation.method_name(),
            numbers = numbers.len(),
            "Building shipment number request"
        );
        let payload = self
            .wire_context(schema)
            .shipment_numbers_request(operation, &numbers);
        self.dispatch(operation, payload)
    }

    // Opérations

    /// Crée les expéditions attachées et renvoie leurs étiquettes
    ///
    /// Au moins un ordre doit être attaché. Au-delà de 30, une erreur non
    /// bloquante est consignée et l'appel est tout de même tenté.
    pub fn create_shipment_order(&mut self) -> Option<Response> {
        self.send_shipment_orders(Operation::CreateShipmentOrder)
    }

    pub fn create_shipment(&mut self) -> Option<Response> {
        self.create_shipment_order()
    }

    /// Valide les ordres attachés sans créer d'expédition
    pub fn validate_shipment(&mut self) -> Option<Response> {
        self.send_shipment_orders(Operation::ValidateShipment)
    }

    /// Remplace une expédition existante par l'unique ordre attaché
    ///
    /// Refusé, sans appel distant, si plusieurs ordres sont attachés ou si
    /// `numbers` est un lot.
    pub fn update_shipment_order(
        &mut self,
        numbers: impl Into<ShipmentNumbers>,
    ) -> Option<Response> {
        let operation = Operation::UpdateShipmentOrder;

        let number = match numbers.into() {
            ShipmentNumbers::Single(number) if self.shipment_orders.len() <= 1 => number,
            _ => {
                self.add_error(ShipmentError::SingleOperationOnly {
                    action: operation.method_name(),
                });
                return None;
            }
        };
        if self.shipment_orders.is_empty() {
            self.add_error(ShipmentError::NoShipmentOrders {
                action: operation.method_name(),
            });
            return None;
        }

        let schema = self.schema()?;
        self.check_field_lengths();

        let payload = self.wire_context(schema).shipment_order_request(
            operation,
            &self.shipment_orders,
            Some(number.as_str()),
        );
        self.dispatch(operation, payload)
    }

    /// Annule une ou plusieurs expéditions
    pub fn delete_shipment_order(
        &mut self,
        numbers: impl Into<ShipmentNumbers>,
    ) -> Option<Response> {
        self.send_shipment_numbers(Operation::DeleteShipmentOrder, numbers.into())
    }

    pub fn delete_shipment(&mut self, numbers: impl Into<ShipmentNumbers>) -> Option<Response> {
        self.delete_shipment_order(numbers)
    }

    /// Récupère à nouveau les étiquettes d'expéditions existantes
    pub fn get_label(&mut self, numbers: impl Into<ShipmentNumbers>) -> Option<Response> {
        self.send_shipment_numbers(Operation::GetLabel, numbers.into())
    }

    pub fn get_shipment_label(
        &mut self,
        numbers: impl Into<ShipmentNumbers>,
    ) -> Option<Response> {
        self.get_label(numbers)
    }

    /// Récupère les documents douaniers
    pub fn get_export_doc(&mut self, numbers: impl Into<ShipmentNumbers>) -> Option<Response> {
        self.send_shipment_numbers(Operation::GetExportDoc, numbers.into())
    }

    /// Clôture (manifeste) des expéditions avant le jour d'envoi
    pub fn do_manifest(&mut self, numbers: impl Into<ShipmentNumbers>) -> Option<Response> {
        self.send_shipment_numbers(Operation::DoManifest, numbers.into())
    }

    /// Récupère le manifeste d'une journée
    pub fn get_manifest(&mut self, date: impl Into<ManifestDate>) -> Option<Response> {
        let manifest_date = match date.into().to_wire() {
            Ok(date) => date,
            Err(err) => {
                self.add_error(err);
                return None;
            }
        };

        let schema = self.schema()?;
        let payload = self.wire_context(schema).manifest_request(&manifest_date);
        self.dispatch(Operation::GetManifest, payload)
    }

    /// Version de l'API
    ///
    /// Sans appel distant, renvoie la version configurée. Sinon interroge le
    /// service ; `include_build` ajoute le numéro de build à la forme texte.
    pub fn get_version(
        &mut self,
        via_remote_call: bool,
        include_build: bool,
        as_structured: bool,
    ) -> Option<VersionReport> {
        let info = if via_remote_call {
            let schema = self.schema()?;
            let payload = self.wire_context(schema).version_request();
            let response = self.dispatch(Operation::GetVersion, payload)?;

            match response.version() {
                Some(info) => *info,
                None => {
                    self.add_error(ShipmentError::InvalidResponse {
                        action: Operation::GetVersion.method_name(),
                        reason: "missing majorRelease/minorRelease".to_string(),
                    });
                    return None;
                }
            }
        } else {
            VersionInfo {
                major: self.version.major(),
                minor: self.version.minor(),
                build: self.version.build(),
            }
        };

        if as_structured {
            return Some(VersionReport::Structured(info));
        }

        let text = match info.build {
            Some(build) if include_build || !via_remote_call => {
                format!("{}.{}.{build}", info.major, info.minor)
            }
            _ => format!("{}.{}", info.major, info.minor),
        };
        Some(VersionReport::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::TestMode;

    #[test]
    fn test_manifest_date_to_wire() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(ManifestDate::from(date).to_wire().unwrap(), "2024-03-01");
        // 2024-03-01T23:59:59Z
        assert_eq!(ManifestDate::from(1_709_337_599_i64).to_wire().unwrap(), "2024-03-01");
        assert!(matches!(
            ManifestDate::Timestamp(i64::MAX).to_wire(),
            Err(ShipmentError::InvalidTimestamp(i64::MAX))
        ));
    }

    #[test]
    fn test_builder_applies_sandbox_credentials() {
        let dhl = BusinessShipment::builder(
            Credentials::new("developer", "secret").with_user("real").with_ekp("6299999999"),
        )
        .mode(Mode::Sandbox(TestMode::Normal))
        .build()
        .unwrap();

        assert_eq!(dhl.credentials().api_user(), "developer");
        assert_eq!(dhl.credentials().user(), "2222222222_01");
        assert_eq!(dhl.credentials().ekp(10), "2222222222");
        assert_eq!(dhl.api_url(), DHL_SANDBOX_URL);
        assert_eq!(dhl.version(), &ApiVersion::newest());
    }

    #[test]
    fn test_live_mode_keeps_credentials_and_endpoint() {
        let mut dhl = BusinessShipment::builder(Credentials::new("a", "b").with_user("real"))
            .mode(Mode::Live)
            .build()
            .unwrap();

        assert_eq!(dhl.credentials().user(), "real");
        assert_eq!(dhl.api_url(), DHL_PRODUCTION_URL);

        dhl.set_custom_api_url(Some("http://localhost:8080/soap".to_string()));
        assert_eq!(dhl.api_url(), "http://localhost:8080/soap");
    }

    #[test]
    fn test_builder_defaults_to_production() {
        let dhl = BusinessShipment::builder(Credentials::new("a", "b").with_user("real"))
            .build()
            .unwrap();
        assert_eq!(dhl.mode(), Mode::Live);
        assert_eq!(dhl.api_url(), DHL_PRODUCTION_URL);
        assert_eq!(dhl.credentials().user(), "real");
    }

    #[test]
    fn test_builder_rejects_unreadable_version() {
        let err = BusinessShipment::builder(Credentials::default())
            .version("three")
            .build()
            .unwrap_err();
        assert!(matches!(err, ShipmentError::InvalidVersion(_)));
    }
}
