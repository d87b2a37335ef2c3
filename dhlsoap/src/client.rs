use crate::{
    SoapReply, SoapRequest, SoapTransport, TransportError, build_soap_request,
    parse_soap_envelope,
};
use base64::Engine;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

/// Default timeout for a SOAP round-trip
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest response body read from DHL
///
/// A batch of 30 orders returning B64 labels and export documents goes well
/// beyond ureq's 10 MB default.
pub const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

/// Blocking HTTP transport for SOAP calls.
///
/// - POSTs the envelope as `text/xml; charset=utf-8`
/// - sends `SOAPAction: "urn:<action>"`
/// - adds HTTP Basic authentication when the request carries one
/// - keeps the last request and the last raw response for diagnostics
pub struct HttpSoapTransport {
    agent: Agent,
    last_request: Option<String>,
    last_response: Option<String>,
}

impl std::fmt::Debug for HttpSoapTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSoapTransport")
            .field("last_request", &self.last_request.as_ref().map(String::len))
            .field("last_response", &self.last_response.as_ref().map(String::len))
            .finish_non_exhaustive()
    }
}

impl Default for HttpSoapTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSoapTransport {
    /// Transport with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Transport with a custom global timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        // SOAP faults come back as HTTP 500: the body must stay readable,
        // so 4xx/5xx must not be turned into Error::StatusCode.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
            last_request: None,
            last_response: None,
        }
    }
}

impl SoapTransport for HttpSoapTransport {
    fn call(&mut self, request: SoapRequest<'_>) -> Result<SoapReply, TransportError> {
        let body_xml = build_soap_request(request.header, request.payload)?;
        self.last_request = Some(body_xml.clone());
        self.last_response = None;

        let soap_action_header = format!(r#""urn:{}""#, request.action);
        debug!(endpoint = request.endpoint, action = request.action, "Sending SOAP request");

        let mut builder = self
            .agent
            .post(request.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", &soap_action_header);

        if let Some(auth) = &request.basic_auth {
            let token = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", auth.user, auth.password));
            builder = builder.header("Authorization", &format!("Basic {token}"));
        }

        let http_error = |source| TransportError::Http {
            endpoint: request.endpoint.to_string(),
            source,
        };

        let mut response = builder.send(body_xml).map_err(http_error)?;
        let status = response.status();
        let raw_body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_string()
            .map_err(http_error)?;
        self.last_response = Some(raw_body.clone());

        let envelope = match parse_soap_envelope(raw_body.as_bytes()) {
            Ok(env) => env,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(TransportError::HttpStatus {
                    status: status.as_u16(),
                    body: raw_body,
                });
            }
        };

        if let Some(fault) = envelope.fault() {
            warn!(
                action = request.action,
                status = status.as_u16(),
                fault = %fault.fault_string,
                "SOAP fault received"
            );
            return Ok(SoapReply::Fault(fault));
        }

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: raw_body,
            });
        }

        envelope
            .payload()
            .cloned()
            .map(SoapReply::Body)
            .ok_or(TransportError::EmptyBody)
    }

    fn last_request(&self) -> Option<&str> {
        self.last_request.as_deref()
    }

    fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }
}
