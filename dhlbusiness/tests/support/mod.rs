//! In-memory transport recording every call

use dhlsoap::{
    BasicAuth, SoapFault, SoapReply, SoapRequest, SoapTransport, TransportError,
    build_soap_request, parse_soap_envelope,
};
use std::collections::VecDeque;
use xmltree::Element;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub action: String,
    pub basic_auth: Option<BasicAuth>,
    pub header: Option<Element>,
    pub payload: Element,
}

/// Replays queued replies; answers an empty `<Ok/>` element once exhausted
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub calls: Vec<RecordedCall>,
    replies: VecDeque<Result<SoapReply, TransportError>>,
    last_request: Option<String>,
    last_response: Option<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body (the first element of a SOAP Body)
    pub fn reply_xml(mut self, xml: &str) -> Self {
        let envelope = format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{xml}</soap:Body></soap:Envelope>"#
        );
        let parsed = parse_soap_envelope(envelope.as_bytes()).expect("valid test envelope");
        let payload = parsed.body.payload().cloned().expect("payload");
        self.replies.push_back(Ok(SoapReply::Body(payload)));
        self
    }

    pub fn reply_fault(mut self, fault_string: &str) -> Self {
        self.replies.push_back(Ok(SoapReply::Fault(SoapFault {
            fault_code: "soapenv:Server".to_string(),
            fault_string: fault_string.to_string(),
            detail: None,
        })));
        self
    }

    pub fn reply_error(mut self, error: TransportError) -> Self {
        self.replies.push_back(Err(error));
        self
    }

    pub fn last_call(&self) -> &RecordedCall {
        self.calls.last().expect("at least one call")
    }
}

impl SoapTransport for RecordingTransport {
    fn call(&mut self, request: SoapRequest<'_>) -> Result<SoapReply, TransportError> {
        self.last_request = Some(build_soap_request(
            request.header.clone(),
            request.payload.clone(),
        )?);
        self.calls.push(RecordedCall {
            endpoint: request.endpoint.to_string(),
            action: request.action.to_string(),
            basic_auth: request.basic_auth,
            header: request.header,
            payload: request.payload,
        });

        let reply = self
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(SoapReply::Body(Element::new("Ok"))));
        self.last_response = match &reply {
            Ok(SoapReply::Body(body)) => Some(format!("<{}/>", body.name)),
            Ok(SoapReply::Fault(fault)) => Some(fault.fault_string.clone()),
            Err(_) => None,
        };
        reply
    }

    fn last_request(&self) -> Option<&str> {
        self.last_request.as_deref()
    }

    fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }
}
