//! Network probing of publication URLs.
//!
//! The classifier only needs "status and content type of a URL, or an
//! error"; [`Probe`] is that seam. [`HttpProber`] does it with a HEAD
//! request, [`OfflineProber`] refuses every URL.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

use crate::error::{ProbeError, ProbeResult};

/// What a probe learned about a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    pub status: u16,
    /// `Content-Type` header, empty when the server sent none.
    pub content_type: String,
}

impl ProbeResponse {
    /// A successful response serving a PDF.
    pub fn is_pdf(&self) -> bool {
        self.status == 200 && self.content_type.contains("/pdf")
    }
}

pub trait Probe {
    fn probe(&self, url: &str) -> ProbeResult<ProbeResponse>;
}

/// Blocking HTTP prober.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> ProbeResult<Self> {
        let mut builder = Client::builder().user_agent(user_agent.to_string());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProbeError::RequestFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Probe for HttpProber {
    fn probe(&self, url: &str) -> ProbeResult<ProbeResponse> {
        let parsed = Url::parse(url).map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;
        let response = self
            .client
            .head(parsed)
            .send()
            .map_err(|e| ProbeError::RequestFailed(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            content_type,
        })
    }
}

/// Prober for runs without network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProber;

impl Probe for OfflineProber {
    fn probe(&self, _url: &str) -> ProbeResult<ProbeResponse> {
        Err(ProbeError::Disabled)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Canned responses; unknown URLs fail. Records every probed URL.
    #[derive(Default)]
    pub(crate) struct FakeProber {
        responses: HashMap<String, ProbeResponse>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl FakeProber {
        pub(crate) fn with(mut self, url: &str, status: u16, content_type: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                ProbeResponse {
                    status,
                    content_type: content_type.to_string(),
                },
            );
            self
        }

        pub(crate) fn calls(&self) -> Rc<RefCell<Vec<String>>> {
            Rc::clone(&self.calls)
        }
    }

    impl Probe for FakeProber {
        fn probe(&self, url: &str) -> ProbeResult<ProbeResponse> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| ProbeError::RequestFailed(format!("connection refused: {}", url)))
        }
    }
}
