//! Kroki HTTP renderer.
//!
//! Two request styles are supported:
//! - `GET`: nothing is sent. The diagram source is zlib-compressed and
//!   URL-safe base64 encoded into an image URL that the page loads directly.
//! - `POST`: the source is sent as JSON and the response bytes are embedded.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use ureq::Agent;

use crate::consts::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT, GET_PAYLOAD_WARN_LEN};
use crate::render::{RenderError, RenderRequest, RenderedArtifact, Renderer};

/// Query-string unreserved characters: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How diagrams are handed to Kroki.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// Reference the image by URL.
    Get,
    /// Fetch the image and embed it.
    #[default]
    Post,
}

impl HttpMethod {
    /// Parse a method name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("get") {
            Some(Self::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Some(Self::Post)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Create HTTP agent with the specified timeout.
///
/// Non-2xx statuses are returned as responses so their bodies can be read.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`Renderer`] backed by a Kroki server.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use mdkroki_diagrams::{HttpMethod, KrokiRenderer};
///
/// let renderer = KrokiRenderer::new("http://localhost:8000")
///     .method(HttpMethod::Get)
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct KrokiRenderer {
    server_url: String,
    method: HttpMethod,
    timeout: Duration,
    user_agent: Option<String>,
    agent: Agent,
}

impl Default for KrokiRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl KrokiRenderer {
    /// Create a renderer for the given server URL using `POST`.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            server_url: server_url.trim_end_matches('/').to_owned(),
            method: HttpMethod::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    #[must_use]
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set HTTP timeout for Kroki requests.
    ///
    /// Default is 30 seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.agent = create_agent(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    #[must_use]
    pub fn http_method(&self) -> HttpMethod {
        self.method
    }

    /// Timeout applied to each request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, request: &RenderRequest<'_>) -> String {
        format!(
            "{}/{}/{}",
            self.server_url, request.diagram_type, request.extension
        )
    }

    /// Image URL carrying the encoded source and options.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if compression fails.
    pub fn image_url(&self, request: &RenderRequest<'_>) -> Result<String, RenderError> {
        let payload = encode_source(request.source)?;
        if payload.len() >= GET_PAYLOAD_WARN_LEN {
            tracing::debug!(
                len = payload.len(),
                "encoded diagram is long, Kroki may not be able to read it completely"
            );
        }

        let mut url = format!("{}/{payload}", self.endpoint(request));
        let query = encode_query(request.options);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }

    fn post(&self, request: &RenderRequest<'_>) -> Result<RenderedArtifact, RenderError> {
        let url = self.endpoint(request);
        tracing::debug!(url = %url, "POST diagram");

        let body = serde_json::json!({
            "diagram_source": request.source,
            "diagram_options": request.options,
        });
        let mut builder = self.agent.post(&url);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.header("User-Agent", user_agent.as_str());
        }
        let response = builder
            .send_json(&body)
            .map_err(|e| RenderError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status != 200 {
            let text = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(match status {
                400 => RenderError::Diagram { body: text },
                _ => RenderError::Status { status, body: text },
            });
        }

        let bytes = body
            .read_to_vec()
            .map_err(|e| RenderError::Request(e.to_string()))?;
        Ok(RenderedArtifact::embedded(request.extension, bytes))
    }
}

impl Renderer for KrokiRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedArtifact, RenderError> {
        match self.method {
            HttpMethod::Get => {
                let url = self.image_url(request)?;
                Ok(RenderedArtifact::url(request.extension, url))
            }
            HttpMethod::Post => self.post(request),
        }
    }
}

/// Compress diagram source (zlib, level 9) and encode as URL-safe base64.
///
/// # Errors
///
/// Returns an I/O error if compression fails.
pub fn encode_source(source: &str) -> std::io::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(source.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE.encode(compressed))
}

fn encode_query(options: &BTreeMap<String, String>) -> String {
    options
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_ENCODE_SET),
                utf8_percent_encode(v, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
