//! Todo HTTP Client
//!
//! Thin adapter over `reqwest` with the content negotiation the contract
//! expects. Every call starts its exchange immediately and hands back a
//! [`ResponseHandle`].
//!
//! Error statuses are normalized here: any 4xx/5xx response is a rejection
//! whose message carries the reason phrase (e.g. "Not Found (404)"), whatever
//! the underlying client would do on its own.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use super::handle::ResponseHandle;
use super::types::{Method, NewTodo, RequestOptions, TodoResponse};

const JSON: &str = "application/json";

/// Errors that can occur during an exchange with the backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend answered with a 4xx/5xx status
    #[error("{reason} ({status})")]
    Status {
        status: u16,
        reason: String,
        body: Option<Value>,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Response has no {0} header")]
    MissingHeader(&'static str),

    #[error("Exchange aborted: {0}")]
    Aborted(String),
}

impl ClientError {
    /// Status code for rejected responses
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client for a todo backend
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use todocheck::client::TodoClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TodoClient::new(Duration::from_secs(10))?;
/// let created = client.create("http://localhost:8000/todos", "Walk the dog");
/// let response = created.resolve().await?;
/// println!("Location: {:?}", response.location());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TodoClient {
    client: Client,
    timeout: Duration,
}

impl TodoClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a request and return a handle to its response
    pub fn request(&self, method: Method, url: &str, opts: RequestOptions) -> ResponseHandle {
        let client = self.client.clone();
        let timeout = self.timeout;
        let url = url.to_string();

        ResponseHandle::spawn(async move { execute(&client, method, &url, opts, timeout).await })
    }

    /// `POST` a JSON body and accept JSON back
    pub fn post<T: Serialize + ?Sized>(&self, url: &str, data: &T) -> ResponseHandle {
        self.with_json(Method::Post, url, data)
    }

    /// `POST` a new todo item
    pub fn create(&self, url: &str, title: &str) -> ResponseHandle {
        self.post(url, &NewTodo::new(title))
    }

    /// `GET` a resource as JSON
    pub fn get(&self, url: &str) -> ResponseHandle {
        self.request(Method::Get, url, RequestOptions::new())
    }

    /// `DELETE` a resource
    pub fn del(&self, url: &str) -> ResponseHandle {
        self.request(Method::Delete, url, RequestOptions::new())
    }

    /// Send a JSON body with an arbitrary method (`PUT` or `PATCH` in practice)
    pub fn update<T: Serialize + ?Sized>(
        &self,
        url: &str,
        method: Method,
        data: &T,
    ) -> ResponseHandle {
        self.with_json(method, url, data)
    }

    /// `OPTIONS` with an `Origin` header, as a browser preflight would
    pub fn options(&self, url: &str, origin: &str) -> ResponseHandle {
        self.request(
            Method::Options,
            url,
            RequestOptions::new().with_header("Origin", origin),
        )
    }

    fn with_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        data: &T,
    ) -> ResponseHandle {
        match serde_json::to_value(data) {
            Ok(body) => self.request(method, url, RequestOptions::new().with_body(body)),
            Err(e) => ResponseHandle::ready(Err(e.into())),
        }
    }
}

async fn execute(
    client: &Client,
    method: Method,
    url: &str,
    opts: RequestOptions,
    timeout: Duration,
) -> ClientResult<TodoResponse> {
    let url = Url::parse(url)?;
    debug!(method = %method, url = %url, "Sending request");

    let mut builder = client.request(method.into(), url.clone());
    if method.expects_body() {
        builder = builder.header(ACCEPT, JSON);
    }
    for (name, value) in &opts.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &opts.body {
        builder = builder
            .header(CONTENT_TYPE, JSON)
            .body(serde_json::to_vec(body)?);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    let status = response.status();
    let headers = collect_headers(response.headers());
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, timeout))?;
    let body = parse_body(&bytes);

    trace!(method = %method, url = %url, status = status.as_u16(), "Received response");

    if status.is_client_error() || status.is_server_error() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            reason: reason_phrase(status),
            body,
        });
    }

    Ok(TodoResponse {
        status: status.as_u16(),
        headers,
        body,
    })
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout(timeout)
    } else {
        ClientError::Request(error)
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Flatten a header map into lower-cased names with comma-joined values
fn collect_headers(headers: &HeaderMap) -> std::collections::BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let value = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_ascii_lowercase(), value)
        })
        .collect()
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}
