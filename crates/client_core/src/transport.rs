use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use shared::{domain::FormSubmission, protocol::ServerResponse};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{config::Settings, error::ClientError};

const JSON_MIME: &str = "application/json";

/// The request never produced a response (DNS, refused connection, TLS,
/// aborted exchange).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Json(ServerResponse),
    /// Body could not be read or was not JSON; `text` is what could be read.
    NotJson { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl EndpointReply {
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let body = match ServerResponse::parse(body) {
            Ok(response) => ReplyBody::Json(response),
            Err(_) => ReplyBody::NotJson {
                text: String::from_utf8_lossy(body).into_owned(),
            },
        };
        Self { status, body }
    }
}

/// Where contact submissions go. One call per submit event, no retries.
#[async_trait]
pub trait ContactEndpoint: Send + Sync {
    async fn post_submission(
        &self,
        submission: &FormSubmission,
    ) -> Result<EndpointReply, TransportError>;
}

pub struct HttpEndpoint {
    http: Client,
    url: Url,
}

impl HttpEndpoint {
    pub fn new(url: Url) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self { http, url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Self::new(settings.endpoint_url()?)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ContactEndpoint for HttpEndpoint {
    async fn post_submission(
        &self,
        submission: &FormSubmission,
    ) -> Result<EndpointReply, TransportError> {
        debug!(endpoint = %self.url, "posting contact submission");
        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_MIME)
            .header(ACCEPT, JSON_MIME)
            .json(submission)
            .send()
            .await?;
        let status = response.status().as_u16();
        info!(status, "response status from submission endpoint");

        // A body that fails mid-read is reported like an unparseable one.
        let reply = match response.bytes().await {
            Ok(bytes) => EndpointReply::from_body(status, &bytes),
            Err(err) => EndpointReply {
                status,
                body: ReplyBody::NotJson {
                    text: format!("<body read failed: {err}>"),
                },
            },
        };
        Ok(reply)
    }
}
