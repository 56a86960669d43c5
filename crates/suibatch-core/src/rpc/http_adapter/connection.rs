use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Url};

use crate::error::{CoreError, RpcError};

use super::super::transport::{Transport, TransportReply};

/// [`Transport`] over HTTP(S) POST with a pooled `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    auth: Option<(String, String)>,
}

impl HttpTransport {
    /// `connection` must be an `http://` or `https://` URL. Basic auth is
    /// used only when both `user` and `pass` are given.
    pub fn new(connection: &str, user: Option<&str>, pass: Option<&str>) -> Result<Self, CoreError> {
        let auth = resolve_auth(user, pass)?;
        let url = parse_connection(connection)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(RpcError::Transport)?;

        Ok(Self { client, url, auth })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        payload: Vec<u8>,
        deadline: Option<Duration>,
    ) -> Result<TransportReply, RpcError> {
        let mut builder = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload);
        if let Some(deadline) = deadline {
            builder = builder.timeout(deadline);
        }
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, deadline))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, deadline))?;

        Ok(TransportReply {
            status,
            body: body.to_vec(),
        })
    }
}

fn transport_error(err: reqwest::Error, deadline: Option<Duration>) -> RpcError {
    match deadline {
        Some(deadline) if err.is_timeout() => RpcError::Timeout(deadline),
        _ => RpcError::Transport(err),
    }
}

pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
) -> Result<Option<(String, String)>, CoreError> {
    match (user, pass) {
        (Some(u), Some(p)) => Ok(Some((u.to_owned(), p.to_owned()))),
        (Some(_), None) | (None, Some(_)) => Err(CoreError::InvalidConfig(
            "both rpc user and rpc pass must be set together".to_owned(),
        )),
        (None, None) => Ok(None),
    }
}

pub(super) fn parse_connection(connection: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::InvalidConfig(format!(
            "invalid connection `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(connection.to_owned()),
        other => Err(CoreError::InvalidConfig(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}
