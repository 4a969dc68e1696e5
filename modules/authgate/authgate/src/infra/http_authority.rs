//! HTTP client for the remote decision authorities.
//!
//! Each decision is a JSON `POST` to the configured endpoint. Only status
//! `200` allows; any other status is a denial from a reachable authority.
//! Failing to build, send or time the request is reported as an
//! [`AuthorityError`] so the caller can tell it apart from a denial.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use authgate_sdk::{AuthenticateRequest, AuthorityError, AuthorizeRequest, DecisionAuthority};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Serialize)]
struct AuthenticateBody<'a> {
    client_id: &'a str,
    username: &'a str,
    password: Cow<'a, str>,
}

#[derive(Serialize)]
struct AuthorizeBody<'a> {
    client_id: &'a str,
    username: &'a str,
    topic: &'a str,
    write: bool,
}

/// [`DecisionAuthority`] backed by two HTTP endpoints.
///
/// A `None` endpoint answers every call with
/// [`AuthorityError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: Client,
    auth_url: Option<Url>,
    acl_url: Option<Url>,
}

impl HttpAuthority {
    #[must_use]
    pub const fn new(client: Client, auth_url: Option<Url>, acl_url: Option<Url>) -> Self {
        Self {
            client,
            auth_url,
            acl_url,
        }
    }

    /// Build the shared client; `timeout` bounds the whole request.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the TLS backend cannot be initialised.
    pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(timeout).build()
    }

    async fn post<B: Serialize + Sync>(&self, url: &Url, body: &B) -> Result<bool, AuthorityError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| AuthorityError::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Authority responded");
        Ok(status == StatusCode::OK)
    }
}

fn transport_error(e: reqwest::Error) -> AuthorityError {
    if e.is_timeout() {
        AuthorityError::Timeout
    } else {
        AuthorityError::Transport(e.to_string())
    }
}

#[async_trait]
impl DecisionAuthority for HttpAuthority {
    async fn authenticate(&self, request: &AuthenticateRequest) -> Result<bool, AuthorityError> {
        let url = self
            .auth_url
            .as_ref()
            .ok_or(AuthorityError::NotConfigured("authentication"))?;

        let body = AuthenticateBody {
            client_id: request.client_id(),
            username: request.username(),
            password: String::from_utf8_lossy(request.password()),
        };
        self.post(url, &body).await
    }

    async fn authorize(&self, request: &AuthorizeRequest) -> Result<bool, AuthorityError> {
        let url = self
            .acl_url
            .as_ref()
            .ok_or(AuthorityError::NotConfigured("authorization"))?;

        let body = AuthorizeBody {
            client_id: request.client_id(),
            username: request.username(),
            topic: request.topic(),
            write: request.is_write(),
        };
        self.post(url, &body).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn authority(server: &MockServer, timeout: Duration) -> HttpAuthority {
        HttpAuthority::new(
            HttpAuthority::build_client(timeout).unwrap(),
            Some(Url::parse(&server.url("/auth")).unwrap()),
            Some(Url::parse(&server.url("/acl")).unwrap()),
        )
    }

    #[tokio::test]
    async fn authenticate_posts_json_and_allows_on_200() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth")
                    .header("content-type", JSON_CONTENT_TYPE)
                    .json_body(json!({
                        "client_id": "c1",
                        "username": "alice",
                        "password": "pw"
                    }));
                then.status(200);
            })
            .await;

        let client = authority(&server, Duration::from_secs(5));
        let res = client
            .authenticate(&AuthenticateRequest::new("c1", "alice", b"pw".to_vec()))
            .await;

        assert!(matches!(res, Ok(true)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn authorize_posts_topic_and_write_flag() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/acl").json_body(json!({
                    "client_id": "c1",
                    "username": "alice",
                    "topic": "sensors/1/temp",
                    "write": true
                }));
                then.status(200);
            })
            .await;

        let client = authority(&server, Duration::from_secs(5));
        let res = client
            .authorize(&AuthorizeRequest::new("c1", "alice", "sensors/1/temp", true))
            .await;

        assert!(matches!(res, Ok(true)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_200_statuses_are_denials() {
        for status in [201_u16, 204, 401, 403, 500] {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/acl");
                    then.status(status);
                })
                .await;

            let client = authority(&server, Duration::from_secs(5));
            let res = client
                .authorize(&AuthorizeRequest::new("c1", "bob", "t", false))
                .await;

            assert!(matches!(res, Ok(false)), "status {status} must deny");
        }
    }

    #[tokio::test]
    async fn invalid_utf8_password_is_sent_lossily() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth").json_body(json!({
                    "client_id": "c1",
                    "username": "alice",
                    "password": "a\u{fffd}b"
                }));
                then.status(200);
            })
            .await;

        let client = authority(&server, Duration::from_secs(5));
        let res = client
            .authenticate(&AuthenticateRequest::new("c1", "alice", vec![b'a', 0xff, b'b']))
            .await;

        assert!(matches!(res, Ok(true)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_authority_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/auth")).unwrap();
        let client = HttpAuthority::new(
            HttpAuthority::build_client(Duration::from_secs(2)).unwrap(),
            Some(url),
            None,
        );

        let res = client
            .authenticate(&AuthenticateRequest::new("c1", "alice", b"pw".to_vec()))
            .await;

        assert!(matches!(res, Err(AuthorityError::Transport(_))), "got {res:?}");
    }

    #[tokio::test]
    async fn slow_authority_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(200).delay(Duration::from_secs(3));
            })
            .await;

        let client = authority(&server, Duration::from_millis(200));
        let res = client
            .authenticate(&AuthenticateRequest::new("c1", "alice", b"pw".to_vec()))
            .await;

        assert!(matches!(res, Err(AuthorityError::Timeout)), "got {res:?}");
    }

    #[tokio::test]
    async fn missing_endpoint_is_not_configured() {
        let client = HttpAuthority::new(
            HttpAuthority::build_client(Duration::from_secs(1)).unwrap(),
            None,
            None,
        );

        let res = client
            .authorize(&AuthorizeRequest::new("c1", "alice", "t", false))
            .await;

        assert!(matches!(
            res,
            Err(AuthorityError::NotConfigured("authorization"))
        ));
    }
}
