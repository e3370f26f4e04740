use std::future::Future;

use reqwest::Client;

use crate::error::{AppError, Context};

use super::FetchResult;

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Capability to issue a single GET request.
pub trait HttpClient {
    fn get(&self, url: &str) -> impl Future<Output = FetchResult<HttpResponse>> + Send;
}

/// `HttpClient` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> impl Future<Output = FetchResult<HttpResponse>> + Send {
        let request = self.client.get(url);
        let url = url.to_string();
        async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .with_context(|| format!("Failed to read response body from {}", url))?;

            Ok::<_, AppError>(HttpResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"message":"Get to the chopper"}"#),
            )
            .mount(&server)
            .await;

        let client = ReqwestClient::new();
        let response = client
            .get(&format!("{}/quote", server.uri()))
            .await
            .expect("request succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"message":"Get to the chopper"}"#);
    }

    #[tokio::test]
    async fn non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let response = ReqwestClient::new()
            .get(&server.uri())
            .await
            .expect("request succeeds");

        assert_eq!(response, HttpResponse::new(503, "busy"));
    }

    #[tokio::test]
    async fn invalid_url_is_an_error() {
        let err = ReqwestClient::new()
            .get("not a url")
            .await
            .expect_err("request should fail");
        assert!(!err.to_string().is_empty());
    }
}
