use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::clients::error::{HevyApiError, Result};
use crate::clients::models::requests::{OffsetQuery, PageQuery};
use crate::clients::models::responses::{WorkoutCountResponse, WorkoutsListResponse};
use crate::config::{Config, Credentials};

const V1_WORKOUT_COUNT_ENDPOINT: &str = "/v1/workouts/count";
const V1_WORKOUTS_ENDPOINT: &str = "/v1/workouts";
const WEB_WORKOUT_COUNT_ENDPOINT: &str = "/workout_count";
const WEB_WORKOUTS_ENDPOINT: &str = "/user_workouts_paged";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

#[derive(Clone)]
pub struct HevyClient {
    http: Client,
    base: Url,
    credentials: Credentials,
    headers: HeaderMap,
}

impl HevyClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config.credentials.clone(), &config.hevy_api_url)
    }

    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Result<Self> {
        Self::build(credentials, base_url, REQUEST_TIMEOUT)
    }

    fn build(credentials: Credentials, base_url: &str, timeout: Duration) -> Result<Self> {
        let headers = build_headers(&credentials)?;
        let base = Url::parse(base_url)
            .map_err(|e| HevyApiError::client(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base,
            credentials,
            headers,
        })
    }

    pub async fn get_workout_count(&self) -> Result<WorkoutCountResponse> {
        let path = match self.credentials {
            Credentials::ApiKey { .. } => V1_WORKOUT_COUNT_ENDPOINT,
            Credentials::Token { .. } => WEB_WORKOUT_COUNT_ENDPOINT,
        };

        self.get_json::<_, ()>(path, None).await
    }

    /// Fetch one page of workouts, most recent first. `page` is 1-based.
    pub async fn get_workouts(&self, page: u32, page_size: u32) -> Result<WorkoutsListResponse> {
        match &self.credentials {
            Credentials::ApiKey { .. } => {
                let query = PageQuery { page, page_size };
                self.get_json(V1_WORKOUTS_ENDPOINT, Some(&query)).await
            }
            Credentials::Token { username, .. } => {
                let query = OffsetQuery::from_page(username, page, page_size);
                self.get_json(WEB_WORKOUTS_ENDPOINT, Some(&query)).await
            }
        }
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HevyApiError::client(format!("Invalid endpoint {}: {}", path, e)))?;

        tracing::debug!(%url, "hevy.request");

        let mut request = self.http.get(url).headers(self.headers.clone());
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = verify_response_or_raise(request.send().await?).await?;
        let body = response.text().await?;

        let parsed = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

pub fn build_headers(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

    match credentials {
        Credentials::ApiKey { api_key } => {
            headers.insert(HeaderName::from_static("api-key"), secret_value(api_key)?);
        }
        Credentials::Token {
            auth_token,
            x_api_key,
            ..
        } => {
            headers.insert(
                HeaderName::from_static("hevy-platform"),
                HeaderValue::from_static("web"),
            );
            headers.insert(HeaderName::from_static("auth-token"), secret_value(auth_token)?);
            headers.insert(HeaderName::from_static("x-api-key"), secret_value(x_api_key)?);
        }
    }

    Ok(headers)
}

fn secret_value(raw: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(raw)
        .map_err(|_| HevyApiError::client("Credential contains characters not allowed in a header"))?;
    value.set_sensitive(true);
    Ok(value)
}

async fn verify_response_or_raise(response: Response) -> Result<Response> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(HevyApiError::Authentication { status });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HevyApiError::Status { status, body });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_key_credentials() -> Credentials {
        Credentials::ApiKey {
            api_key: "test-api-key".to_string(),
        }
    }

    fn token_credentials() -> Credentials {
        Credentials::Token {
            auth_token: "test-token".to_string(),
            username: "lifter".to_string(),
            x_api_key: "shelobs_hevy_web".to_string(),
        }
    }

    fn test_client(mock_server: &MockServer, credentials: Credentials) -> HevyClient {
        HevyClient::with_base_url(credentials, &mock_server.uri()).unwrap()
    }

    #[test]
    fn test_build_headers_is_deterministic() {
        for credentials in [api_key_credentials(), token_credentials()] {
            let first = build_headers(&credentials).unwrap();
            let second = build_headers(&credentials).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_build_headers_api_key() {
        let headers = build_headers(&api_key_credentials()).unwrap();

        assert_eq!(headers.get("api-key").unwrap(), "test-api-key");
        assert_eq!(headers.get(ACCEPT).unwrap(), ACCEPT_VALUE);
        assert!(headers.get("auth-token").is_none());
    }

    #[test]
    fn test_build_headers_token() {
        let headers = build_headers(&token_credentials()).unwrap();

        assert_eq!(headers.get("auth-token").unwrap(), "test-token");
        assert_eq!(headers.get("x-api-key").unwrap(), "shelobs_hevy_web");
        assert_eq!(headers.get("hevy-platform").unwrap(), "web");
        assert!(headers.get("api-key").is_none());
    }

    #[test]
    fn test_build_headers_rejects_invalid_credential() {
        let credentials = Credentials::ApiKey {
            api_key: "bad\nkey".to_string(),
        };
        let err = build_headers(&credentials).unwrap_err();
        assert!(err.is_client());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HevyClient::with_base_url(api_key_credentials(), "not a url").err().unwrap();
        assert!(err.is_client());
    }

    #[tokio::test]
    async fn test_get_workout_count_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/workouts/count"))
            .and(header("api-key", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"workout_count": 42}"#))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, api_key_credentials());
        let count = client.get_workout_count().await.unwrap();

        assert_eq!(count.workout_count, 42);
    }

    #[tokio::test]
    async fn test_get_workouts_token_uses_limit_offset() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user_workouts_paged"))
            .and(header("auth-token", "test-token"))
            .and(header("x-api-key", "shelobs_hevy_web"))
            .and(query_param("username", "lifter"))
            .and(query_param("limit", "5"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"workouts": [{"id": "w-1", "name": "Push", "start_time": 1718006400, "exercises": []}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, token_credentials());
        let page = client.get_workouts(1, 5).await.unwrap();

        assert_eq!(page.workouts.len(), 1);
        assert_eq!(page.workouts[0].title, "Push");
    }

    #[tokio::test]
    async fn test_get_workouts_api_key_uses_page_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/workouts"))
            .and(query_param("page", "1"))
            .and(query_param("pageSize", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"page": 1, "page_count": 1, "workouts": []}"#))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, api_key_credentials());
        let page = client.get_workouts(1, 10).await.unwrap();

        assert!(page.workouts.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_and_forbidden_are_authentication_errors() {
        for status in [401, 403] {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/v1/workouts/count"))
                .respond_with(
                    ResponseTemplate::new(status).set_body_string(r#"{"workout_count": 1}"#),
                )
                .mount(&mock_server)
                .await;

            let client = test_client(&mock_server, api_key_credentials());
            let err = client.get_workout_count().await.unwrap_err();

            assert!(err.is_authentication(), "status {} gave {:?}", status, err);
        }
    }

    #[tokio::test]
    async fn test_other_non_success_is_communication_error() {
        for status in [400, 404, 429, 500, 503] {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/v1/workouts/count"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&mock_server)
                .await;

            let client = test_client(&mock_server, api_key_credentials());
            let err = client.get_workout_count().await.unwrap_err();

            assert!(err.is_communication(), "status {} gave {:?}", status, err);
            match err {
                HevyApiError::Status { status: got, body } => {
                    assert_eq!(got.as_u16(), status);
                    assert_eq!(body, "nope");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_is_communication_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/workouts/count"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"workout_count": 1}"#)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = HevyClient::build(
            api_key_credentials(),
            &mock_server.uri(),
            Duration::from_millis(100),
        )
        .unwrap();
        let err = client.get_workout_count().await.unwrap_err();

        assert!(matches!(err, HevyApiError::Timeout(_)), "got {:?}", err);
        assert!(err.is_communication());
    }

    #[tokio::test]
    async fn test_connection_refused_is_communication_error() {
        // Nothing listens on port 1.
        let client = HevyClient::with_base_url(api_key_credentials(), "http://127.0.0.1:1").unwrap();
        let err = client.get_workout_count().await.unwrap_err();

        assert!(err.is_communication(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/workouts/count"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, api_key_credentials());
        let err = client.get_workout_count().await.unwrap_err();

        assert!(err.is_client(), "got {:?}", err);
    }
}
