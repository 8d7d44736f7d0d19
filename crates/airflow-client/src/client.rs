//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use tracing::debug;
use url::Url;

use crate::api::{DagRunsApi, DagsApi, HealthApi, PoolsApi, RolesApi, VariablesApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default API prefix of the Airflow stable REST API.
pub const DEFAULT_API_PATH: &str = "api/v1";

/// Credentials attached to every request.
#[derive(Clone)]
pub enum Auth {
    /// No authentication header.
    None,
    /// `Authorization: Bearer <token>` (OAuth2 access token).
    Bearer(String),
    /// HTTP basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::None => write!(f, "None"),
            Auth::Bearer(_) => write!(f, "Bearer(***)"),
            Auth::Basic { username, .. } => write!(f, "Basic({}:***)", username),
        }
    }
}

/// Airflow REST API client.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use airflow_client::AirflowClient;
///
/// # async fn example() -> airflow_client::Result<()> {
/// let client = AirflowClient::builder()
///     .base_url("http://localhost:8080")
///     .basic_auth("admin", "admin")
///     .build()?;
///
/// let dag = client.dags().get("sales_etl").await?;
/// println!("paused: {:?}", dag.is_paused);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AirflowClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Root of the REST API, always ending in `/`.
    pub(crate) api_root: Url,
    /// Request credentials.
    pub(crate) auth: Auth,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl AirflowClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the API root URL (base endpoint joined with the API prefix).
    pub fn api_root(&self) -> &Url {
        &self.inner.api_root
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the DAGs API.
    pub fn dags(&self) -> DagsApi {
        DagsApi::new(self.clone())
    }

    /// Access the DAG runs API.
    pub fn dag_runs(&self) -> DagRunsApi {
        DagRunsApi::new(self.clone())
    }

    /// Access the variables API.
    pub fn variables(&self) -> VariablesApi {
        VariablesApi::new(self.clone())
    }

    /// Access the pools API.
    pub fn pools(&self) -> PoolsApi {
        PoolsApi::new(self.clone())
    }

    /// Access the roles API.
    pub fn roles(&self) -> RolesApi {
        RolesApi::new(self.clone())
    }

    /// Access the health API.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL from path segments. Each segment is percent-encoded, so
    /// identifiers may contain `/` or `?`.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.api_root.clone();
        let not_a_base = format!("base URL cannot be a base: {}", url);
        url.path_segments_mut()
            .map_err(|_| Error::Config(not_a_base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with auth and timeout applied.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "airflow request");
        let builder = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);
        match &self.inner.auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        let response = self.request(Method::GET, url).send().await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self.request(Method::GET, url).query(query).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make a PATCH request with query parameters (e.g. `update_mask`).
    pub(crate) async fn patch<T, B, Q>(&self, segments: &[&str], body: &B, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self
            .request(Method::PATCH, url)
            .query(query)
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<()> {
        let url = self.url(segments)?;
        let response = self.request(Method::DELETE, url).send().await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        let (title, message) = match response.json::<ErrorResponse>().await {
            Ok(err) => (err.title.clone(), err.message()),
            Err(_) => ("unknown".to_string(), format!("HTTP {}", status)),
        };
        debug!(status, %message, "airflow error response");

        match status {
            404 => Error::NotFound(message),
            401 | 403 => Error::Auth { status, message },
            _ => Error::Api {
                status,
                title,
                message,
            },
        }
    }
}

/// Builder for creating an [`AirflowClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_path: String,
    bearer_token: Option<String>,
    basic: Option<(String, String)>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_path: DEFAULT_API_PATH.to_string(),
            bearer_token: None,
            basic: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base endpoint of the Airflow webserver.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API prefix appended to the base endpoint (default `api/v1`).
    pub fn api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into();
        self
    }

    /// Authenticate with an OAuth2 bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Authenticate with HTTP basic credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic = Some((username.into(), password.into()));
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AirflowClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        let auth = match (self.bearer_token, self.basic) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "bearer token and basic auth are mutually exclusive".to_string(),
                ));
            }
            (Some(token), None) => Auth::Bearer(token),
            (None, Some((username, password))) => Auth::Basic { username, password },
            (None, None) => Auth::None,
        };

        // Parse and normalize base URL
        let mut base = Url::parse(&base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let api_path = self.api_path.trim_matches('/');
        let api_root = if api_path.is_empty() {
            base
        } else {
            base.join(&format!("{}/", api_path))?
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("airflow-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(AirflowClient {
            inner: Arc::new(ClientInner {
                http,
                api_root,
                auth,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_non_http_scheme() {
        let result = ClientBuilder::new().base_url("ftp://airflow.local").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_both_auth_methods() {
        let result = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .bearer_token("token")
            .basic_auth("admin", "admin")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_api_root_default_prefix() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        assert_eq!(client.api_root().as_str(), "http://localhost:8080/api/v1/");
    }

    #[test]
    fn test_api_root_keeps_base_path() {
        let client = ClientBuilder::new()
            .base_url("https://mwaa.example.com/airflow/")
            .api_path("/custom/api/")
            .build()
            .unwrap();

        assert_eq!(
            client.api_root().as_str(),
            "https://mwaa.example.com/airflow/custom/api/"
        );
    }

    #[test]
    fn test_url_building_encodes_segments() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        let url = client.url(&["dags", "sales_etl"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/dags/sales_etl");

        let url = client.url(&["variables", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/variables/a%2Fb%20c");
    }

    #[test]
    fn test_auth_debug_hides_secrets() {
        let auth = Auth::Basic {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", auth);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", Auth::Bearer("tok".into())).contains("tok"));
    }
}
