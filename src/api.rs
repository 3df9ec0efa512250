use std::sync::Arc;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::Config,
    error::{AppError, Result},
    middleware_layer::interceptor::ResponseInterceptor,
    repositories::session::SessionStore,
};

/// Thin HTTP wrapper around the REST backend.
///
/// Every request gets the configured base URL, JSON content type, the bounded
/// timeout and, when a session token is attached, the bearer header. Every
/// response goes through the [`ResponseInterceptor`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    interceptor: ResponseInterceptor,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        session: Arc<SessionStore>,
        interceptor: ResponseInterceptor,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
            interceptor,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_raw(path).await?;
        decode(&body)
    }

    /// GET returning the undecoded body. Used by the query cache.
    pub async fn get_raw(&self, path: &str) -> Result<Vec<u8>> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send_json(Method::POST, path, body).await?;
        decode(&body)
    }

    /// PUT whose response body is irrelevant to the caller.
    pub async fn put_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body).await.map(|_| ())
    }

    async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let payload = sonic_rs::to_vec(body)
            .map_err(|e| AppError::Internal(format!("Failed to encode request: {}", e)))?;
        self.execute(self.request(method, path).body(payload)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.bearer() {
            Some(bearer) => builder.header(AUTHORIZATION, bearer.as_str()),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Vec<u8>> {
        let response = builder
            .send()
            .await
            .map_err(|e| self.interceptor.on_transport_error(e))?;

        let status = response.status();
        tracing::debug!("{} {}", status, response.url().path());

        let body = response
            .bytes()
            .await
            .map_err(|e| self.interceptor.on_transport_error(e))?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(self.interceptor.on_error_status(status, &body))
        }
    }
}

/// Decodes a JSON body. An empty body decodes as JSON `null`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    sonic_rs::from_slice(body).map_err(AppError::from)
}
