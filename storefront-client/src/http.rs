//! HTTP client for the remote catalog/auth API

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::client::{Catalog, LoginRequest, LoginResponse, RegisterRequest};
use shared::models::{Brand, Category, Product};

/// HTTP client for making network requests to the storefront API
///
/// The bearer token is attached here and nowhere else; components that need
/// authenticated calls go through this client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Clear the authentication token
    pub fn without_token(mut self) -> Self {
        self.token = None;
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Catalog API ==========

    /// Fetch all products
    pub async fn fetch_products(&self) -> ClientResult<Vec<Product>> {
        self.get("products").await
    }

    /// Fetch all categories
    pub async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        self.get("products/categories").await
    }

    /// Fetch all brands
    pub async fn fetch_brands(&self) -> ClientResult<Vec<Brand>> {
        self.get("products/brands").await
    }

    /// Fetch a single product by id
    pub async fn fetch_product(&self, id: i64) -> ClientResult<Product> {
        self.get(&format!("products/{id}")).await
    }

    /// Load the full catalog
    ///
    /// The three fetches run concurrently and the load succeeds only if all
    /// three do. Any failure aggregates into a single `CatalogLoad` error
    /// naming the fetch that failed; partial results are discarded rather
    /// than rendered.
    pub async fn load_catalog(&self) -> ClientResult<Catalog> {
        let (products, categories, brands) = tokio::try_join!(
            async {
                self.fetch_products()
                    .await
                    .map_err(|e| ClientError::CatalogLoad(format!("products: {e}")))
            },
            async {
                self.fetch_categories()
                    .await
                    .map_err(|e| ClientError::CatalogLoad(format!("categories: {e}")))
            },
            async {
                self.fetch_brands()
                    .await
                    .map_err(|e| ClientError::CatalogLoad(format!("brands: {e}")))
            },
        )?;

        tracing::debug!(
            products = products.len(),
            categories = categories.len(),
            brands = brands.len(),
            "Catalog loaded"
        );

        Ok(Catalog {
            products,
            categories,
            brands,
        })
    }

    // ========== Auth API ==========

    /// Login with username and password
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        self.post("auth/login", &request).await
    }

    /// Register a new account
    ///
    /// The API signs the new user in directly, so the response carries the
    /// same token-plus-user shape as login.
    pub async fn register(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        self.post("auth/register", &request).await
    }
}
