//! Category preferences backend.

use super::types::{ApiResponse, SaveCategoriesRequest, UserCategoryData};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

/// Key-value store for a user's selected categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Selected category ids for `user_id`.
    async fn get_categories(&self, user_id: &str) -> Result<Vec<String>>;

    /// Persist the selection; returns what the backend stored.
    async fn save_categories(&self, user_id: &str, categories: &[String]) -> Result<Vec<String>>;
}

/// HTTP client for `GET /categories/:userId` and `POST /categories/save`.
pub struct PreferencesClient {
    base_url: Url,
    http: reqwest::Client,
}

impl PreferencesClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.preferences_url)
            .map_err(|e| Error::config(format!("Invalid preferences_url: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Join path segments onto the base URL, escaping each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("preferences_url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn into_categories(
        status: StatusCode,
        body: ApiResponse<UserCategoryData>,
    ) -> Result<Vec<String>> {
        if !status.is_success() {
            let message = body
                .message
                .or(body.error)
                .unwrap_or_else(|| "API request failed".to_string());
            return Err(Error::api(status.as_u16(), message));
        }

        if !body.success {
            return Err(Error::application(
                body.message
                    .or(body.error)
                    .unwrap_or_else(|| "Preferences request unsuccessful".to_string()),
            ));
        }

        body.data
            .map(|d| d.selected_categories)
            .ok_or_else(|| Error::application("Preferences response carried no data"))
    }
}

#[async_trait]
impl PreferencesStore for PreferencesClient {
    async fn get_categories(&self, user_id: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["categories", user_id])?;
        debug!(%url, "Loading category preferences");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.json::<ApiResponse<UserCategoryData>>().await?;
        Self::into_categories(status, body)
    }

    async fn save_categories(&self, user_id: &str, categories: &[String]) -> Result<Vec<String>> {
        let url = self.endpoint(&["categories", "save"])?;
        debug!(%url, count = categories.len(), "Saving category preferences");

        let response = self
            .http
            .post(url)
            .json(&SaveCategoriesRequest {
                user_id,
                selected_categories: categories,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.json::<ApiResponse<UserCategoryData>>().await?;
        Self::into_categories(status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PreferencesClient {
        PreferencesClient::new(&ApiConfig::default()).unwrap()
    }

    fn body(success: bool, cats: Option<Vec<&str>>) -> ApiResponse<UserCategoryData> {
        ApiResponse {
            success,
            message: None,
            data: cats.map(|c| UserCategoryData {
                user_id: "u1".to_string(),
                selected_categories: c.into_iter().map(String::from).collect(),
                ..Default::default()
            }),
            error: None,
        }
    }

    #[test]
    fn test_endpoint_escapes_user_id() {
        let url = client().endpoint(&["categories", "did:privy:a b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5500/api/categories/did:privy:a%20b"
        );
    }

    #[test]
    fn test_successful_body() {
        let cats =
            PreferencesClient::into_categories(StatusCode::OK, body(true, Some(vec!["tech"])))
                .unwrap();
        assert_eq!(cats, vec!["tech".to_string()]);
    }

    #[test]
    fn test_unsuccessful_body_is_error() {
        assert!(
            PreferencesClient::into_categories(StatusCode::OK, body(false, Some(vec!["tech"])))
                .is_err()
        );
        assert!(PreferencesClient::into_categories(StatusCode::OK, body(true, None)).is_err());
    }

    #[test]
    fn test_http_status_error_keeps_message() {
        let mut failed = body(false, None);
        failed.message = Some("User not found".to_string());
        let err = PreferencesClient::into_categories(StatusCode::NOT_FOUND, failed).unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, ref message } if message == "User not found"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = ApiConfig {
            preferences_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(PreferencesClient::new(&config).is_err());
    }
}
