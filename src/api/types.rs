//! Wire types for the upstream market source and the preferences backend.

use serde::{Deserialize, Serialize};

/// A market record as returned by `GET /markets` on the gamma API.
///
/// Only the fields the feed reads are modelled; everything is defaulted so a
/// sparse record still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMarket {
    pub id: String,
    pub question: String,
    pub description: Option<String>,
    /// JSON-encoded array of outcome prices, e.g. `"[\"0.62\", \"0.38\"]"`.
    pub outcome_prices: Option<String>,
    pub volume_num: Option<f64>,
    pub liquidity_num: Option<f64>,
    pub image: Option<String>,
    pub slug: Option<String>,
    pub condition_id: Option<String>,
    pub end_date: Option<String>,
    pub spread: Option<f64>,
    pub last_trade_price: Option<f64>,
    pub active: bool,
    pub closed: bool,
}

impl RawMarket {
    pub fn volume(&self) -> f64 {
        self.volume_num.unwrap_or(0.0)
    }

    pub fn liquidity(&self) -> f64 {
        self.liquidity_num.unwrap_or(0.0)
    }
}

/// Envelope used by every preferences endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Stored category selection for a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCategoryData {
    pub user_id: String,
    pub selected_categories: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Body of `POST /categories/save`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCategoriesRequest<'a> {
    pub user_id: &'a str,
    pub selected_categories: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_market_deserializes_gamma_record() {
        let json = r#"{
            "id": "516710",
            "question": "Will BTC close above $100k in 2025?",
            "conditionId": "0xabc",
            "slug": "btc-100k-2025",
            "description": "Resolves YES if ...",
            "outcomes": "[\"Yes\", \"No\"]",
            "outcomePrices": "[\"0.655\", \"0.345\"]",
            "volumeNum": 1523400.5,
            "liquidityNum": 48210.2,
            "endDate": "2025-12-31T12:00:00Z",
            "image": "https://polymarket-upload.s3.amazonaws.com/btc.png",
            "active": true,
            "closed": false,
            "spread": 0.01,
            "lastTradePrice": 0.66
        }"#;

        let market: RawMarket = serde_json::from_str(json).unwrap();
        assert_eq!(market.id, "516710");
        assert_eq!(market.condition_id.as_deref(), Some("0xabc"));
        assert_eq!(market.volume(), 1523400.5);
        assert!(market.active);
        assert!(!market.closed);
    }

    #[test]
    fn test_sparse_record_uses_defaults() {
        let market: RawMarket = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(market.liquidity(), 0.0);
        assert!(!market.active);
        assert!(market.outcome_prices.is_none());
    }

    #[test]
    fn test_save_request_shape() {
        let cats = vec!["crypto".to_string()];
        let body = SaveCategoriesRequest {
            user_id: "u1",
            selected_categories: &cats,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"userId": "u1", "selectedCategories": ["crypto"]})
        );
    }
}
