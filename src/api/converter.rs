//! Normalization of raw upstream records into [`Market`] cards.

use super::types::RawMarket;
use crate::state::Market;
use chrono::{DateTime, NaiveDate, Utc};

/// Shown when the upstream record carries no image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x200";

const DEFAULT_PRICES: (f64, f64) = (0.5, 0.5);

/// Converts raw gamma records to internal market cards.
pub struct MarketNormalizer;

impl MarketNormalizer {
    /// Normalize one raw record, labelling it with `category`.
    pub fn normalize(raw: &RawMarket, category: &str) -> Market {
        let (yes, no) = Self::parse_outcome_prices(raw.outcome_prices.as_deref());
        let yes_price = yes * 100.0;
        let no_price = no * 100.0;
        let volume = raw.volume();
        let liquidity = raw.liquidity();

        Market {
            id: raw.id.clone(),
            question: raw.question.clone(),
            description: raw.description.clone().unwrap_or_default(),
            category: category.to_string(),
            yes_share: Self::to_share(yes_price),
            no_share: Self::to_share(no_price),
            yes_price,
            no_price,
            volume,
            volume_display: Self::format_currency(volume),
            liquidity,
            liquidity_display: Self::format_currency(liquidity),
            image_url: raw
                .image
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(PLACEHOLDER_IMAGE_URL)
                .to_string(),
            slug: raw.slug.clone(),
            condition_id: raw.condition_id.clone(),
            end_date: raw.end_date.as_deref().and_then(Self::parse_end_date),
            spread: raw.spread,
            last_trade_price: raw.last_trade_price,
        }
    }

    /// Parse the JSON-encoded `["p_yes","p_no"]` array, falling back to 50/50.
    pub fn parse_outcome_prices(encoded: Option<&str>) -> (f64, f64) {
        let Some(encoded) = encoded else {
            return DEFAULT_PRICES;
        };

        let Ok(prices) = serde_json::from_str::<Vec<String>>(encoded) else {
            return DEFAULT_PRICES;
        };

        match prices.as_slice() {
            [yes, no, ..] => match (yes.trim().parse::<f64>(), no.trim().parse::<f64>()) {
                (Ok(yes), Ok(no)) if yes.is_finite() && no.is_finite() => (yes, no),
                _ => DEFAULT_PRICES,
            },
            _ => DEFAULT_PRICES,
        }
    }

    /// Format a dollar amount as `$X.XM`, `$XK` or `$X`.
    pub fn format_currency(num: f64) -> String {
        if num >= 1_000_000.0 {
            format!("${:.1}M", (num / 100_000.0).round() / 10.0)
        } else if num >= 1_000.0 {
            format!("${:.0}K", (num / 1_000.0).round())
        } else {
            format!("${:.0}", num.round())
        }
    }

    fn to_share(percent: f64) -> u8 {
        percent.round().clamp(0.0, 100.0) as u8
    }

    fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(prices: Option<&str>) -> RawMarket {
        RawMarket {
            id: "253591".to_string(),
            question: "Will the Fed cut rates in March?".to_string(),
            outcome_prices: prices.map(str::to_string),
            volume_num: Some(2_345_678.0),
            liquidity_num: Some(12_499.0),
            active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_shares_from_outcome_prices() {
        let market = MarketNormalizer::normalize(&raw(Some(r#"["0.624", "0.377"]"#)), "Economy");
        assert_eq!(market.yes_share, 62);
        assert_eq!(market.no_share, 38);
        assert_eq!(market.category, "Economy");
    }

    #[test]
    fn test_missing_or_malformed_prices_default_to_even() {
        for prices in [None, Some("not json"), Some(r#"["0.7"]"#), Some(r#"["x", "y"]"#)] {
            let market = MarketNormalizer::normalize(&raw(prices), "Economy");
            assert_eq!((market.yes_share, market.no_share), (50, 50), "{prices:?}");
        }
    }

    #[test]
    fn test_shares_are_clamped() {
        let market = MarketNormalizer::normalize(&raw(Some(r#"["1.7", "-0.2"]"#)), "Economy");
        assert_eq!(market.yes_share, 100);
        assert_eq!(market.no_share, 0);
    }

    #[test]
    fn test_shares_need_not_sum_to_hundred() {
        let market = MarketNormalizer::normalize(&raw(Some(r#"["0.514", "0.507"]"#)), "Economy");
        assert_eq!(market.yes_share, 51);
        assert_eq!(market.no_share, 51);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(MarketNormalizer::format_currency(2_345_678.0), "$2.3M");
        assert_eq!(MarketNormalizer::format_currency(1_000_000.0), "$1.0M");
        assert_eq!(MarketNormalizer::format_currency(12_499.0), "$12K");
        assert_eq!(MarketNormalizer::format_currency(1_000.0), "$1K");
        assert_eq!(MarketNormalizer::format_currency(999.4), "$999");
        assert_eq!(MarketNormalizer::format_currency(0.0), "$0");
    }

    #[test]
    fn test_placeholder_image() {
        let market = MarketNormalizer::normalize(&raw(None), "Economy");
        assert_eq!(market.image_url, PLACEHOLDER_IMAGE_URL);

        let mut with_blank = raw(None);
        with_blank.image = Some("  ".to_string());
        assert_eq!(
            MarketNormalizer::normalize(&with_blank, "Economy").image_url,
            PLACEHOLDER_IMAGE_URL
        );

        let mut with_image = raw(None);
        with_image.image = Some("https://cdn.example/fed.png".to_string());
        assert_eq!(
            MarketNormalizer::normalize(&with_image, "Economy").image_url,
            "https://cdn.example/fed.png"
        );
    }

    #[test]
    fn test_end_date_parsing() {
        let mut record = raw(None);
        record.end_date = Some("2025-03-19T18:00:00Z".to_string());
        assert_eq!(
            MarketNormalizer::normalize(&record, "Economy").end_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 19, 18, 0, 0).unwrap())
        );

        record.end_date = Some("2025-03-19".to_string());
        assert_eq!(
            MarketNormalizer::normalize(&record, "Economy").end_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 19, 0, 0, 0).unwrap())
        );

        record.end_date = Some("soon".to_string());
        assert_eq!(MarketNormalizer::normalize(&record, "Economy").end_date, None);
    }

    #[test]
    fn test_formatted_fields() {
        let market = MarketNormalizer::normalize(&raw(None), "Economy");
        assert_eq!(market.volume_display, "$2.3M");
        assert_eq!(market.liquidity_display, "$12K");
        assert_eq!(market.description, "");
    }
}
