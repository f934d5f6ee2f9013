//! Read-only payloads served by the metrics and config endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// One bucket of the market pulse time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulsePoint {
    pub ts: String,
    pub avg_price: f64,
    pub buy_orders: u64,
    pub sell_orders: u64,
}

/// Summary statistics over the pulse window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseStats {
    pub last_price: f64,
    #[serde(default)]
    pub buy_share: f64,
    #[serde(default)]
    pub sell_share: f64,
    #[serde(default)]
    pub orders_sampled: u64,
}

impl PulseStats {
    /// Buy sentiment as a whole percentage, clamped to 0..=100.
    pub fn buy_sentiment(&self) -> u8 {
        if !self.buy_share.is_finite() {
            return 0;
        }
        (self.buy_share * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// `GET /api/metrics/pulse` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseSnapshot {
    /// Anything other than an array decodes as empty.
    #[serde(default, deserialize_with = "points_or_empty")]
    pub points: Vec<PulsePoint>,
    #[serde(default)]
    pub stats: Option<PulseStats>,
}

fn points_or_empty<'de, D>(deserializer: D) -> Result<Vec<PulsePoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

/// `GET /api/config` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub env: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub build_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_sentiment_rounding() {
        let stats = PulseStats {
            last_price: 120.0,
            buy_share: 0.625,
            sell_share: 0.375,
            orders_sampled: 8,
        };
        assert_eq!(stats.buy_sentiment(), 63);
    }

    #[test]
    fn test_buy_sentiment_clamped() {
        let mut stats = PulseStats {
            last_price: 1.0,
            buy_share: 1.7,
            sell_share: 0.0,
            orders_sampled: 1,
        };
        assert_eq!(stats.buy_sentiment(), 100);
        stats.buy_share = f64::NAN;
        assert_eq!(stats.buy_sentiment(), 0);
    }

    #[test]
    fn test_pulse_non_array_points() {
        let snap: PulseSnapshot =
            serde_json::from_str(r#"{"points":{"oops":true},"stats":null}"#).unwrap();
        assert!(snap.points.is_empty());
        assert!(snap.stats.is_none());
    }

    #[test]
    fn test_pulse_full_payload() {
        let snap: PulseSnapshot = serde_json::from_str(
            r#"{
                "points":[{"ts":"12:00","avgPrice":101.5,"buyOrders":4,"sellOrders":2}],
                "stats":{"lastPrice":101.5,"buyShare":0.66,"sellShare":0.34,"ordersSampled":6}
            }"#,
        )
        .unwrap();
        assert_eq!(snap.points.len(), 1);
        assert_eq!(snap.points[0].buy_orders, 4);
        assert_eq!(snap.stats.unwrap().orders_sampled, 6);
    }

    #[test]
    fn test_api_config_partial() {
        let cfg: ApiConfig = serde_json::from_str(r#"{"version":"1.2.0","buildTime":"now"}"#).unwrap();
        assert_eq!(cfg.version.as_deref(), Some("1.2.0"));
        assert_eq!(cfg.build_time.as_deref(), Some("now"));
        assert!(cfg.region.is_none());
    }
}
