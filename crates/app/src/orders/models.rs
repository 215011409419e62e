//! Order Models

use std::fmt;

use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::{auth::User, ids::TypedId, products::models::ProductId};

pub type OrderId = TypedId<Order>;

pub type OrderItemId = TypedId<OrderItem>;

pub type OwnerId = TypedId<User>;

/// Payment state of an order, as the single-letter code the API uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Complete,
    Failed,
    Other(String),
}

impl OrderStatus {
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Pending => "P",
            Self::Complete => "C",
            Self::Failed => "F",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(code: String) -> Self {
        match code.as_str() {
            "P" => Self::Pending,
            "C" => Self::Complete,
            "F" => Self::Failed,
            _ => Self::Other(code),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.code().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Complete => f.write_str("complete"),
            Self::Failed => f.write_str("failed"),
            Self::Other(code) => write!(f, "unknown ({code})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(deserialize_with = "placed_at")]
    pub placed_at: Timestamp,
    #[serde(rename = "pending_status")]
    pub status: OrderStatus,
    #[serde(default)]
    pub owner: Option<OwnerId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Payment provider session for a pending order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentSession {
    #[serde(default)]
    pub session_url: Option<String>,
}

/// Accepts RFC 3339 timestamps and naive datetimes, the latter read as UTC.
fn placed_at<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    raw.parse::<DateTime>()
        .and_then(|datetime| datetime.to_zoned(TimeZone::UTC))
        .map(|zoned| zoned.timestamp())
        .map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn decodes_order_history_entry() -> TestResult {
        let order: Order = serde_json::from_value(json!({
            "id": 12,
            "placed_at": "2025-03-01T10:15:30.123456Z",
            "pending_status": "P",
            "owner": 3,
            "items": [
                {"id": 1, "product": "0b6a3c57-8a40-4d8f-9f0e-2f5b1f1d6c11", "quantity": 2},
                {"id": 2, "product": 7, "quantity": 1}
            ]
        }))?;

        assert_eq!(order.id, OrderId::from("12"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.owner, Some(OwnerId::from("3")));
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.placed_at, "2025-03-01T10:15:30.123456Z".parse::<Timestamp>()?);

        Ok(())
    }

    #[test]
    fn naive_placed_at_is_read_as_utc() -> TestResult {
        let order: Order = serde_json::from_value(json!({
            "id": "9",
            "placed_at": "2025-03-01T10:15:30",
            "pending_status": "C"
        }))?;

        assert_eq!(order.placed_at, "2025-03-01T10:15:30Z".parse::<Timestamp>()?);
        assert_eq!(order.status, OrderStatus::Complete);
        assert!(order.items.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_status_codes_are_preserved() -> TestResult {
        let status: OrderStatus = serde_json::from_value(json!("R"))?;

        assert_eq!(status, OrderStatus::Other("R".to_string()));
        assert_eq!(serde_json::to_value(&status)?, json!("R"));
        assert_eq!(status.to_string(), "unknown (R)");

        Ok(())
    }

    #[test]
    fn garbage_placed_at_is_rejected() {
        let result = serde_json::from_value::<Order>(json!({
            "id": 1,
            "placed_at": "yesterday",
            "pending_status": "P"
        }));

        assert!(result.is_err());
    }
}
