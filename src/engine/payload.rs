//! Wire shapes for the two upstream endpoints.
//!
//! Only the fields the tracker reads are required; everything else is
//! defaulted so harmless upstream additions don't break decoding.

use crate::model::{OrderIdentity, TrackingSnapshot};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub data: OrdersData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersData {
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEntry {
    #[serde(rename = "sharedOrder", default)]
    pub shared_order: bool,
    pub order_id: i64,
    pub customer_id: String,
}

impl OrderEntry {
    pub fn identity(&self) -> OrderIdentity {
        OrderIdentity {
            order_id: self.order_id,
            customer_id: self.customer_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub data: TrackingData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingData {
    #[serde(default)]
    pub configuration: TrackingConfiguration,
    #[serde(default)]
    pub order_status_details: OrderStatusDetails,
    pub track_crouton: TrackCrouton,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingConfiguration {
    #[serde(default)]
    pub polling_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStatusDetails {
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub status_message_colour: String,
    #[serde(default)]
    pub body_layout: String,
    #[serde(default)]
    pub messages: Vec<StatusMessage>,
    #[serde(default)]
    pub eta_text: String,
    #[serde(default)]
    pub eta_subtext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCrouton {
    pub title: String,
    #[serde(default)]
    pub progress_percentage: i64,
}

impl TrackingResponse {
    pub fn into_snapshot(self) -> TrackingSnapshot {
        let TrackingData {
            configuration,
            order_status_details,
            track_crouton,
        } = self.data;
        let hint = configuration
            .polling_interval_seconds
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
        TrackingSnapshot::new(
            track_crouton.title,
            track_crouton.progress_percentage,
            order_status_details.eta_text,
            order_status_details.eta_subtext,
        )
        .with_poll_hint(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_order_list() {
        let body = json!({
            "statusCode": 0,
            "data": {
                "orders": [
                    {
                        "order_id": 42,
                        "customer_id": "c1",
                        "sharedOrder": false,
                        "restaurant_name": "x"
                    },
                    {"order_id": 41, "customer_id": "c1"}
                ]
            }
        });
        let parsed: OrdersResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data.orders.len(), 2);
        assert_eq!(
            parsed.data.orders[0].identity(),
            OrderIdentity {
                order_id: 42,
                customer_id: "c1".into()
            }
        );
        assert!(!parsed.data.orders[1].shared_order);
    }

    #[test]
    fn decodes_tracking_with_messages() {
        let body = json!({
            "data": {
                "configuration": {"polling_interval_seconds": 15},
                "order_status_details": {
                    "status_message": "On the way",
                    "messages": [{"body": "Your rider is nearby"}, {"body": ""}],
                    "eta_text": "10",
                    "eta_subtext": "mins"
                },
                "track_crouton": {"title": "Out for delivery", "progress_percentage": 50}
            }
        });
        let parsed: TrackingResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data.order_status_details.messages.len(), 2);

        let snap = parsed.into_snapshot();
        assert_eq!(snap.title, "Out for delivery");
        assert_eq!(snap.progress_percent, 50);
        assert_eq!(snap.eta(), "10mins");
        assert_eq!(snap.poll_hint, Some(Duration::from_secs(15)));
    }

    #[test]
    fn zero_poll_interval_is_not_a_hint() {
        let body = json!({
            "data": {
                "configuration": {"polling_interval_seconds": 0},
                "track_crouton": {"title": "Preparing your order", "progress_percentage": 10}
            }
        });
        let snap = serde_json::from_value::<TrackingResponse>(body)
            .unwrap()
            .into_snapshot();
        assert_eq!(snap.poll_hint, None);
        assert_eq!(snap.eta(), "");
    }

    #[test]
    fn missing_crouton_is_rejected() {
        let body = json!({"data": {"order_status_details": {}}});
        assert!(serde_json::from_value::<TrackingResponse>(body).is_err());
    }
}
