//! Order status machine.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order, or of one seller's share of it.
///
/// Transitions:
/// ```text
/// Pending ──accept──► Confirmed ──dispatch──► Shipped
///    │                    │
///    └──────reject────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Derives an order's status from its sellers' sub-statuses.
    ///
    /// Every share cancelled gives `Cancelled`. Otherwise only live shares
    /// count: all shipped gives `Shipped`, all confirmed or shipped gives
    /// `Confirmed`, anything else is `Pending`. No shares at all is `Pending`.
    pub fn derive(sub_statuses: impl IntoIterator<Item = OrderStatus>) -> OrderStatus {
        let mut any = false;
        let mut all_shipped = true;
        let mut all_confirmed = true;
        let mut live = false;

        for status in sub_statuses {
            any = true;
            match status {
                OrderStatus::Cancelled => continue,
                OrderStatus::Shipped => {}
                OrderStatus::Confirmed => all_shipped = false,
                OrderStatus::Pending => {
                    all_shipped = false;
                    all_confirmed = false;
                }
            }
            live = true;
        }

        match (any, live) {
            (false, _) => OrderStatus::Pending,
            (true, false) => OrderStatus::Cancelled,
            _ if all_shipped => OrderStatus::Shipped,
            _ if all_confirmed => OrderStatus::Confirmed,
            _ => OrderStatus::Pending,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// A seller-initiated transition.
///
/// On the wire an action is named by the status it moves to, so
/// `"confirmed"` is accept, `"cancelled"` is reject and `"shipped"` is
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellerAction {
    #[serde(rename = "confirmed")]
    Accept,
    #[serde(rename = "cancelled")]
    Reject,
    #[serde(rename = "shipped")]
    Dispatch,
}

impl SellerAction {
    /// Status the acting seller's share moves to.
    pub fn target(&self) -> OrderStatus {
        match self {
            SellerAction::Accept => OrderStatus::Confirmed,
            SellerAction::Reject => OrderStatus::Cancelled,
            SellerAction::Dispatch => OrderStatus::Shipped,
        }
    }

    /// Returns true if the action may fire from `current`.
    pub fn allowed_from(&self, current: OrderStatus) -> bool {
        match self {
            SellerAction::Accept => current == OrderStatus::Pending,
            SellerAction::Reject => {
                matches!(current, OrderStatus::Pending | OrderStatus::Confirmed)
            }
            SellerAction::Dispatch => current == OrderStatus::Confirmed,
        }
    }

    /// Message shown when the action is refused from `current`.
    pub fn refusal(&self, current: &OrderStatus) -> String {
        match self {
            SellerAction::Accept => format!("Cannot accept an order that is already {current}"),
            SellerAction::Reject => format!("Cannot reject an order that is already {current}"),
            SellerAction::Dispatch => format!("Cannot dispatch an order that is already {current}"),
        }
    }

    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerAction::Accept => "accept",
            SellerAction::Reject => "reject",
            SellerAction::Dispatch => "dispatch",
        }
    }

    /// Parses the wire name (`confirmed`, `cancelled`, `shipped`).
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(SellerAction::Accept),
            "cancelled" => Some(SellerAction::Reject),
            "shipped" => Some(SellerAction::Dispatch),
            _ => None,
        }
    }
}

impl std::fmt::Display for SellerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
