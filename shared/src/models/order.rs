//! Order Models (订单)

use serde::{Deserialize, Serialize};

/// Order status
///
/// ```text
/// PENDING_PAYMENT ──pay──▶ TO_BE_CONFIRMED ──confirm──▶ CONFIRMED ──dispatch──▶ DELIVERY_IN_PROGRESS ──▶ COMPLETED
///        └──────────────── any non-terminal ──cancel──▶ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    PendingPayment,
    ToBeConfirmed,
    Confirmed,
    DeliveryInProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::ToBeConfirmed => "TO_BE_CONFIRMED",
            Self::Confirmed => "CONFIRMED",
            Self::DeliveryInProgress => "DELIVERY_IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states are sinks
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Forward-only transition table
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Cancelled)
                | (PendingPayment, ToBeConfirmed)
                | (ToBeConfirmed, Confirmed)
                | (Confirmed, DeliveryInProgress)
                | (DeliveryInProgress, Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PayStatus {
    #[default]
    Unpaid,
    Paid,
    Refund,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PayMethod {
    #[default]
    Wechat,
    Alipay,
}

/// Order entity
///
/// Address fields are a snapshot taken at submission; they are not kept in
/// sync with the address book afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Customer-facing order number (unique)
    pub number: String,
    pub status: OrderStatus,
    pub user_id: i64,
    pub address_book_id: i64,
    /// Placement time (Unix millis)
    pub order_time: i64,
    pub checkout_time: Option<i64>,
    pub pay_method: PayMethod,
    pub pay_status: PayStatus,
    pub amount: f64,
    pub remark: Option<String>,
    pub phone: String,
    pub consignee: String,
    pub address: String,
    pub estimated_delivery_time: Option<i64>,
    /// true = deliver immediately, false = at `estimated_delivery_time`
    pub delivery_status: bool,
    /// Packaging fee as submitted by the client
    pub pack_amount: i64,
    pub tableware_number: i64,
    /// true = tableware matches the number of dishes
    pub tableware_status: bool,
    pub cancel_reason: Option<String>,
    pub cancel_time: Option<i64>,
    pub dispatched_at: Option<i64>,
    pub delivery_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Last actor; `None` means the system (sweeper)
    pub updated_by: Option<i64>,
}

/// Order line, snapshotted from the cart at submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: Option<i64>,
    pub combo_id: Option<i64>,
    pub flavor: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub quantity: i64,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

fn default_true() -> bool {
    true
}

/// Submit order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOrder {
    pub address_book_id: i64,
    #[serde(default)]
    pub pay_method: PayMethod,
    pub remark: Option<String>,
    pub estimated_delivery_time: Option<i64>,
    #[serde(default = "default_true")]
    pub delivery_status: bool,
    #[serde(default)]
    pub pack_amount: i64,
    #[serde(default)]
    pub tableware_number: i64,
    #[serde(default = "default_true")]
    pub tableware_status: bool,
    /// Total the client displayed; rejected if it disagrees with the cart
    pub expected_amount: Option<f64>,
}

impl SubmitOrder {
    pub fn to_address(address_book_id: i64) -> Self {
        Self {
            address_book_id,
            pay_method: PayMethod::default(),
            remark: None,
            estimated_delivery_time: None,
            delivery_status: true,
            pack_amount: 0,
            tableware_number: 0,
            tableware_status: true,
            expected_amount: None,
        }
    }
}

/// Submit order response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSubmitted {
    pub id: i64,
    pub number: String,
    pub amount: f64,
    pub order_time: i64,
}

/// Cancel payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelOrder {
    pub reason: Option<String>,
}

/// Pagination for order history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub status: Option<OrderStatus>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}
