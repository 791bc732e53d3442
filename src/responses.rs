//! Exchange response decoding (§4.10) — out of the signing core proper, but
//! specified at the boundary since it is the natural counterpart to
//! [`crate::actions`]. The core never produces these; it only consumes them
//! as the caller's eventual read of what it submitted.
//!
//! Grounded on the exchange SDK's `OrderStatus` and `OrderResponseStatus`
//! (`hypercore/types/mod.rs`): reflection-based `serde` decoding is
//! appropriate here, unlike in `actions`, because nothing about response
//! parsing needs byte-exact control — the exchange, not this crate, chose
//! the wire shape.

use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;

/// Top-level exchange response envelope: `{"status": "ok"|"err", "response": ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", content = "response", rename_all = "lowercase")]
pub enum ExchangeResponse {
    Ok(ResponseBody),
    Err(String),
}

/// The `"response"` payload of a successful envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", content = "data")]
pub enum ResponseBody {
    Order { statuses: Vec<OrderResponseStatus> },
    Cancel { statuses: Vec<OrderResponseStatus> },
    /// Any other action type (e.g. `scheduleCancel`, `updateLeverage`):
    /// the core never needs their payload shape, only that the envelope
    /// decoded successfully.
    #[serde(other)]
    Default,
}

/// Per-order outcome inside a batch response (§4.10).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderResponseStatus {
    /// Order accepted, no further detail (e.g. a cancel acknowledgment).
    Success,
    /// Order resting on the book, not immediately filled.
    Resting {
        oid: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        cloid: Option<String>,
    },
    /// Order immediately (fully or partially) filled.
    Filled {
        #[serde(rename = "totalSz")]
        total_sz: Decimal,
        #[serde(rename = "avgPx")]
        avg_px: Decimal,
        oid: u64,
    },
    /// Order rejected with a human-readable reason.
    Error(String),
}

impl OrderResponseStatus {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !matches!(self, OrderResponseStatus::Error(_))
    }

    #[must_use]
    pub fn is_err(&self) -> bool {
        matches!(self, OrderResponseStatus::Error(_))
    }

    #[must_use]
    pub fn oid(&self) -> Option<u64> {
        match self {
            OrderResponseStatus::Resting { oid, .. } | OrderResponseStatus::Filled { oid, .. } => {
                Some(*oid)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            OrderResponseStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// The full per-order state machine a resting order can pass through after
/// acceptance, carried even though §4.10 only names the four response
/// shapes — see DESIGN.md.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    Open,
    Filled,
    Canceled,
    Triggered,
    Rejected,
    MarginCanceled,
    VaultWithdrawalCanceled,
    OpenInterestCapCanceled,
    SelfTradeCanceled,
    ReduceOnlyCanceled,
    SiblingFilledCanceled,
    DelistedCanceled,
    LiquidatedCanceled,
    ScheduledCancel,
    TickRejected,
    MinTradeNtlRejected,
    PerpMarginRejected,
    ReduceOnlyRejected,
    BadAloPxRejected,
    IocCancelRejected,
    BadTriggerPxRejected,
    MarketOrderNoLiquidityRejected,
    PositionIncreaseAtOpenInterestCapRejected,
    PositionFlipAtOpenInterestCapRejected,
    TooAggressiveAtOpenInterestCapRejected,
    OpenInterestIncreaseRejected,
    InsufficientSpotBalanceRejected,
    OracleRejected,
    PerpMaxPositionRejected,
}

impl OrderStatus {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        matches!(self, OrderStatus::Filled)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            OrderStatus::Canceled
                | OrderStatus::MarginCanceled
                | OrderStatus::VaultWithdrawalCanceled
                | OrderStatus::OpenInterestCapCanceled
                | OrderStatus::SelfTradeCanceled
                | OrderStatus::ReduceOnlyCanceled
                | OrderStatus::SiblingFilledCanceled
                | OrderStatus::DelistedCanceled
                | OrderStatus::LiquidatedCanceled
                | OrderStatus::ScheduledCancel
                | OrderStatus::IocCancelRejected
        )
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected
                | OrderStatus::TickRejected
                | OrderStatus::MinTradeNtlRejected
                | OrderStatus::PerpMarginRejected
                | OrderStatus::ReduceOnlyRejected
                | OrderStatus::BadAloPxRejected
                | OrderStatus::BadTriggerPxRejected
                | OrderStatus::MarketOrderNoLiquidityRejected
                | OrderStatus::PositionIncreaseAtOpenInterestCapRejected
                | OrderStatus::PositionFlipAtOpenInterestCapRejected
                | OrderStatus::TooAggressiveAtOpenInterestCapRejected
                | OrderStatus::OpenInterestIncreaseRejected
                | OrderStatus::InsufficientSpotBalanceRejected
                | OrderStatus::OracleRejected
                | OrderStatus::PerpMaxPositionRejected
        )
    }
}
