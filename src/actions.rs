//! Trading-action data model and its two wire serializations.
//!
//! Every action here knows how to write itself two ways: as the binary
//! object the RMP path hashes ([`Action::encode_binary`], built directly on
//! [`crate::encoder::Encoder`]) and as the JSON object the exchange actually
//! receives ([`Action::to_json`], built directly on [`crate::json::JsonWriter`]).
//! Both are hand-written per variant rather than derived from a single
//! `#[derive(Serialize)]` struct, because the two forms diverge in ways a
//! derive can't express on its own: the binary form's `OrderRequest` uses
//! single-letter keys (`a, b, p, s, r, t, c`) and the top-level map always
//! opens with `"type"`.

use crate::decimal::Decimal;
use crate::encoder::Encoder;
use crate::error::Error;
use crate::json::JsonWriter;

/// A 16-byte client order id, rendered `0x` + 32 lowercase hex digits. The
/// all-zero value means "unset" but still renders, per §9's "Cloid of all
/// zeros is still a field".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClientOrderId(pub [u8; 16]);

impl ClientOrderId {
    pub const ZERO: ClientOrderId = ClientOrderId([0u8; 16]);

    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", const_hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeInForce {
    Alo,
    Ioc,
    Gtc,
    /// Market orders use this distinct tag with an extreme limit price
    /// rather than `Ioc` plus an extreme price — see DESIGN.md.
    FrontendMarket,
}

impl TimeInForce {
    fn tag(self) -> &'static str {
        match self {
            TimeInForce::Alo => "Alo",
            TimeInForce::Ioc => "Ioc",
            TimeInForce::Gtc => "Gtc",
            TimeInForce::FrontendMarket => "FrontendMarket",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TpSl {
    Tp,
    Sl,
}

impl TpSl {
    fn tag(self) -> &'static str {
        match self {
            TpSl::Tp => "tp",
            TpSl::Sl => "sl",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderGrouping {
    Na,
    NormalTpsl,
    PositionTpsl,
}

impl OrderGrouping {
    fn tag(self) -> &'static str {
        match self {
            OrderGrouping::Na => "na",
            OrderGrouping::NormalTpsl => "normalTpsl",
            OrderGrouping::PositionTpsl => "positionTpsl",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderType {
    Limit { tif: TimeInForce },
    Trigger { is_market: bool, trigger_price: Decimal, kind: TpSl },
}

impl OrderType {
    fn encode_binary(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
        enc.write_map_header(1)?;
        match self {
            OrderType::Limit { tif } => {
                enc.write_str("limit")?;
                enc.write_map_header(1)?;
                enc.write_str("tif")?;
                enc.write_str(tif.tag())
            }
            OrderType::Trigger { is_market, trigger_price, kind } => {
                enc.write_str("trigger")?;
                enc.write_map_header(3)?;
                enc.write_str("isMarket")?;
                enc.write_bool(*is_market)?;
                enc.write_str("triggerPx")?;
                enc.write_str(trigger_price.normalize().format().as_str())?;
                enc.write_str("tpsl")?;
                enc.write_str(kind.tag())
            }
        }
    }

    fn write_json(&self, w: &mut JsonWriter) {
        w.object_start();
        match self {
            OrderType::Limit { tif } => {
                w.key("limit");
                w.object_start();
                w.key("tif");
                w.str_value(tif.tag());
                w.object_end();
            }
            OrderType::Trigger { is_market, trigger_price, kind } => {
                w.key("trigger");
                w.object_start();
                w.key("isMarket");
                w.bool_value(*is_market);
                w.key("triggerPx");
                w.str_value(trigger_price.normalize().format().as_str());
                w.key("tpsl");
                w.str_value(kind.tag());
                w.object_end();
            }
        }
        w.object_end();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderRequest {
    pub asset: u32,
    pub is_buy: bool,
    pub limit_price: Decimal,
    pub size: Decimal,
    pub reduce_only: bool,
    pub order_type: OrderType,
    pub cloid: ClientOrderId,
}

impl OrderRequest {
    fn encode_binary(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
        enc.write_map_header(7)?;
        enc.write_str("a")?;
        enc.write_uint(self.asset as u64)?;
        enc.write_str("b")?;
        enc.write_bool(self.is_buy)?;
        enc.write_str("p")?;
        enc.write_str(self.limit_price.normalize().format().as_str())?;
        enc.write_str("s")?;
        enc.write_str(self.size.normalize().format().as_str())?;
        enc.write_str("r")?;
        enc.write_bool(self.reduce_only)?;
        enc.write_str("t")?;
        self.order_type.encode_binary(enc)?;
        enc.write_str("c")?;
        enc.write_str(&self.cloid.to_hex())
    }

    fn write_json(&self, w: &mut JsonWriter) {
        w.object_start();
        w.key("a");
        w.u64_value(self.asset as u64);
        w.key("b");
        w.bool_value(self.is_buy);
        w.key("p");
        w.str_value(self.limit_price.normalize().format().as_str());
        w.key("s");
        w.str_value(self.size.normalize().format().as_str());
        w.key("r");
        w.bool_value(self.reduce_only);
        w.key("t");
        self.order_type.write_json(w);
        w.key("c");
        w.str_value(&self.cloid.to_hex());
        w.object_end();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchOrder {
    pub orders: Vec<OrderRequest>,
    pub grouping: OrderGrouping,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancel {
    pub asset: u32,
    pub exchange_order_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancelByCloid {
    pub asset: u32,
    pub cloid: ClientOrderId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchCancel(pub Vec<Cancel>);

#[derive(Clone, Debug, PartialEq)]
pub struct BatchCancelCloid(pub Vec<CancelByCloid>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderIdOrCloid {
    Oid(u64),
    Cloid(ClientOrderId),
}

impl OrderIdOrCloid {
    fn encode_binary(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
        match self {
            OrderIdOrCloid::Oid(oid) => enc.write_uint(*oid),
            OrderIdOrCloid::Cloid(cloid) => enc.write_str(&cloid.to_hex()),
        }
    }

    fn write_json(&self, w: &mut JsonWriter) {
        match self {
            OrderIdOrCloid::Oid(oid) => w.u64_value(*oid),
            OrderIdOrCloid::Cloid(cloid) => w.str_value(&cloid.to_hex()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Modify {
    pub target: OrderIdOrCloid,
    pub new_order: OrderRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchModify(pub Vec<Modify>);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ScheduleCancel {
    pub time: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateLeverage {
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateIsolatedMargin {
    pub asset: u32,
    pub is_buy: bool,
    pub ntli: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetReferrer {
    pub code: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EvmUserModify {
    pub using_big_blocks: bool,
}

/// Every action variant the RMP path can sign (§4.7). Each carries its own
/// canonical `"type"` tag and binary/JSON serialization.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Order(BatchOrder),
    Cancel(BatchCancel),
    CancelByCloid(BatchCancelCloid),
    BatchModify(BatchModify),
    ScheduleCancel(ScheduleCancel),
    UpdateLeverage(UpdateLeverage),
    UpdateIsolatedMargin(UpdateIsolatedMargin),
    SetReferrer(SetReferrer),
    Noop,
    EvmUserModify(EvmUserModify),
}

impl Action {
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            Action::Order(_) => "order",
            Action::Cancel(_) => "cancel",
            Action::CancelByCloid(_) => "cancelByCloid",
            Action::BatchModify(_) => "batchModify",
            Action::ScheduleCancel(_) => "scheduleCancel",
            Action::UpdateLeverage(_) => "updateLeverage",
            Action::UpdateIsolatedMargin(_) => "updateIsolatedMargin",
            Action::SetReferrer(_) => "setReferrer",
            Action::Noop => "noop",
            Action::EvmUserModify(_) => "evmUserModify",
        }
    }

    /// Encodes the binary form hashed by the RMP path into `buf`, returning
    /// the number of bytes written.
    pub fn encode_binary(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut enc = Encoder::new(buf);
        match self {
            Action::Order(batch) => {
                enc.write_map_header(3)?;
                enc.write_str("type")?;
                enc.write_str("order")?;
                enc.write_str("orders")?;
                enc.write_array_header(batch.orders.len() as u32)?;
                for order in &batch.orders {
                    order.encode_binary(&mut enc)?;
                }
                enc.write_str("grouping")?;
                enc.write_str(batch.grouping.tag())?;
            }
            Action::Cancel(batch) => {
                enc.write_map_header(2)?;
                enc.write_str("type")?;
                enc.write_str("cancel")?;
                enc.write_str("cancels")?;
                enc.write_array_header(batch.0.len() as u32)?;
                for cancel in &batch.0 {
                    enc.write_map_header(2)?;
                    enc.write_str("a")?;
                    enc.write_uint(cancel.asset as u64)?;
                    enc.write_str("o")?;
                    enc.write_uint(cancel.exchange_order_id)?;
                }
            }
            Action::CancelByCloid(batch) => {
                enc.write_map_header(2)?;
                enc.write_str("type")?;
                enc.write_str("cancelByCloid")?;
                enc.write_str("cancels")?;
                enc.write_array_header(batch.0.len() as u32)?;
                for cancel in &batch.0 {
                    enc.write_map_header(2)?;
                    enc.write_str("asset")?;
                    enc.write_uint(cancel.asset as u64)?;
                    enc.write_str("cloid")?;
                    enc.write_str(&cancel.cloid.to_hex())?;
                }
            }
            Action::BatchModify(batch) => {
                enc.write_map_header(2)?;
                enc.write_str("type")?;
                enc.write_str("batchModify")?;
                enc.write_str("modifies")?;
                enc.write_array_header(batch.0.len() as u32)?;
                for modify in &batch.0 {
                    enc.write_map_header(2)?;
                    enc.write_str("oid")?;
                    modify.target.encode_binary(&mut enc)?;
                    enc.write_str("order")?;
                    modify.new_order.encode_binary(&mut enc)?;
                }
            }
            Action::ScheduleCancel(sc) => {
                enc.write_map_header(2)?;
                enc.write_str("type")?;
                enc.write_str("scheduleCancel")?;
                enc.write_str("time")?;
                match sc.time {
                    Some(time) => enc.write_uint(time)?,
                    None => enc.write_nil()?,
                }
            }
            Action::UpdateLeverage(ul) => {
                enc.write_map_header(4)?;
                enc.write_str("type")?;
                enc.write_str("updateLeverage")?;
                enc.write_str("asset")?;
                enc.write_uint(ul.asset as u64)?;
                enc.write_str("isCross")?;
                enc.write_bool(ul.is_cross)?;
                enc.write_str("leverage")?;
                enc.write_uint(ul.leverage as u64)?;
            }
            Action::UpdateIsolatedMargin(uim) => {
                enc.write_map_header(4)?;
                enc.write_str("type")?;
                enc.write_str("updateIsolatedMargin")?;
                enc.write_str("asset")?;
                enc.write_uint(uim.asset as u64)?;
                enc.write_str("isBuy")?;
                enc.write_bool(uim.is_buy)?;
                enc.write_str("ntli")?;
                enc.write_uint(uim.ntli)?;
            }
            Action::SetReferrer(sr) => {
                enc.write_map_header(2)?;
                enc.write_str("type")?;
                enc.write_str("setReferrer")?;
                enc.write_str("code")?;
                enc.write_str(&sr.code)?;
            }
            Action::Noop => {
                enc.write_map_header(1)?;
                enc.write_str("type")?;
                enc.write_str("noop")?;
            }
            Action::EvmUserModify(evm) => {
                enc.write_map_header(2)?;
                enc.write_str("type")?;
                enc.write_str("evmUserModify")?;
                enc.write_str("usingBigBlocks")?;
                enc.write_bool(evm.using_big_blocks)?;
            }
        }
        Ok(enc.len())
    }

    /// Produces the wire JSON `"action"` object, mirroring the binary form.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut w = JsonWriter::new();
        w.object_start();
        w.key("type");
        w.str_value(self.type_tag());
        match self {
            Action::Order(batch) => {
                w.key("orders");
                w.array_start();
                for order in &batch.orders {
                    order.write_json(&mut w);
                }
                w.array_end();
                w.key("grouping");
                w.str_value(batch.grouping.tag());
            }
            Action::Cancel(batch) => {
                w.key("cancels");
                w.array_start();
                for cancel in &batch.0 {
                    w.object_start();
                    w.key("a");
                    w.u64_value(cancel.asset as u64);
                    w.key("o");
                    w.u64_value(cancel.exchange_order_id);
                    w.object_end();
                }
                w.array_end();
            }
            Action::CancelByCloid(batch) => {
                w.key("cancels");
                w.array_start();
                for cancel in &batch.0 {
                    w.object_start();
                    w.key("asset");
                    w.u64_value(cancel.asset as u64);
                    w.key("cloid");
                    w.str_value(&cancel.cloid.to_hex());
                    w.object_end();
                }
                w.array_end();
            }
            Action::BatchModify(batch) => {
                w.key("modifies");
                w.array_start();
                for modify in &batch.0 {
                    w.object_start();
                    w.key("oid");
                    modify.target.write_json(&mut w);
                    w.key("order");
                    modify.new_order.write_json(&mut w);
                    w.object_end();
                }
                w.array_end();
            }
            Action::ScheduleCancel(sc) => {
                w.key("time");
                match sc.time {
                    Some(time) => w.u64_value(time),
                    None => w.null_value(),
                }
            }
            Action::UpdateLeverage(ul) => {
                w.key("asset");
                w.u64_value(ul.asset as u64);
                w.key("isCross");
                w.bool_value(ul.is_cross);
                w.key("leverage");
                w.u64_value(ul.leverage as u64);
            }
            Action::UpdateIsolatedMargin(uim) => {
                w.key("asset");
                w.u64_value(uim.asset as u64);
                w.key("isBuy");
                w.bool_value(uim.is_buy);
                w.key("ntli");
                w.u64_value(uim.ntli);
            }
            Action::SetReferrer(sr) => {
                w.key("code");
                w.str_value(&sr.code);
            }
            Action::Noop => {}
            Action::EvmUserModify(evm) => {
                w.key("usingBigBlocks");
                w.bool_value(evm.using_big_blocks);
            }
        }
        w.object_end();
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn sample_order() -> OrderRequest {
        OrderRequest {
            asset: 0,
            is_buy: true,
            limit_price: Decimal::from_str("50000").unwrap(),
            size: Decimal::from_str("0.1").unwrap(),
            reduce_only: false,
            order_type: OrderType::Limit { tif: TimeInForce::Gtc },
            cloid: ClientOrderId::ZERO,
        }
    }

    #[test]
    fn cloid_zero_still_renders() {
        assert_eq!(ClientOrderId::ZERO.to_hex(), format!("0x{}", "0".repeat(32)));
    }

    #[test]
    fn noop_binary_and_json_match_minimal_shape() {
        let action = Action::Noop;
        let mut buf = [0u8; 32];
        let len = action.encode_binary(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"\x81\xa4type\xa4noop");
        assert_eq!(action.to_json(), r#"{"type":"noop"}"#);
    }

    #[test]
    fn schedule_cancel_none_encodes_null() {
        let action = Action::ScheduleCancel(ScheduleCancel { time: None });
        assert_eq!(action.to_json(), r#"{"type":"scheduleCancel","time":null}"#);
    }

    #[test]
    fn update_leverage_field_order_matches_contract() {
        let action = Action::UpdateLeverage(UpdateLeverage { asset: 0, is_cross: true, leverage: 10 });
        assert_eq!(
            action.to_json(),
            r#"{"type":"updateLeverage","asset":0,"isCross":true,"leverage":10}"#
        );
    }

    #[test]
    fn order_json_uses_abbreviated_keys() {
        let action = Action::Order(BatchOrder { orders: vec![sample_order()], grouping: OrderGrouping::Na });
        let json = action.to_json();
        assert!(json.starts_with(r#"{"type":"order","orders":[{"a":0,"b":true,"p":"50000","s":"0.1","r":false,"t":{"limit":{"tif":"Gtc"}},"c":"0x"#));
        assert!(json.ends_with(r#","grouping":"na"}"#));
    }

    #[test]
    fn cancel_by_cloid_binary_matches_contract_shape() {
        let action = Action::CancelByCloid(BatchCancelCloid(vec![CancelByCloid {
            asset: 1,
            cloid: ClientOrderId([0x11; 16]),
        }]));
        let mut buf = [0u8; 128];
        let len = action.encode_binary(&mut buf).unwrap();
        // Top-level map has 2 entries: "type" and "cancels".
        assert_eq!(buf[0], 0x82);
        assert_eq!(
            action.to_json(),
            format!(
                r#"{{"type":"cancelByCloid","cancels":[{{"asset":1,"cloid":"0x{}"}}]}}"#,
                "11".repeat(16)
            )
        );
    }

    #[test]
    fn buffer_overflow_is_reported() {
        let action = Action::Noop;
        let mut buf = [0u8; 2];
        assert!(matches!(action.encode_binary(&mut buf), Err(Error::BufferOverflow { .. })));
    }
}
