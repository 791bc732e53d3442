//! Signs a single limit order via the RMP path and prints the wire body.
//!
//! Run with `cargo run --example place-order`.

use core::str::FromStr;

use exchange_signing_core::actions::{
    Action, BatchOrder, ClientOrderId, OrderGrouping, OrderRequest, OrderType, TimeInForce,
};
use exchange_signing_core::decimal::Decimal;
use exchange_signing_core::signer::Signer;
use exchange_signing_core::signing;
use exchange_signing_core::{Chain, NonceGenerator};

fn main() {
    let private_key =
        const_hex::decode_to_array("e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e")
            .expect("valid 32-byte hex private key");
    let signer = Signer::from_private_key(&private_key).expect("private key in range");

    let order = OrderRequest {
        asset: 0,
        is_buy: true,
        limit_price: Decimal::from_str("50000").unwrap(),
        size: Decimal::from_str("0.1").unwrap(),
        reduce_only: false,
        order_type: OrderType::Limit { tif: TimeInForce::Gtc },
        cloid: ClientOrderId::ZERO,
    };
    let action = Action::Order(BatchOrder { orders: vec![order], grouping: OrderGrouping::Na });

    let nonce = NonceGenerator::new().next();
    let signed = signing::sign_action(&signer, Chain::Mainnet, &action, nonce, None, None)
        .expect("signing never fails for a well-formed action and in-range key");

    println!("signer address: 0x{}", const_hex::encode(signer.address()));
    println!("request body: {}", signed.body);
}
