//! Signs a single-order cancel via the RMP path.
//!
//! Run with `cargo run --example cancel-order`.

use exchange_signing_core::actions::{Action, BatchCancel, Cancel};
use exchange_signing_core::signer::Signer;
use exchange_signing_core::signing;
use exchange_signing_core::{Chain, NonceGenerator};

fn main() {
    let private_key =
        const_hex::decode_to_array("e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e")
            .expect("valid 32-byte hex private key");
    let signer = Signer::from_private_key(&private_key).expect("private key in range");

    let action = Action::Cancel(BatchCancel(vec![Cancel { asset: 0, exchange_order_id: 12345 }]));

    let nonce = NonceGenerator::new().next();
    let signed = signing::sign_action(&signer, Chain::Mainnet, &action, nonce, None, None)
        .expect("signing never fails for a well-formed action and in-range key");

    println!("signer address: 0x{}", const_hex::encode(signer.address()));
    println!("request body: {}", signed.body);
}
