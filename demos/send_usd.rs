//! Signs a `usdSend` transfer via the typed-data path.
//!
//! Run with `cargo run --example send-usd`.

use exchange_signing_core::signer::Signer;
use exchange_signing_core::signing::{self, TypedAction};
use exchange_signing_core::Chain;

fn main() {
    let private_key =
        const_hex::decode_to_array("e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e")
            .expect("valid 32-byte hex private key");
    let signer = Signer::from_private_key(&private_key).expect("private key in range");

    let destination: [u8; 20] =
        const_hex::decode_to_array("0D1d9635D0640821d15e323ac8AdADfA9c111414")
            .expect("valid 20-byte hex address");
    let action = TypedAction::UsdSend { destination, amount: "1", time: 1_690_393_044_548 };

    let signed = signing::sign_typed(&signer, Chain::Mainnet, &action)
        .expect("signing never fails for a well-formed action and in-range key");

    println!("signer address: 0x{}", const_hex::encode(signer.address()));
    println!("request body: {}", signed.body);
}
