//! Orchestrates the two signing pipelines (§4.8): the RMP path for trading
//! actions, and the typed-data path for transfers and approvals. Both
//! bottom out in [`crate::signer::Signer::sign`]; what differs is how the
//! 32-byte hash handed to it is built.

use sha3::{Digest, Keccak256};

use crate::actions::Action;
use crate::chain::Chain;
use crate::error::Error;
use crate::json::JsonWriter;
use crate::signer::{Signature, Signer};
use crate::typed_hash::{self, Domain};

/// Binary-encode buffer size for the RMP path. Large enough for a
/// `BatchOrder` at its §3 cap of 255 orders with headroom; callers signing
/// unusually large batches can fall back to [`connection_hash_into`] with
/// their own buffer.
pub const BINARY_BUFFER_SIZE: usize = 32 * 1024;

fn keccak(data: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for chunk in data {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

/// A completed signature plus the exact JSON body the exchange expects.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub signature: Signature,
    pub body: String,
}

/// Computes the RMP path's connection hash (§6, "Connection-hash preamble")
/// into caller-provided `binary_buf`, with no heap allocation.
pub fn connection_hash_into(
    binary_buf: &mut [u8],
    action: &Action,
    nonce: u64,
    vault_address: Option<[u8; 20]>,
    expires_after: Option<u64>,
) -> Result<[u8; 32], Error> {
    let binary_len = action.encode_binary(binary_buf)?;
    let binary_action = &binary_buf[..binary_len];

    let nonce_bytes = nonce.to_be_bytes();

    let mut vault_preamble = [0u8; 21];
    let vault_preamble_slice: &[u8] = match vault_address {
        Some(address) => {
            vault_preamble[0] = 0x01;
            vault_preamble[1..21].copy_from_slice(&address);
            &vault_preamble[..21]
        }
        None => {
            vault_preamble[0] = 0x00;
            &vault_preamble[..1]
        }
    };

    let mut expires_preamble = [0u8; 9];
    let expires_preamble_slice: &[u8] = match expires_after {
        Some(value) => {
            expires_preamble[0] = 0x00;
            expires_preamble[1..9].copy_from_slice(&value.to_be_bytes());
            &expires_preamble[..9]
        }
        None => &[],
    };

    Ok(keccak(&[binary_action, &nonce_bytes, vault_preamble_slice, expires_preamble_slice]))
}

fn address_hex(address: &[u8; 20]) -> String {
    format!("0x{}", const_hex::encode(address))
}

fn hash_hex(hash: &[u8; 32]) -> String {
    format!("0x{}", const_hex::encode(hash))
}

fn request_body_json(
    action_json: &str,
    nonce: u64,
    signature: &Signature,
    vault_address: Option<[u8; 20]>,
    expires_after: Option<u64>,
) -> String {
    let mut w = JsonWriter::new();
    w.object_start();
    w.key("action");
    w.raw_value(action_json);
    w.key("nonce");
    w.u64_value(nonce);
    w.key("signature");
    w.object_start();
    w.key("r");
    w.str_value(&hash_hex(&signature.r));
    w.key("s");
    w.str_value(&hash_hex(&signature.s));
    w.key("v");
    w.u64_value((signature.v + 27) as u64);
    w.object_end();
    w.key("vaultAddress");
    match vault_address {
        Some(address) => w.str_value(&address_hex(&address)),
        None => w.null_value(),
    }
    w.key("expiresAfter");
    match expires_after {
        Some(value) => w.u64_value(value),
        None => w.null_value(),
    }
    w.object_end();
    w.finish()
}

/// Signs a trading action via the RMP path (§4.8): binary-encode, compute
/// the connection hash, wrap it in an `Agent` struct under the fixed chain
/// id 1337, and sign.
pub fn sign_action(
    signer: &Signer,
    chain: Chain,
    action: &Action,
    nonce: u64,
    vault_address: Option<[u8; 20]>,
    expires_after: Option<u64>,
) -> Result<SignedRequest, Error> {
    let mut binary_buf = [0u8; BINARY_BUFFER_SIZE];
    let connection_id =
        connection_hash_into(&mut binary_buf, action, nonce, vault_address, expires_after)?;

    let struct_hash = typed_hash::agent_struct_hash(chain.agent_source(), &connection_id);
    let signing_hash = typed_hash::signing_hash(&Domain::AGENT.separator(), &struct_hash);

    let signature = signer.sign(&signing_hash)?;
    let body = request_body_json(&action.to_json(), nonce, &signature, vault_address, expires_after);
    Ok(SignedRequest { signature, body })
}

/// One instance of the typed-data path's eight schemas (§4.6, §4.8).
///
/// `destination`/`builder`/`agent_address` are raw 20-byte addresses, not
/// caller-formatted strings: the wire schemas declare these as Solidity
/// `string` fields holding the *lowercase* hex rendering of an `address`, so
/// hashing a caller-supplied checksum-case string instead would sign a
/// different message than the exchange expects.
pub enum TypedAction<'a> {
    UsdSend { destination: [u8; 20], amount: &'a str, time: u64 },
    SpotSend { destination: [u8; 20], token: &'a str, amount: &'a str, time: u64 },
    SendAsset {
        destination: [u8; 20],
        source_dex: &'a str,
        destination_dex: &'a str,
        token: &'a str,
        amount: &'a str,
        from_sub_account: &'a str,
        nonce: u64,
    },
    UsdClassTransfer { amount: &'a str, to_perp: bool, nonce: u64 },
    ApproveAgent { agent_address: [u8; 20], agent_name: &'a str, nonce: u64 },
    ApproveBuilderFee { max_fee_rate: &'a str, builder: [u8; 20], nonce: u64 },
    Withdraw { destination: [u8; 20], amount: &'a str, time: u64 },
    ConvertToMultiSigUser { signers_json: &'a str, nonce: u64 },
}

impl<'a> TypedAction<'a> {
    fn struct_hash(&self, chain: Chain) -> [u8; 32] {
        let chain_name = chain.hyperliquid_chain_name();
        match self {
            TypedAction::UsdSend { destination, amount, time } => {
                typed_hash::usd_send_struct_hash(chain_name, &address_hex(destination), amount, *time)
            }
            TypedAction::SpotSend { destination, token, amount, time } => typed_hash::spot_send_struct_hash(
                chain_name,
                &address_hex(destination),
                token,
                amount,
                *time,
            ),
            TypedAction::SendAsset {
                destination,
                source_dex,
                destination_dex,
                token,
                amount,
                from_sub_account,
                nonce,
            } => typed_hash::send_asset_struct_hash(
                chain_name,
                &address_hex(destination),
                source_dex,
                destination_dex,
                token,
                amount,
                from_sub_account,
                *nonce,
            ),
            TypedAction::UsdClassTransfer { amount, to_perp, nonce } => {
                typed_hash::usd_class_transfer_struct_hash(chain_name, amount, *to_perp, *nonce)
            }
            TypedAction::ApproveAgent { agent_address, agent_name, nonce } => {
                typed_hash::approve_agent_struct_hash(chain_name, agent_address, agent_name, *nonce)
            }
            TypedAction::ApproveBuilderFee { max_fee_rate, builder, nonce } => {
                typed_hash::approve_builder_fee_struct_hash(chain_name, max_fee_rate, builder, *nonce)
            }
            TypedAction::Withdraw { destination, amount, time } => {
                typed_hash::withdraw_struct_hash(chain_name, &address_hex(destination), amount, *time)
            }
            TypedAction::ConvertToMultiSigUser { signers_json, nonce } => {
                typed_hash::convert_to_multi_sig_user_struct_hash(chain_name, signers_json, *nonce)
            }
        }
    }

    /// Builds this action's `"action"` wire JSON object, embedding the
    /// chain-scoped fields every typed-data schema carries.
    fn to_json(&self, chain: Chain) -> String {
        let mut w = JsonWriter::new();
        w.object_start();
        w.key("type");
        w.str_value(self.type_tag());
        w.key("hyperliquidChain");
        w.str_value(chain.hyperliquid_chain_name());
        w.key("signatureChainId");
        w.str_value(chain.signature_chain_id());
        match self {
            TypedAction::UsdSend { destination, amount, time } => {
                w.key("destination");
                w.str_value(&address_hex(destination));
                w.key("amount");
                w.str_value(amount);
                w.key("time");
                w.u64_value(*time);
            }
            TypedAction::SpotSend { destination, token, amount, time } => {
                w.key("destination");
                w.str_value(&address_hex(destination));
                w.key("token");
                w.str_value(token);
                w.key("amount");
                w.str_value(amount);
                w.key("time");
                w.u64_value(*time);
            }
            TypedAction::SendAsset {
                destination,
                source_dex,
                destination_dex,
                token,
                amount,
                from_sub_account,
                nonce,
            } => {
                w.key("destination");
                w.str_value(&address_hex(destination));
                w.key("sourceDex");
                w.str_value(source_dex);
                w.key("destinationDex");
                w.str_value(destination_dex);
                w.key("token");
                w.str_value(token);
                w.key("amount");
                w.str_value(amount);
                w.key("fromSubAccount");
                w.str_value(from_sub_account);
                w.key("nonce");
                w.u64_value(*nonce);
            }
            TypedAction::UsdClassTransfer { amount, to_perp, nonce } => {
                w.key("amount");
                w.str_value(amount);
                w.key("toPerp");
                w.bool_value(*to_perp);
                w.key("nonce");
                w.u64_value(*nonce);
            }
            TypedAction::ApproveAgent { agent_address, agent_name, nonce } => {
                w.key("agentAddress");
                w.str_value(&address_hex(agent_address));
                w.key("agentName");
                w.str_value(agent_name);
                w.key("nonce");
                w.u64_value(*nonce);
            }
            TypedAction::ApproveBuilderFee { max_fee_rate, builder, nonce } => {
                w.key("maxFeeRate");
                w.str_value(max_fee_rate);
                w.key("builder");
                w.str_value(&address_hex(builder));
                w.key("nonce");
                w.u64_value(*nonce);
            }
            TypedAction::Withdraw { destination, amount, time } => {
                w.key("destination");
                w.str_value(&address_hex(destination));
                w.key("amount");
                w.str_value(amount);
                w.key("time");
                w.u64_value(*time);
            }
            TypedAction::ConvertToMultiSigUser { signers_json, nonce } => {
                w.key("signers");
                w.str_value(signers_json);
                w.key("nonce");
                w.u64_value(*nonce);
            }
        }
        w.object_end();
        w.finish()
    }

    fn type_tag(&self) -> &'static str {
        match self {
            TypedAction::UsdSend { .. } => "usdSend",
            TypedAction::SpotSend { .. } => "spotSend",
            TypedAction::SendAsset { .. } => "sendAsset",
            TypedAction::UsdClassTransfer { .. } => "usdClassTransfer",
            TypedAction::ApproveAgent { .. } => "approveAgent",
            TypedAction::ApproveBuilderFee { .. } => "approveBuilderFee",
            TypedAction::Withdraw { .. } => "withdraw",
            TypedAction::ConvertToMultiSigUser { .. } => "convertToMultiSigUser",
        }
    }

    /// The `nonce`/`time` field this schema carries, re-used as the wire
    /// request's top-level `nonce`.
    fn nonce(&self) -> u64 {
        match self {
            TypedAction::UsdSend { time, .. }
            | TypedAction::SpotSend { time, .. }
            | TypedAction::Withdraw { time, .. } => *time,
            TypedAction::SendAsset { nonce, .. }
            | TypedAction::UsdClassTransfer { nonce, .. }
            | TypedAction::ApproveAgent { nonce, .. }
            | TypedAction::ApproveBuilderFee { nonce, .. }
            | TypedAction::ConvertToMultiSigUser { nonce, .. } => *nonce,
        }
    }
}

/// Signs a transfer/approval action via the typed-data path (§4.8):
/// struct-hash directly under the host-chain domain, skipping the binary
/// encode step entirely.
pub fn sign_typed(signer: &Signer, chain: Chain, action: &TypedAction<'_>) -> Result<SignedRequest, Error> {
    let struct_hash = action.struct_hash(chain);
    let domain_separator = Domain::host_chain(chain.chain_id()).separator();
    let signing_hash = typed_hash::signing_hash(&domain_separator, &struct_hash);

    let signature = signer.sign(&signing_hash)?;
    let nonce = action.nonce();
    let body = request_body_json(&action.to_json(chain), nonce, &signature, None, None);
    Ok(SignedRequest { signature, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ClientOrderId, OrderGrouping, OrderType, OrderRequest, TimeInForce, BatchOrder};
    use crate::decimal::Decimal;
    use core::str::FromStr;

    fn test_signer() -> Signer {
        let key = const_hex::decode_to_array(
            "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e",
        )
        .unwrap();
        Signer::from_private_key(&key).unwrap()
    }

    fn sample_order(asset: u32, price: &str, size: &str) -> OrderRequest {
        OrderRequest {
            asset,
            is_buy: true,
            limit_price: Decimal::from_str(price).unwrap(),
            size: Decimal::from_str(size).unwrap(),
            reduce_only: false,
            order_type: OrderType::Limit { tif: TimeInForce::Gtc },
            cloid: ClientOrderId::ZERO,
        }
    }

    #[test]
    fn sign_action_round_trips_through_recovery() {
        let signer = test_signer();
        let action = Action::Order(BatchOrder {
            orders: vec![sample_order(0, "50000", "0.1")],
            grouping: OrderGrouping::Na,
        });
        let signed = sign_action(&signer, Chain::Mainnet, &action, 1700000000123, None, None).unwrap();
        assert!(signed.body.contains("\"type\":\"order\""));
        assert!(signed.body.contains("\"vaultAddress\":null"));
        assert!(signed.body.contains("\"expiresAfter\":null"));
    }

    #[test]
    fn connection_hash_changes_with_vault_and_expiry() {
        let action = Action::Noop;
        let mut buf = [0u8; 1024];
        let base = connection_hash_into(&mut buf, &action, 1, None, None).unwrap();
        let with_vault = connection_hash_into(&mut buf, &action, 1, Some([0x42; 20]), None).unwrap();
        let with_expiry = connection_hash_into(&mut buf, &action, 1, None, Some(99)).unwrap();
        assert_ne!(base, with_vault);
        assert_ne!(base, with_expiry);
        assert_ne!(with_vault, with_expiry);
    }

    #[test]
    fn sign_typed_usd_send_produces_expected_wire_fields() {
        let signer = test_signer();
        let destination: [u8; 20] =
            const_hex::decode_to_array("0D1d9635D0640821d15e323ac8AdADfA9c111414").unwrap();
        let action = TypedAction::UsdSend { destination, amount: "1", time: 1690393044548 };
        let signed = sign_typed(&signer, Chain::Mainnet, &action).unwrap();
        assert!(signed.body.contains("\"hyperliquidChain\":\"Mainnet\""));
        assert!(signed.body.contains("\"signatureChainId\":\"0xa4b1\""));
        assert!(signed.body.contains("\"nonce\":1690393044548"));
        // The wire destination is always rendered lowercase, regardless of
        // the checksum casing a caller might decode the address from.
        assert!(signed.body.contains("\"destination\":\"0x0d1d9635d0640821d15e323ac8adadfa9c111414\""));
    }

    #[test]
    fn sign_action_is_deterministic() {
        let signer = test_signer();
        let action = Action::Noop;
        let first = sign_action(&signer, Chain::Testnet, &action, 1, None, None).unwrap();
        let second = sign_action(&signer, Chain::Testnet, &action, 1, None, None).unwrap();
        assert_eq!(first.signature, second.signature);
    }
}
