//! # exchange-signing-core
//!
//! A zero-allocation signing core for a Hyperliquid-style exchange API:
//! encodes trading actions into the exchange's binary and JSON wire forms,
//! hashes and signs them with deterministic (RFC 6979) secp256k1 ECDSA, and
//! decodes the exchange's responses.
//!
//! The hot path — field/scalar/curve arithmetic, binary encoding, hashing,
//! and signing — never allocates: callers supply the buffers. Orchestration
//! above it (`actions`, `signing`) produces owned `String`/`Vec` request
//! bodies, since those leave the process as HTTP payloads and have no
//! hot-path budget to honor.
//!
//! ## Two signing paths
//!
//! Most actions go over the **RMP path**: binary-encode the action, fold it
//! into a connection hash together with the nonce and vault/expiry
//! preamble, wrap that in an `Agent` EIP-712 struct scoped to a fixed
//! signing-chain domain, and sign. A handful of transfer-like actions use
//! the **typed-data path** instead: hash the action's own EIP-712 struct
//! directly under a host-chain domain, with no binary-encode or connection-
//! hash step. See [`signing::sign_action`] and [`signing::sign_typed`].
//!
//! ## Modules
//!
//! - [`error`]: the crate's error taxonomy
//! - [`decimal`]: fixed-point decimal parsing, formatting, and tick rounding
//! - [`field`], [`scalar`], [`curve`]: secp256k1 arithmetic
//! - [`signer`]: RFC 6979 ECDSA signing, address derivation, recovery
//! - [`typed_hash`]: EIP-712 struct-hash primitives and domains
//! - [`encoder`], [`json`]: hand-rolled binary and JSON wire writers
//! - [`chain`]: mainnet/testnet chain parameters
//! - [`nonce`]: monotonic nonce generation
//! - [`tick`]: price tick sizing and side-aware rounding
//! - [`actions`]: the action data model and its binary/JSON encoding
//! - [`signing`]: connection hashing and the two signing pipelines
//! - [`responses`]: exchange response decoding

pub mod actions;
pub mod chain;
pub mod curve;
pub mod decimal;
pub mod encoder;
pub mod error;
pub mod field;
pub mod json;
pub mod nonce;
pub mod responses;
pub mod scalar;
pub mod signer;
pub mod signing;
pub mod tick;
pub mod typed_hash;

pub use actions::Action;
pub use chain::Chain;
pub use decimal::Decimal;
pub use error::{Error, Result};
pub use nonce::NonceGenerator;
pub use responses::ExchangeResponse;
pub use signer::{Signature, Signer};
pub use signing::{sign_action, sign_typed, SignedRequest, TypedAction};
