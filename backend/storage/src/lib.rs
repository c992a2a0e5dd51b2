//! Object-storage access without an SDK: a request signer for the
//! S3-compatible `AWS4-HMAC-SHA256` scheme and the instruction fetcher built
//! on it.

pub mod instruction;
pub mod signer;

pub use instruction::StorageInstructionSource;
pub use signer::{
    derive_signing_key, extract_bucket_and_key, sign_get, SignedHeaders, SigningContext,
    SigningTime,
};
