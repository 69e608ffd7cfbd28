//! Document adapters - uploaded-file decoding.

mod decode;

pub use decode::{decode_upload, DecodedUpload};
