//! Local processing steps that run before any network activity: validating
//! a candidate file against the upload policy and re-encoding images to WebP.

pub mod validator;

#[cfg(feature = "image")]
pub mod compression;

pub use validator::{FileValidator, ValidationError};

#[cfg(feature = "image")]
pub use compression::{ImageReencoder, InvalidQuality, Quality, ReencodeError, ReencodedFile};
