//! Endpoint paths, media types and header names used on the wire.

/// Backend transport: multipart POST, sole field is [`UPLOAD_FORM_FIELD`].
pub const UPLOAD_PATH: &str = "/upload";
/// Gallery listing.
pub const UPLOADS_PATH: &str = "/uploads";
/// Direct-storage step 1: short-lived upload credentials.
pub const DIRECT_AUTH_PATH: &str = "/api/upload/auth";
/// Direct-storage step 3: server-side registration of the stored object.
pub const DIRECT_COMPLETE_PATH: &str = "/api/upload/complete";

pub const UPLOAD_FORM_FIELD: &str = "file";

/// Header carrying the provider-assigned object name on the direct upload
/// (`X-Bz-File-Name`, lowercase as header names are compared case-insensitively).
pub const OBJECT_NAME_HEADER: &str = "x-bz-file-name";

/// Target of the client-side re-encode.
pub const COMPACT_MEDIA_TYPE: &str = "image/webp";
pub const COMPACT_EXTENSION: &str = "webp";

pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = ["image/webp", "image/jpeg", "image/png", "image/gif"];

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
