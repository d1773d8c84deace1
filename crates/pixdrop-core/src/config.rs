//! Configuration module
//!
//! This module provides the client configuration: where the backend lives,
//! whether the constrained deployment policy is active, and the upload
//! policy that is the single source of truth for every size limit.

use std::env;

use crate::constants::{ACCEPTED_MEDIA_TYPES, KIB, MIB};

// Common constants
const MAX_FILE_SIZE_MB: u64 = 200;
const LEGACY_MAX_FILE_SIZE_MB: u64 = 10;
const MAX_CONVERSION_SIZE_MB: u64 = 30;
/// Serverless body cap of the constrained deployment (4.5 MB).
const BACKEND_HARD_CAP_BYTES: u64 = 4_500_000;
/// Largest body we send to the backend under constrained deployment.
const BACKEND_LIMIT_KB: u64 = 4 * 1024;
const REQUEST_TIMEOUT_SECS: u64 = 600;
const CONVERT_QUALITY: u8 = 80;
const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Size and type limits applied to uploads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Ceiling for the accepting side.
    pub max_file_size_bytes: u64,
    /// Smaller ceiling used when `legacy_mode` is on.
    pub legacy_max_file_size_bytes: u64,
    pub legacy_mode: bool,
    /// Files above this size go direct to storage under constrained deployment.
    pub backend_limit_bytes: u64,
    /// Hard request-body cap of the constrained platform. Must exceed `backend_limit_bytes`.
    pub backend_hard_cap_bytes: u64,
    /// Files above this size are uploaded without client-side conversion.
    pub max_conversion_size_bytes: u64,
    /// Declared media types accepted by the validator (lowercase).
    pub accepted_media_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * MIB,
            legacy_max_file_size_bytes: LEGACY_MAX_FILE_SIZE_MB * MIB,
            legacy_mode: false,
            backend_limit_bytes: BACKEND_LIMIT_KB * KIB,
            backend_hard_cap_bytes: BACKEND_HARD_CAP_BYTES,
            max_conversion_size_bytes: MAX_CONVERSION_SIZE_MB * MIB,
            accepted_media_types: ACCEPTED_MEDIA_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UploadPolicy {
    /// The ceiling the validator enforces under the current mode.
    pub fn effective_max_file_size(&self) -> u64 {
        if self.legacy_mode {
            self.legacy_max_file_size_bytes
        } else {
            self.max_file_size_bytes
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Self::default();

        let max_file_size_bytes = env_scaled("MAX_FILE_SIZE_MB", MIB)?
            .unwrap_or(defaults.max_file_size_bytes);
        let legacy_max_file_size_bytes = env_scaled("LEGACY_MAX_FILE_SIZE_MB", MIB)?
            .unwrap_or(defaults.legacy_max_file_size_bytes);
        let backend_limit_bytes = env_scaled("BACKEND_LIMIT_KB", KIB)?
            .unwrap_or(defaults.backend_limit_bytes);
        let max_conversion_size_bytes = env_scaled("MAX_CONVERSION_SIZE_MB", MIB)?
            .unwrap_or(defaults.max_conversion_size_bytes);

        let accepted_media_types = match env::var("ACCEPTED_MEDIA_TYPES") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.accepted_media_types,
        };

        Ok(Self {
            max_file_size_bytes,
            legacy_max_file_size_bytes,
            legacy_mode: env_bool("LEGACY_UPLOAD_MODE").unwrap_or(false),
            backend_limit_bytes,
            backend_hard_cap_bytes: defaults.backend_hard_cap_bytes,
            max_conversion_size_bytes,
            accepted_media_types,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 || self.legacy_max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("File size ceilings must be greater than zero"));
        }

        if self.backend_limit_bytes == 0 {
            return Err(anyhow::anyhow!("BACKEND_LIMIT_KB must be greater than zero"));
        }

        if self.backend_limit_bytes >= self.backend_hard_cap_bytes {
            return Err(anyhow::anyhow!(
                "Backend limit ({} bytes) must be strictly below the platform cap ({} bytes)",
                self.backend_limit_bytes,
                self.backend_hard_cap_bytes
            ));
        }

        if self.accepted_media_types.is_empty() {
            return Err(anyhow::anyhow!("ACCEPTED_MEDIA_TYPES cannot be empty"));
        }

        Ok(())
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Constrained (small-body) deployment policy is active.
    pub constrained_deployment: bool,
    pub request_timeout_secs: u64,
    /// Default re-encode quality, 1..=100.
    pub convert_quality: u8,
    pub policy: UploadPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            constrained_deployment: false,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            convert_quality: CONVERT_QUALITY,
            policy: UploadPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load from the environment (and `.env` if present).
    ///
    /// `PIXDROP_CONSTRAINED_DEPLOYMENT` wins when set; otherwise the presence
    /// of `VERCEL` turns the constrained policy on.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("PIXDROP_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let constrained_deployment = env_bool("PIXDROP_CONSTRAINED_DEPLOYMENT")
            .unwrap_or_else(|| env::var("VERCEL").is_ok());

        let request_timeout_secs =
            env_u64("PIXDROP_REQUEST_TIMEOUT_SECS")?.unwrap_or(REQUEST_TIMEOUT_SECS);

        let convert_quality = match env::var("PIXDROP_CONVERT_QUALITY") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .map_err(|_| anyhow::anyhow!("PIXDROP_CONVERT_QUALITY must be a number between 1 and 100"))?,
            Err(_) => CONVERT_QUALITY,
        };

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            constrained_deployment,
            request_timeout_secs,
            convert_quality,
            policy: UploadPolicy::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "PIXDROP_API_URL must start with http:// or https://"
            ));
        }

        if !(1..=100).contains(&self.convert_quality) {
            return Err(anyhow::anyhow!(
                "PIXDROP_CONVERT_QUALITY must be between 1 and 100"
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PIXDROP_REQUEST_TIMEOUT_SECS must be greater than zero"
            ));
        }

        self.policy.validate()
    }
}

fn env_u64(key: &str) -> Result<Option<u64>, anyhow::Error> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        Err(_) => Ok(None),
    }
}

/// Read `key` as a count of `unit` bytes.
fn env_scaled(key: &str, unit: u64) -> Result<Option<u64>, anyhow::Error> {
    env_u64(key)?.map(|value| scale(key, value, unit)).transpose()
}

fn scale(key: &str, value: u64, unit: u64) -> Result<u64, anyhow::Error> {
    value
        .checked_mul(unit)
        .ok_or_else(|| anyhow::anyhow!("{} is too large ({})", key, value))
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
