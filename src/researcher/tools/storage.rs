// SPDX-License-Identifier: MIT

//! Artifact publishing to Google Cloud Storage
//!
//! Objects are written and shared through V4 signed URLs authenticated with an
//! HMAC key, so no OAuth flow is needed.

use crate::adk::error::ResearcherError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;

const GCS_HOST: &str = "storage.googleapis.com";
const ALGORITHM: &str = "GOOG4-HMAC-SHA256";

/// Lifetime of shared links
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Where a generated artifact can be found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Published {
    /// Uploaded; readable through a time-limited link
    SignedUrl { url: String },
    /// Storage not configured; the content itself
    Inline { content: String },
    /// Storage not configured; written to local disk
    LocalFile { path: String },
}

impl Published {
    /// Short human-readable pointer (URL, path, or a note for inline content)
    pub fn location(&self) -> &str {
        match self {
            Published::SignedUrl { url } => url,
            Published::LocalFile { path } => path,
            Published::Inline { .. } => "included inline",
        }
    }
}

/// Object store that returns a readable link for each upload
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ResearcherError>;
}

/// Upload text when storage is configured, otherwise return it inline
pub async fn publish_text(
    store: Option<&dyn BlobStore>,
    object: &str,
    content: String,
    content_type: &str,
) -> Result<Published, ResearcherError> {
    match store {
        Some(store) => {
            let url = store
                .upload(object, content.into_bytes(), content_type)
                .await?;
            Ok(Published::SignedUrl { url })
        }
        None => {
            log::warn!(
                "Storage not configured; returning {} inline ({} bytes)",
                object,
                content.len()
            );
            Ok(Published::Inline { content })
        }
    }
}

/// V4 URL signer for an HMAC service-account key
#[derive(Clone)]
pub struct UrlSigner {
    access_id: String,
    secret: String,
}

impl UrlSigner {
    pub fn new(access_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            secret: secret.into(),
        }
    }

    /// Signed URL for `method` on `bucket/object`, valid for `expires_secs` from `now`
    pub fn sign(
        &self,
        method: &str,
        bucket: &str,
        object: &str,
        now: DateTime<Utc>,
        expires_secs: u64,
    ) -> Result<String, ResearcherError> {
        let datetime = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{}/auto/storage/goog4_request", date);
        let credential = format!("{}/{}", self.access_id, scope);

        let path = format!("/{}/{}", bucket, encode_object(object));

        // already sorted by name
        let query = [
            ("X-Goog-Algorithm", ALGORITHM.to_string()),
            ("X-Goog-Credential", credential),
            ("X-Goog-Date", datetime.clone()),
            ("X-Goog-Expires", expires_secs.to_string()),
            ("X-Goog-SignedHeaders", "host".to_string()),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            method, path, query, GCS_HOST
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            datetime,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = hmac_sha256(format!("GOOG4{}", self.secret).as_bytes(), date.as_bytes())?;
        let key = hmac_sha256(&key, b"auto")?;
        let key = hmac_sha256(&key, b"storage")?;
        let key = hmac_sha256(&key, b"goog4_request")?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(format!(
            "https://{}{}?{}&X-Goog-Signature={}",
            GCS_HOST, path, query, signature
        ))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ResearcherError> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .map_err(|e| ResearcherError::config(format!("Invalid HMAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn encode_object(object: &str) -> String {
    object
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Google Cloud Storage bucket accessed through signed URLs
pub struct GcsBlobStore {
    client: Client,
    bucket: String,
    signer: UrlSigner,
}

impl GcsBlobStore {
    pub fn new(bucket: impl Into<String>, signer: UrlSigner) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            signer,
        }
    }

    /// Reads `GCS_BUCKET_NAME`, `GCS_HMAC_ACCESS_ID` and `GCS_HMAC_SECRET`
    pub fn from_env() -> Result<Self, ResearcherError> {
        let bucket = env::var("GCS_BUCKET_NAME")
            .map_err(|_| ResearcherError::config("GCS_BUCKET_NAME must be set"))?;
        let access_id = env::var("GCS_HMAC_ACCESS_ID")
            .map_err(|_| ResearcherError::config("GCS_HMAC_ACCESS_ID must be set"))?;
        let secret = env::var("GCS_HMAC_SECRET")
            .map_err(|_| ResearcherError::config("GCS_HMAC_SECRET must be set"))?;
        Ok(Self::new(bucket, UrlSigner::new(access_id, secret)))
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn upload(
        &self,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ResearcherError> {
        let size = bytes.len();
        let put_url = self
            .signer
            .sign("PUT", &self.bucket, object, Utc::now(), 900)?;

        let resp = self
            .client
            .put(put_url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(ResearcherError::api("gcs", format!("{}: {}", status, text)));
        }
        log::info!(
            "Uploaded {} bytes to GCS object gs://{}/{}",
            size,
            self.bucket,
            object
        );

        self.signer.sign(
            "GET",
            &self.bucket,
            object,
            Utc::now(),
            SIGNED_URL_TTL_SECS,
        )
    }
}
