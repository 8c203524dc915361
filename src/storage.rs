use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::config::CloudinaryConfig;

/// Image as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, body: Bytes, file_name: &str) -> anyhow::Result<UploadedImage>;
    async fn destroy(&self, public_id: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct Cloudinary {
    http: reqwest::Client,
    cfg: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct HostError {
    error: HostErrorDetail,
}

#[derive(Debug, Deserialize)]
struct HostErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Request signature: SHA-256 over the `&`-joined, key-sorted params followed
/// by the API secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl Cloudinary {
    pub fn new(cfg: CloudinaryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.cfg.api_base.trim_end_matches('/'),
            self.cfg.cloud_name,
            action
        )
    }

    async fn read_error(res: reqwest::Response) -> anyhow::Error {
        let status = res.status();
        match res.json::<HostError>().await {
            Ok(body) => anyhow::anyhow!("image host returned {}: {}", status, body.error.message),
            Err(_) => anyhow::anyhow!("image host returned {}", status),
        }
    }
}

#[async_trait]
impl ImageHost for Cloudinary {
    async fn upload(&self, body: Bytes, file_name: &str) -> anyhow::Result<UploadedImage> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let signature = sign(
            &[("folder", self.cfg.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.cfg.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(body.to_vec()).file_name(file_name.to_string()))
            .text("api_key", self.cfg.api_key.clone())
            .text("folder", self.cfg.folder.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let res = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .context("image host upload request")?;

        if !res.status().is_success() {
            return Err(Self::read_error(res).await);
        }

        let body: UploadResponse = res.json().await.context("image host upload response")?;
        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.cfg.api_secret,
        );

        let res = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("api_key", self.cfg.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature_algorithm", "sha256"),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("image host destroy {}", public_id))?;

        if !res.status().is_success() {
            return Err(Self::read_error(res).await);
        }

        let body: DestroyResponse = res.json().await.context("image host destroy response")?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => anyhow::bail!("image host destroy {}: {}", public_id, other),
        }
    }
}
