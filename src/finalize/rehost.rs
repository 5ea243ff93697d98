use std::time::Duration;

use log::info;

use super::{keep_or_log, FinalImages, Finalizer, IdentifierContext};
use crate::{FinalizeError, ImageDecision};

/// A third-party file host.
pub trait HostingBackend: Send + Sync {
    /// Stores `bytes` under `file_name` and returns the public URL.
    fn upload(&self, bytes: &[u8], file_name: &str) -> Result<String, FinalizeError>;
}

/// Uploads with `PUT {endpoint}/{file_name}`. The hosted URL is the response body, or
/// the `Location` header when the body is empty.
pub struct HttpHostingBackend {
    agent: ureq::Agent,
    endpoint: String,
    token: Option<String>,
}

impl HttpHostingBackend {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();

        Self {
            agent,
            endpoint: endpoint.into(),
            token,
        }
    }
}

impl HostingBackend for HttpHostingBackend {
    fn upload(&self, bytes: &[u8], file_name: &str) -> Result<String, FinalizeError> {
        let upload_err = |reason: String| FinalizeError::Upload {
            file_name: file_name.to_string(),
            reason,
        };

        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), file_name);
        let mut request = self.agent.put(&url).set("Content-Type", "image/jpeg");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let response = request
            .send_bytes(bytes)
            .map_err(|e| upload_err(e.to_string()))?;
        let location = response.header("Location").map(str::to_owned);
        let body = response
            .into_string()
            .map_err(|e| upload_err(e.to_string()))?;

        let body = body.trim();
        if !body.is_empty() {
            Ok(body.to_string())
        } else {
            location.ok_or_else(|| upload_err("host returned no URL".to_string()))
        }
    }
}

pub(super) fn deliver(
    finalizer: &Finalizer,
    backend: &dyn HostingBackend,
    decision: &ImageDecision,
    ctx: &IdentifierContext,
) -> FinalImages {
    let id = ctx.id();
    let upload = |bytes: Vec<u8>, file_name: String| -> Result<String, FinalizeError> {
        let hosted = backend.upload(&bytes, &file_name)?;
        info!("{id}: uploaded {file_name} to {hosted}");
        Ok(hosted)
    };

    let poster = decision.poster.as_ref().and_then(|poster| {
        let hosted = finalizer
            .poster_bytes(poster)
            .and_then(|bytes| upload(bytes, format!("{id}-poster.jpg")));
        keep_or_log("poster", ctx, hosted)
    });

    let landscape = decision.landscape.as_ref().and_then(|source| {
        let hosted = finalizer
            .jpeg_bytes(source)
            .and_then(|bytes| upload(bytes, format!("{id}-landscape.jpg")));
        keep_or_log("landscape", ctx, hosted)
    });

    let fanart = decision
        .fanart
        .iter()
        .zip(1..)
        .filter_map(|(source, n)| {
            let hosted = finalizer
                .jpeg_bytes(source)
                .and_then(|bytes| upload(bytes, format!("{id}-fanart-{n}.jpg")));
            keep_or_log("fanart", ctx, hosted)
        })
        .collect();

    FinalImages {
        poster,
        landscape,
        fanart,
    }
}
