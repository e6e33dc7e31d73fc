use crate::game::installer::types::Severity;
use crate::game::modpack::types::FileReference;
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Download endpoint for one mod file. Pure in `(project_id, file_id)`.
pub fn mod_download_url(api_base: &str, file: &FileReference) -> String {
    format!(
        "{}/api/v1/mods/{}/files/{}/download",
        api_base.trim_end_matches('/'),
        file.project_id,
        file.file_id
    )
}

/// Severity used when logging a response with this status.
/// Purely advisory: it does not decide whether the body is kept.
pub fn status_severity(status: StatusCode) -> Severity {
    match status {
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => Severity::Error,
        StatusCode::FORBIDDEN => Severity::Fatal,
        _ => Severity::Info,
    }
}

/// Whether the body of a response with this status is written out as the
/// mod jar. A 403 from CurseForge is a bot-protection page, never a jar.
pub fn status_carries_artifact(status: StatusCode) -> bool {
    status != StatusCode::FORBIDDEN
}

/// Result of fetching one [`FileReference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Written {
        path: PathBuf,
        file_name: String,
        status: u16,
        severity: Severity,
    },
    Missing {
        file_name: String,
        status: Option<u16>,
        severity: Severity,
        reason: String,
    },
}

impl FetchOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FetchOutcome::Written { file_name, .. } | FetchOutcome::Missing { file_name, .. } => file_name,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FetchOutcome::Written { severity, .. } | FetchOutcome::Missing { severity, .. } => *severity,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, FetchOutcome::Written { .. })
    }
}

/// Downloads one mod into `target_dir`.
///
/// Never fails: transport errors, refused responses and local write errors
/// all come back as [`FetchOutcome::Missing`]. `position`/`total` only feed
/// the progress line.
pub async fn fetch_mod(
    client: &Client,
    api_base: &str,
    file: &FileReference,
    target_dir: &Path,
    position: usize,
    total: usize,
) -> FetchOutcome {
    let url = mod_download_url(api_base, file);
    let mut file_name = file.default_file_name();
    log::debug!("Requesting {} -> {}", file, url);

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            let reason = describe_transport_error(&e);
            log::error!("Failed to download {}: {}", file_name, reason);
            return FetchOutcome::Missing {
                file_name,
                status: None,
                severity: Severity::Error,
                reason,
            };
        }
    };

    let status = response.status();
    let severity = status_severity(status);

    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    if let Some(disposition) = &disposition {
        Severity::Warn.log(&format!("Content disposition: {}", disposition));
    }
    if let Some(name) = disposition
        .as_deref()
        .and_then(content_disposition_file_name)
        .or_else(|| redirected_file_name(&url, response.url()))
    {
        file_name = name;
    }

    severity.log(&format!(
        "[Status {}] -> {} -- [{}/{}] Downloading {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("No reason"),
        position,
        total,
        file_name
    ));

    if !status_carries_artifact(status) {
        let reason = format!("HTTP {}", status);
        log::error!("Failed to download {}: {}", file_name, reason);
        return FetchOutcome::Missing {
            file_name,
            status: Some(status.as_u16()),
            severity,
            reason,
        };
    }

    let path = target_dir.join(&file_name);
    match write_body(response, &path).await {
        Ok(bytes) => {
            log::debug!("Wrote {} bytes to {:?}", bytes, path);
            FetchOutcome::Written {
                path,
                file_name,
                status: status.as_u16(),
                severity,
            }
        }
        Err(e) => {
            log::error!("Failed to download {}: {:#}", file_name, e);
            FetchOutcome::Missing {
                file_name,
                status: Some(status.as_u16()),
                severity: Severity::Error,
                reason: format!("{:#}", e),
            }
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out ({})", e)
    } else {
        e.to_string()
    }
}

/// Streams the body into `<path>.part` and renames it into place, so a
/// failed transfer never leaves a truncated jar behind.
async fn write_body(response: Response, path: &Path) -> Result<u64> {
    let tmp_name = format!(
        "{}.part",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
    );
    let tmp_path = path.with_file_name(tmp_name);
    let mut file = File::create(&tmp_path)
        .await
        .with_context(|| format!("Failed to create {:?}", tmp_path))?;

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    let copied = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read response body")?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;
    drop(file);

    if let Err(e) = copied {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move download into {:?}", path))?;
    Ok(written)
}

/// File name from a `Content-Disposition` header. `filename*` (RFC 5987)
/// takes precedence over a plain `filename`.
pub fn content_disposition_file_name(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let raw = raw.trim().trim_matches('"');

        if key == "filename*" {
            // charset'language'percent-encoded-name
            let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(raw);
            if let Some(name) = urlencoding::decode(encoded)
                .ok()
                .and_then(|decoded| sanitize_file_name(&decoded))
            {
                return Some(name);
            }
        } else if key == "filename" {
            plain = sanitize_file_name(raw);
        }
    }
    plain
}

/// Last path segment of `final_url`, URL-decoded, when redirects moved the
/// request away from `requested`.
pub fn redirected_file_name(requested: &str, final_url: &Url) -> Option<String> {
    if Url::parse(requested).ok().as_ref() == Some(final_url) {
        return None;
    }
    let segment = final_url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).ok()?;
    sanitize_file_name(&decoded)
}

/// Keeps only the final path component so a server-supplied name cannot
/// escape the mods directory.
fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(|c| c == '/' || c == '\\').next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}
