// Async HTTP client for the scan-management backend.
//
// Base path: /v1/
// Auth: Authorization: Bearer <token> (from the Session)

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::types;
use crate::{Error, Session, TransportConfig};

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the backend REST surface.
///
/// One method per backend capability. Nothing is retried: every failure
/// is returned to the caller as soon as it happens.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url`, authenticating with `session`.
    ///
    /// The bearer token is installed as a default header, so every
    /// request carries it.
    pub fn new(
        base_url: &str,
        session: &Session,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(session.headers()?)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Ensure the base URL ends with `/` so relative joins keep its path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        req.send()
            .await
            .map_err(|e| Error::from_send(e, self.timeout))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        self.handle_response(resp).await
    }

    /// POST a mutation whose 2xx reply may or may not carry the entity.
    async fn post_created<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.handle_created(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.handle_empty(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.send(self.http.delete(url)).await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Decode {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Any 2xx is success. Some backend builds confirm a mutation with a
    /// plain-text sentence instead of the created entity.
    async fn handle_created<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }
        let body = resp.text().await?;
        match serde_json::from_str(&body) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => {
                let preview: String = body.trim().chars().take(80).collect();
                debug!(%status, "no entity in reply ({e}): {preview:?}");
                Ok(None)
            }
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    status.to_string()
                } else {
                    trimmed.to_owned()
                }
            });

        Error::Server {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Domains ──────────────────────────────────────────────────────

    pub async fn list_domains(&self) -> Result<Vec<types::DomainResponse>, Error> {
        self.get("v1/domains").await
    }

    /// Returns the created domain when the backend echoes it back.
    pub async fn create_domain(
        &self,
        domain: &str,
    ) -> Result<Option<types::DomainResponse>, Error> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(Error::InvalidRequest("domain name is empty".into()));
        }
        self.post_created(
            "v1/domains",
            &types::CreateDomainRequest {
                domain: domain.to_owned(),
            },
        )
        .await
    }

    pub async fn delete_domain(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("v1/domains/{}", segment(id)?)).await
    }

    /// Upload a newline-delimited list of domain names.
    ///
    /// The backend treats the whole file as one operation; partial
    /// acceptance is not reported back.
    pub async fn bulk_upload_domains(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<(), Error> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::InvalidRequest("domain file is empty".into()));
        }

        let url = self.url("v1/domains/upload-txt")?;
        debug!("POST {url} (multipart, {} bytes)", content.len());

        let part = Part::bytes(content)
            .file_name(file_name.to_owned())
            .mime_str("text/plain")?;
        let form = Form::new().part("file", part);

        let resp = self.send(self.http.post(url).multipart(form)).await?;
        self.handle_empty(resp).await
    }

    // ── Templates ────────────────────────────────────────────────────

    pub async fn list_templates(&self) -> Result<Vec<types::TemplateResponse>, Error> {
        self.get("v1/templates").await
    }

    // ── Scans ────────────────────────────────────────────────────────

    pub async fn list_scans(&self) -> Result<Vec<types::ScanResponse>, Error> {
        self.get("v1/scans").await
    }

    pub async fn list_multi_scans(&self) -> Result<Vec<types::MultiScanResponse>, Error> {
        self.get("v1/scans/multi").await
    }

    pub async fn get_scan(&self, id: &str) -> Result<types::ScanResponse, Error> {
        self.get(&format!("v1/scans/{}", segment(id)?)).await
    }

    /// Start scans for explicit domains.
    ///
    /// With `scan_all_templates` set, `template_ids` must be empty: the
    /// backend expands the flag itself.
    pub async fn scan_domains(
        &self,
        domain_ids: &[String],
        template_ids: &[String],
        scan_all_templates: bool,
    ) -> Result<(), Error> {
        if domain_ids.is_empty() {
            return Err(Error::InvalidRequest("no domains selected".into()));
        }
        if !scan_all_templates && template_ids.is_empty() {
            return Err(Error::InvalidRequest("no templates selected".into()));
        }
        let body = types::ScanRequest {
            domain_ids: domain_ids.to_vec(),
            template_ids: if scan_all_templates {
                Vec::new()
            } else {
                template_ids.to_vec()
            },
            scan_all_nuclei: scan_all_templates,
        };
        self.post_no_response("v1/scans", &body).await
    }

    /// Start a scan across every named domain.
    pub async fn scan_all_domains(&self, domains: &[String]) -> Result<(), Error> {
        self.post_no_response(
            "v1/scans/all",
            &types::ScanAllRequest {
                domains: domains.to_vec(),
            },
        )
        .await
    }

    // ── Scheduled scans ──────────────────────────────────────────────

    pub async fn list_scheduled_scans(&self) -> Result<Vec<types::ScheduledScanResponse>, Error> {
        self.get("v1/scans/schedule").await
    }

    pub async fn schedule_scan(
        &self,
        request: &types::ScheduleScanRequest,
    ) -> Result<Option<types::ScheduledScanResponse>, Error> {
        self.post_created("v1/scans/schedule", request).await
    }

    pub async fn delete_scheduled_scan(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("v1/scans/schedule/{}", segment(id)?))
            .await
    }
}

/// Reject ids that would change the request path, including the dot
/// segments `Url::join` resolves.
fn segment(id: &str) -> Result<&str, Error> {
    let id = id.trim();
    if matches!(id, "" | "." | "..") || id.contains(['/', '\\', '?', '#', '%']) {
        return Err(Error::InvalidRequest(format!("invalid id: {id:?}")));
    }
    Ok(id)
}
