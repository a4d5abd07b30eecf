//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, warn};

use crate::domain::{
    AccessToken, ApiVersion, FileStem, MediaId, MediaLink, OutboundMessage, OwnerId, RecordKind,
    SavedMedia, SendLocation, SendMedia, SendText, StatusRecord, ValidationError,
};
use crate::transport::MediaUpload;

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type BoxError = Box<dyn StdError + Send + Sync>;

/// Outcome of every JSON-returning operation: the response body as received.
pub type ApiResult<T = serde_json::Value> = Result<T, WhatsAppError>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug, Clone, Copy)]
struct Downloaded {
    status: u16,
    bytes: u64,
}

#[derive(Debug, thiserror::Error)]
enum TransportFailure {
    #[error("{0}")]
    Connect(#[source] BoxError),

    #[error("{0}")]
    Io(#[source] std::io::Error),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(value: reqwest::Error) -> Self {
        Self::Connect(Box::new(value))
    }
}

impl TransportFailure {
    /// Local write failures belong to `path`; everything else is a connect error.
    fn at_path(self, path: &Path) -> WhatsAppError {
        match self {
            Self::Connect(err) => WhatsAppError::Connect(err),
            Self::Io(source) => WhatsAppError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

impl From<TransportFailure> for WhatsAppError {
    fn from(value: TransportFailure) -> Self {
        match value {
            TransportFailure::Connect(err) => Self::Connect(err),
            TransportFailure::Io(err) => Self::Connect(Box::new(err)),
        }
    }
}

trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;

    fn post_multipart<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        upload: MediaUpload,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;

    fn get<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;

    /// Stream the body of a GET into `sink`, flushing it at the end.
    fn download<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        sink: &'a mut (dyn AsyncWrite + Unpin + Send),
    ) -> BoxFuture<'a, Result<Downloaded, TransportFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    async fn finish(request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportFailure> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let request = self
                .client
                .post(url)
                .bearer_auth(token)
                .timeout(self.timeout)
                .json(&body);
            Self::finish(request).await
        })
    }

    fn post_multipart<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        upload: MediaUpload,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let mut form = reqwest::multipart::Form::new();
            for (name, value) in upload.text_fields() {
                form = form.text(name, value);
            }
            let part = reqwest::multipart::Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(upload.mime_type)?;
            form = form.part("file", part);

            let request = self
                .client
                .post(url)
                .bearer_auth(token)
                .timeout(self.timeout)
                .multipart(form);
            Self::finish(request).await
        })
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let request = self
                .client
                .get(url)
                .bearer_auth(token)
                .timeout(self.timeout);
            Self::finish(request).await
        })
    }

    fn download<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        sink: &'a mut (dyn AsyncWrite + Unpin + Send),
    ) -> BoxFuture<'a, Result<Downloaded, TransportFailure>> {
        Box::pin(async move {
            let mut response = self
                .client
                .get(url)
                .bearer_auth(token)
                .timeout(self.timeout)
                .send()
                .await?;
            let status = response.status().as_u16();

            let mut bytes = 0u64;
            while let Some(chunk) = response.chunk().await? {
                sink.write_all(&chunk)
                    .await
                    .map_err(TransportFailure::Io)?;
                bytes += chunk.len() as u64;
            }
            sink.flush().await.map_err(TransportFailure::Io)?;

            Ok(Downloaded { status, bytes })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`WhatsAppClient`].
///
/// API-level failures are not errors here: a response that arrived and
/// parsed as JSON is returned as `Ok`, whatever its HTTP status. Look for an
/// `error` object in the body.
pub enum WhatsAppError {
    /// The request never completed (DNS, TLS, refused connection, timeout, cut-off body).
    #[error("connect error: {0}")]
    Connect(#[source] BoxError),

    /// Reading the upload source or writing the download target failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A response arrived but its body is not JSON.
    #[error("response body is not JSON (HTTP {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl WhatsAppError {
    /// Stable record kind, e.g. `"connect_error"`.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Connect(_) => RecordKind::ConnectError,
            Self::Io { .. } => RecordKind::IoError,
            Self::Parse { .. } => RecordKind::ParseError,
            Self::Validation(_) => RecordKind::ValidationError,
        }
    }

    /// Flatten into a `{kind, message}` record.
    pub fn record(&self) -> StatusRecord {
        let message = match self {
            Self::Connect(err) => describe(&**err),
            Self::Io { path, source } => format!("{}: {}", path.display(), describe(source)),
            Self::Parse { source, .. } => describe(source),
            Self::Validation(err) => err.to_string(),
        };
        StatusRecord {
            kind: self.kind(),
            message,
        }
    }
}

/// Join an error and its sources with `": "`.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[derive(Debug, Clone)]
/// Immutable client settings.
pub struct ClientConfig {
    token: AccessToken,
    owner_id: OwnerId,
    base_url: String,
    api_version: ApiVersion,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientConfig {
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// `{base}/{version}`, the root every endpoint hangs off.
    fn graph_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version.as_str()
        )
    }
}

#[derive(Debug, Clone)]
/// Builder for [`WhatsAppClient`].
///
/// Use this when you need to customize the base URL, API version, timeout,
/// user-agent or the tracing dispatcher the client logs to.
pub struct WhatsAppClientBuilder {
    config: ClientConfig,
    dispatch: Option<tracing::Dispatch>,
}

impl WhatsAppClientBuilder {
    /// Create a builder targeting `https://graph.facebook.com/v14.0` with a 10 second timeout.
    pub fn new(token: AccessToken, owner_id: OwnerId) -> Self {
        Self {
            config: ClientConfig {
                token,
                owner_id,
                base_url: DEFAULT_BASE_URL.to_owned(),
                api_version: ApiVersion::default(),
                timeout: DEFAULT_TIMEOUT,
                user_agent: None,
            },
            dispatch: None,
        }
    }

    /// Override the Graph API host, e.g. to point at a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_version(mut self, api_version: ApiVersion) -> Self {
        self.config.api_version = api_version;
        self
    }

    /// Timeout applied to each request, body included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Send the client's log events to `dispatch` instead of the global subscriber.
    pub fn dispatch(mut self, dispatch: tracing::Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Build a [`WhatsAppClient`].
    pub fn build(self) -> Result<WhatsAppClient, WhatsAppError> {
        let base_url = self.config.base_url.trim().to_owned();
        match url::Url::parse(&base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(ValidationError::InvalidUrl {
                    field: "base_url",
                    input: base_url,
                }
                .into());
            }
        }
        let config = ClientConfig {
            base_url,
            ..self.config
        };

        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| WhatsAppError::Connect(Box::new(err)))?;

        let http = Arc::new(ReqwestTransport {
            client,
            timeout: config.timeout,
        });
        Ok(WhatsAppClient::assemble(config, self.dispatch, http))
    }
}

#[derive(Clone)]
/// High-level WhatsApp Cloud API client.
///
/// Every method issues exactly one HTTP request and never retries. By default it uses:
/// - `https://graph.facebook.com/v14.0/{phone_number_id}/messages` for sends
/// - `https://graph.facebook.com/v14.0/{phone_number_id}/media` for uploads
/// - `https://graph.facebook.com/v14.0/{media_id}` for media metadata
pub struct WhatsAppClient {
    config: ClientConfig,
    graph_root: String,
    messages_endpoint: String,
    media_endpoint: String,
    dispatch: Option<tracing::Dispatch>,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for WhatsAppClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppClient")
            .field("config", &self.config)
            .field("messages_endpoint", &self.messages_endpoint)
            .field("media_endpoint", &self.media_endpoint)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WhatsAppClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WhatsApp-{}", self.config.owner_id)
    }
}

impl WhatsAppClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`WhatsAppClient::builder`].
    pub fn new(token: AccessToken, owner_id: OwnerId) -> Self {
        let builder = WhatsAppClientBuilder::new(token, owner_id);
        let http = Arc::new(ReqwestTransport {
            client: reqwest::Client::new(),
            timeout: builder.config.timeout,
        });
        Self::assemble(builder.config, None, http)
    }

    /// Start building a client with custom settings.
    pub fn builder(token: AccessToken, owner_id: OwnerId) -> WhatsAppClientBuilder {
        WhatsAppClientBuilder::new(token, owner_id)
    }

    fn assemble(
        config: ClientConfig,
        dispatch: Option<tracing::Dispatch>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        let graph_root = config.graph_root();
        let messages_endpoint = format!("{graph_root}/{}/messages", config.owner_id);
        let media_endpoint = format!("{graph_root}/{}/media", config.owner_id);
        Self {
            config,
            graph_root,
            messages_endpoint,
            media_endpoint,
            dispatch,
            http,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn messages_endpoint(&self) -> &str {
        &self.messages_endpoint
    }

    pub fn media_endpoint(&self) -> &str {
        &self.media_endpoint
    }

    /// URL addressing a single uploaded media item.
    pub fn media_item_url(&self, media_id: &MediaId) -> String {
        format!("{}/{}", self.graph_root, media_id.as_str())
    }

    /// Send a text message.
    ///
    /// The body is returned as received; an HTTP 4xx/5xx with a JSON error
    /// object is still `Ok`.
    pub async fn send_text(&self, request: SendText) -> ApiResult {
        let payload = crate::transport::encode_text_payload(&request);
        self.observed(self.post_message("send_text", payload)).await
    }

    /// Send an audio, document, image or video message by link or by uploaded media id.
    ///
    /// Captions are dropped for audio.
    pub async fn send_media(&self, request: SendMedia) -> ApiResult {
        let payload = crate::transport::encode_media_payload(&request);
        self.observed(self.post_message("send_media", payload)).await
    }

    /// Send a location pin.
    pub async fn send_location(&self, request: SendLocation) -> ApiResult {
        let payload = crate::transport::encode_location_payload(&request);
        self.observed(self.post_message("send_location", payload))
            .await
    }

    /// Send any [`OutboundMessage`].
    pub async fn send(&self, message: OutboundMessage) -> ApiResult {
        let payload = crate::transport::encode_outbound_payload(&message);
        self.observed(self.post_message("send", payload)).await
    }

    /// Upload a local file to the media endpoint.
    ///
    /// The MIME type is guessed from the extension. On success the body holds
    /// the new media `id` to use with [`crate::MediaSource::Id`].
    pub async fn upload_media(&self, path: impl AsRef<Path>) -> ApiResult {
        self.observed(self.upload_file(path.as_ref())).await
    }

    /// Fetch metadata (`url`, `mime_type`, `sha256`, `file_size`) of an uploaded media item.
    pub async fn retrieve_media_url(&self, media_id: &MediaId) -> ApiResult {
        self.observed(self.fetch_media_metadata(media_id)).await
    }

    /// Stream `media_link` into `dest_dir/<file_name>.<ext>`, the extension
    /// following `mime_type`.
    ///
    /// The status code is not checked: whatever body the server sends is saved.
    /// The body is written to a hidden `.part` file first and renamed into place
    /// once complete, so a failed transfer leaves an existing file untouched.
    pub async fn download_media(
        &self,
        file_name: &FileStem,
        dest_dir: impl AsRef<Path>,
        media_link: &MediaLink,
        mime_type: &str,
    ) -> ApiResult<SavedMedia> {
        self.observed(self.save_media(file_name, dest_dir.as_ref(), media_link, mime_type))
            .await
    }

    async fn upload_file(&self, path: &Path) -> ApiResult {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| WhatsAppError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let upload = MediaUpload::from_file(path, bytes);
        debug!(
            operation = "upload_media",
            url = %self.media_endpoint,
            file = %path.display(),
            mime_type = upload.mime_type,
            size = upload.bytes.len(),
            "uploading media"
        );

        let response = self
            .http
            .post_multipart(&self.media_endpoint, self.config.token.as_str(), upload)
            .await
            .map_err(|err| connect_failure("upload_media", err))?;
        decode_response("upload_media", response)
    }

    async fn fetch_media_metadata(&self, media_id: &MediaId) -> ApiResult {
        let url = self.media_item_url(media_id);
        debug!(operation = "retrieve_media_url", url = %url, "fetching media metadata");

        let response = self
            .http
            .get(&url, self.config.token.as_str())
            .await
            .map_err(|err| connect_failure("retrieve_media_url", err))?;
        decode_response("retrieve_media_url", response)
    }

    async fn save_media(
        &self,
        file_name: &FileStem,
        dest_dir: &Path,
        media_link: &MediaLink,
        mime_type: &str,
    ) -> ApiResult<SavedMedia> {
        let target = crate::transport::download_file_name(file_name, mime_type)?;
        let path = dest_dir.join(&target);
        let partial = dest_dir.join(format!(".{target}.part"));
        debug!(
            operation = "download_media",
            url = %media_link.as_str(),
            path = %path.display(),
            "downloading media"
        );

        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|source| WhatsAppError::Io {
                path: partial.clone(),
                source,
            })?;
        let result = self
            .http
            .download(media_link.as_str(), self.config.token.as_str(), &mut file)
            .await;
        drop(file);

        let downloaded = match result {
            Ok(downloaded) => downloaded,
            Err(failure) => {
                warn!(operation = "download_media", error = %failure, "download failed");
                discard_partial(&partial).await;
                return Err(failure.at_path(&partial));
            }
        };
        if !is_success(downloaded.status) {
            warn!(
                operation = "download_media",
                status = downloaded.status,
                "media host returned a non-success status; body saved as-is"
            );
        }
        if let Err(source) = tokio::fs::rename(&partial, &path).await {
            discard_partial(&partial).await;
            return Err(WhatsAppError::Io { path, source });
        }

        info!(path = %path.display(), bytes = downloaded.bytes, "media saved");
        Ok(SavedMedia {
            path,
            bytes: downloaded.bytes,
        })
    }

    async fn post_message(&self, operation: &'static str, payload: serde_json::Value) -> ApiResult {
        debug!(operation, url = %self.messages_endpoint, "posting message");
        let response = self
            .http
            .post_json(&self.messages_endpoint, self.config.token.as_str(), payload)
            .await
            .map_err(|err| connect_failure(operation, err))?;
        decode_response(operation, response)
    }

    /// Run `fut` with the injected dispatcher, if any.
    async fn observed<F: Future>(&self, fut: F) -> F::Output {
        match &self.dispatch {
            Some(dispatch) => fut.with_subscriber(dispatch.clone()).await,
            None => fut.await,
        }
    }
}

async fn discard_partial(partial: &Path) {
    if let Err(err) = tokio::fs::remove_file(partial).await {
        debug!(path = %partial.display(), error = %err, "could not remove partial file");
    }
}

fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

fn connect_failure(operation: &'static str, failure: TransportFailure) -> WhatsAppError {
    warn!(operation, error = %failure, "request failed before a response arrived");
    failure.into()
}

fn decode_response(operation: &'static str, response: HttpResponse) -> ApiResult {
    if is_success(response.status) {
        debug!(operation, status = response.status, "response received");
    } else {
        warn!(
            operation,
            status = response.status,
            "API returned a non-success status"
        );
    }
    crate::transport::decode_json_body(&response.body).map_err(|source| WhatsAppError::Parse {
        status: response.status,
        source,
    })
}
