use std::fmt;

use log::{debug, warn};
use reqwest::Client;
use url::Url;

use crate::{
    comment::Comment,
    error::{AkismetError, Result},
};

const VERIFY_KEY_URL: &str = "https://rest.akismet.com/1.1/verify-key";
const API_VERSION: &str = "1.1";
const DEBUG_HELP_HEADER: &str = "x-akismet-debug-help";

/// The four addresses the client talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub verify_key: Url,
    pub comment_check: Url,
    pub submit_spam: Url,
    pub submit_ham: Url,
}

impl Endpoints {
    /// Production endpoints; the API key is used as a subdomain for
    /// everything except key verification.
    ///
    /// The key may only contain ASCII letters, digits and `-`. Hosts are
    /// lowercased, so `K3y` yields `https://k3y.rest.akismet.com/...`.
    pub fn for_key(api_key: &str) -> Result<Self> {
        if api_key.is_empty()
            || !api_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(AkismetError::InvalidEndpoint(format!(
                "API key is not a valid subdomain ({} characters)",
                api_key.len()
            )));
        }

        let keyed =
            |method: &str| parse(&format!("https://{api_key}.rest.akismet.com/{API_VERSION}/{method}"));

        Ok(Self {
            verify_key: parse(VERIFY_KEY_URL)?,
            comment_check: keyed("comment-check")?,
            submit_spam: keyed("submit-spam")?,
            submit_ham: keyed("submit-ham")?,
        })
    }

    /// All four endpoints under a single base, e.g. a proxy or a mock server.
    pub fn with_base(base: &Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(AkismetError::InvalidEndpoint(base.to_string()));
        }

        let under = |method: &str| -> Result<Url> {
            let mut url = base.clone();
            url.path_segments_mut()
                .map_err(|_| AkismetError::InvalidEndpoint(base.to_string()))?
                .pop_if_empty()
                .extend(&[API_VERSION, method]);
            Ok(url)
        };

        Ok(Self {
            verify_key: under("verify-key")?,
            comment_check: under("comment-check")?,
            submit_spam: under("submit-spam")?,
            submit_ham: under("submit-ham")?,
        })
    }
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| AkismetError::InvalidEndpoint(format!("{url}: {e}")))
}

#[derive(Default)]
pub struct ClientBuilder {
    blog: Option<String>,
    api_key: Option<String>,
    http: Option<Client>,
    endpoints: Option<Endpoints>,
    strict: bool,
}

impl ClientBuilder {
    pub fn blog(mut self, blog: impl Into<String>) -> Self {
        self.blog = Some(blog.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The transport is shared, so pass a clone of a long-lived client.
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Report non-2xx responses as [`AkismetError::Status`] instead of
    /// reading the body anyway.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn build(self) -> Result<AkismetClient> {
        let blog = self
            .blog
            .filter(|blog| !blog.trim().is_empty())
            .ok_or(AkismetError::MissingConfig("blog URL"))?;
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(AkismetError::MissingConfig("API key"))?;
        let http = self
            .http
            .ok_or(AkismetError::MissingConfig("HTTP client"))?;

        let endpoints = match self.endpoints {
            Some(endpoints) => endpoints,
            None => Endpoints::for_key(&api_key)?,
        };

        Ok(AkismetClient {
            blog,
            api_key,
            http,
            endpoints,
            strict: self.strict,
        })
    }
}

/// Client for the Akismet anti-spam API.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct AkismetClient {
    blog: String,
    api_key: String,
    http: Client,
    endpoints: Endpoints,
    strict: bool,
}

struct Reply {
    body: String,
    debug_help: Option<String>,
}

impl AkismetClient {
    pub fn new(blog: impl Into<String>, api_key: impl Into<String>, http: Client) -> Result<Self> {
        Self::builder()
            .blog(blog)
            .api_key(api_key)
            .http_client(http)
            .build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn blog(&self) -> &str {
        &self.blog
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns `true` only if the service answers exactly `valid`.
    pub async fn verify_key(&self) -> Result<bool> {
        let form = [("key", self.api_key.clone()), ("blog", self.blog.clone())];
        let reply = self.post(&self.endpoints.verify_key, &form).await?;

        if reply.body != "valid" {
            debug!(
                "key verification failed: {:?} ({})",
                reply.body,
                reply.debug_help.as_deref().unwrap_or("no debug help")
            );
        }

        Ok(reply.body == "valid")
    }

    /// Returns `true` if the service classifies the comment as spam.
    pub async fn check_spam(&self, comment: &Comment) -> Result<bool> {
        let reply = self.submit(comment, &self.endpoints.comment_check).await?;

        match reply.body.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => {
                warn!(
                    "unexpected comment-check response {:?}: {}",
                    other,
                    reply.debug_help.as_deref().unwrap_or("no debug help")
                );
                Ok(false)
            }
        }
    }

    /// Reports a missed spam comment. Returns the service's acknowledgement.
    pub async fn submit_spam(&self, comment: &Comment) -> Result<String> {
        Ok(self.submit(comment, &self.endpoints.submit_spam).await?.body)
    }

    /// Reports a false positive. Returns the service's acknowledgement.
    pub async fn submit_ham(&self, comment: &Comment) -> Result<String> {
        Ok(self.submit(comment, &self.endpoints.submit_ham).await?.body)
    }

    async fn submit(&self, comment: &Comment, url: &Url) -> Result<Reply> {
        let form = comment.form_fields(&self.blog)?;
        self.post(url, &form).await
    }

    async fn post(&self, url: &Url, form: &[(&str, String)]) -> Result<Reply> {
        // The host carries the API key, only log the path.
        debug!("POST {} ({} fields)", url.path(), form.len());

        let response = self.http.post(url.clone()).form(form).send().await?;
        let status = response.status();
        debug!("{} answered {}", url.path(), status);

        if self.strict && !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AkismetError::Status {
                url: url.clone(),
                status,
                body,
            });
        }

        let debug_help = response
            .headers()
            .get(DEBUG_HELP_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(Reply {
            body: response.text().await?,
            debug_help,
        })
    }
}

impl fmt::Debug for AkismetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AkismetClient")
            .field("blog", &self.blog)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
