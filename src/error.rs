use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

pub type Result<T, E = AkismetError> = std::result::Result<T, E>;

#[derive(Debug, Error, Diagnostic)]
pub enum AkismetError {
    #[error("missing client configuration: {0}")]
    #[diagnostic(
        code(akismet::config),
        help("a blog URL, an API key and an HTTP client are all required")
    )]
    MissingConfig(&'static str),

    #[error("comment is missing required field `{0}`")]
    #[diagnostic(
        code(akismet::missing_field),
        help("every submission needs the submitter's IP address and user agent")
    )]
    MissingField(&'static str),

    #[error("invalid endpoint URL: {0}")]
    #[diagnostic(code(akismet::endpoint))]
    InvalidEndpoint(String),

    #[error(transparent)]
    #[diagnostic(code(akismet::transport))]
    Transport(#[from] reqwest::Error),

    #[error("{url} responded with {status}: {body}")]
    #[diagnostic(
        code(akismet::status),
        help("strict mode is enabled, so non-2xx responses are reported as errors")
    )]
    Status {
        url: Url,
        status: StatusCode,
        body: String,
    },
}
