//! Client for the [Akismet](https://akismet.com/developers/) anti-spam API.
//!
//! ```no_run
//! # async fn run() -> akismet::Result<()> {
//! use akismet::{AkismetClient, Comment};
//!
//! let client = AkismetClient::new("https://blog.example.com", "my-api-key", reqwest::Client::new())?;
//! let comment = Comment::new("203.0.113.7", "Mozilla/5.0").with_content("Nice post!");
//!
//! if client.check_spam(&comment).await? {
//!     client.submit_spam(&comment).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod comment;
pub mod error;

pub use client::{AkismetClient, ClientBuilder, Endpoints};
pub use comment::Comment;
pub use error::{AkismetError, Result};
