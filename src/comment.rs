use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AkismetError, Result};

/// A single piece of user-generated content to be classified.
///
/// Every field is optional. `user_ip` and `user_agent` are nevertheless
/// required by the service and are checked when the comment is submitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Comment {
    /// Overrides the client's blog URL for this comment only.
    pub blog: Option<String>,
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub permalink: Option<String>,
    /// e.g. `comment`, `forum-post`, `reply`, `contact-form`
    pub comment_type: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub author_url: Option<String>,
    pub content: Option<String>,
    /// ISO-8601, set to the time of construction.
    pub date_gmt: Option<String>,
    pub post_modified_gmt: Option<String>,
    pub blog_lang: Option<String>,
    pub blog_charset: Option<String>,
    pub user_role: Option<String>,
    pub is_test: Option<String>,
}

impl Default for Comment {
    fn default() -> Self {
        Self {
            blog: None,
            user_ip: None,
            user_agent: None,
            referrer: None,
            permalink: None,
            comment_type: None,
            author: None,
            author_email: None,
            author_url: None,
            content: None,
            date_gmt: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
            post_modified_gmt: None,
            blog_lang: Some("en-us".to_string()),
            blog_charset: Some("UTF-16".to_string()),
            user_role: Some("user".to_string()),
            is_test: None,
        }
    }
}

impl Comment {
    pub fn new(user_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            user_ip: Some(user_ip.into()),
            user_agent: Some(user_agent.into()),
            ..Default::default()
        }
    }

    pub fn with_blog(mut self, blog: impl Into<String>) -> Self {
        self.blog = Some(blog.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_author_email(mut self, email: impl Into<String>) -> Self {
        self.author_email = Some(email.into());
        self
    }

    pub fn with_comment_type(mut self, comment_type: impl Into<String>) -> Self {
        self.comment_type = Some(comment_type.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_test_mode(mut self) -> Self {
        self.is_test = Some("true".to_string());
        self
    }

    /// Builds the form payload sent to the comment-check, submit-spam and
    /// submit-ham endpoints. `default_blog` is used unless the comment names
    /// its own blog.
    pub fn form_fields(&self, default_blog: &str) -> Result<Vec<(&'static str, String)>> {
        let user_ip = self
            .user_ip
            .as_deref()
            .ok_or(AkismetError::MissingField("user_ip"))?;
        let user_agent = self
            .user_agent
            .as_deref()
            .ok_or(AkismetError::MissingField("user_agent"))?;

        let or_empty = |field: &Option<String>| field.clone().unwrap_or_default();

        Ok(vec![
            ("blog", self.blog.as_deref().unwrap_or(default_blog).to_string()),
            ("user_ip", user_ip.to_string()),
            ("user_agent", user_agent.to_string()),
            ("referrer", or_empty(&self.referrer)),
            ("permalink", or_empty(&self.permalink)),
            ("comment_type", or_empty(&self.comment_type)),
            ("comment_author", or_empty(&self.author)),
            ("comment_author_email", or_empty(&self.author_email)),
            ("comment_author_url", or_empty(&self.author_url)),
            ("comment_content", or_empty(&self.content)),
            ("comment_date_gmt", or_empty(&self.date_gmt)),
            ("comment_post_modified_gmt", or_empty(&self.post_modified_gmt)),
            ("blog_lang", or_empty(&self.blog_lang)),
            ("blog_charset", or_empty(&self.blog_charset)),
            ("user_role", or_empty(&self.user_role)),
            ("is_test", or_empty(&self.is_test)),
        ])
    }
}
