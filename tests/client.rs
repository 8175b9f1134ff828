#![allow(clippy::unwrap_used)]

use akismet::{AkismetClient, AkismetError, Comment, Endpoints};
use pretty_assertions::assert_eq;
use reqwest::{Client, StatusCode};
use url::Url;
use wiremock::{
    matchers::{any, body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const BLOG: &str = "https://blog.example.com";
const UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_0) AppleWebKit/537.36";

fn client_for(server: &MockServer, strict: bool) -> AkismetClient {
    let base = Url::parse(&server.uri()).unwrap();
    AkismetClient::builder()
        .blog(BLOG)
        .api_key("test-key")
        .http_client(Client::new())
        .strict(strict)
        .endpoints(Endpoints::with_base(&base).unwrap())
        .build()
        .unwrap()
}

fn comment() -> Comment {
    Comment::new("127.0.0.1", UA)
        .with_author("Jane Doe")
        .with_author_email("jane@example.com")
        .with_comment_type("comment")
        .with_content("Thanks, this was helpful.")
}

async fn reply(server: &MockServer, endpoint: &str, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/1.1/{endpoint}")))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_verify_key_valid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/verify-key"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("key=test-key"))
        .and(body_string_contains("blog=https%3A%2F%2Fblog.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("valid"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server, false).verify_key().await.unwrap());
}

#[tokio::test]
async fn test_verify_key_anything_else_is_invalid() {
    for (status, body) in [(200, "invalid"), (200, "valid\n"), (500, "<html>oops</html>")] {
        let server = MockServer::start().await;
        reply(&server, "verify-key", status, body).await;

        assert!(
            !client_for(&server, false).verify_key().await.unwrap(),
            "{body:?} must not verify"
        );
    }
}

#[tokio::test]
async fn test_check_spam() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/comment-check"))
        .and(body_string_contains("comment_author=viagra-test-123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .mount(&server)
        .await;
    reply(&server, "comment-check", 200, "false").await;

    let client = client_for(&server, false);

    let spam = comment().with_author("viagra-test-123");
    assert!(client.check_spam(&spam).await.unwrap());
    assert!(!client.check_spam(&comment()).await.unwrap());
}

#[tokio::test]
async fn test_check_spam_sends_every_field() {
    let server = MockServer::start().await;
    let mut comment = comment();
    comment.date_gmt = Some("2017-11-20T10:00:00Z".to_string());

    Mock::given(method("POST"))
        .and(path("/1.1/comment-check"))
        .and(body_string_contains("blog=https%3A%2F%2Fblog.example.com"))
        .and(body_string_contains("user_ip=127.0.0.1"))
        .and(body_string_contains("user_agent=Mozilla%2F5.0"))
        .and(body_string_contains("referrer=&"))
        .and(body_string_contains("comment_type=comment"))
        .and(body_string_contains("comment_author=Jane+Doe"))
        .and(body_string_contains("comment_author_email=jane%40example.com"))
        .and(body_string_contains("comment_date_gmt=2017-11-20T10%3A00%3A00Z"))
        .and(body_string_contains("comment_post_modified_gmt=&"))
        .and(body_string_contains("blog_lang=en-us"))
        .and(body_string_contains("blog_charset=UTF-16"))
        .and(body_string_contains("user_role=user"))
        .and(body_string_contains("is_test="))
        .respond_with(ResponseTemplate::new(200).set_body_string("false"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client_for(&server, false).check_spam(&comment).await.unwrap());
}

#[tokio::test]
async fn test_comment_blog_overrides_client_blog() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/comment-check"))
        .and(body_string_contains("blog=http%3A%2F%2Fwww.bagombo.org"))
        .respond_with(ResponseTemplate::new(200).set_body_string("false"))
        .expect(1)
        .mount(&server)
        .await;

    let comment = comment().with_blog("http://www.bagombo.org");
    client_for(&server, false).check_spam(&comment).await.unwrap();
}

#[tokio::test]
async fn test_unexpected_check_response_is_not_spam() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/comment-check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("invalid")
                .insert_header("X-akismet-debug-help", "Empty \"user_ip\" value"),
        )
        .mount(&server)
        .await;

    assert!(!client_for(&server, false).check_spam(&comment()).await.unwrap());
}

#[tokio::test]
async fn test_submit_spam_and_ham_return_body() {
    let server = MockServer::start().await;
    reply(&server, "submit-spam", 200, "Thanks for making the web a better place.").await;
    reply(&server, "submit-ham", 200, "Thanks for making the web a better place!").await;

    let client = client_for(&server, false);
    assert_eq!(
        client.submit_spam(&comment()).await.unwrap(),
        "Thanks for making the web a better place."
    );
    assert_eq!(
        client.submit_ham(&comment()).await.unwrap(),
        "Thanks for making the web a better place!"
    );
}

#[tokio::test]
async fn test_missing_required_fields_never_hit_the_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, false);

    let mut no_agent = comment();
    no_agent.user_agent = None;
    let mut no_ip = comment();
    no_ip.user_ip = None;

    assert!(matches!(
        client.check_spam(&no_agent).await,
        Err(AkismetError::MissingField("user_agent"))
    ));
    assert!(matches!(
        client.submit_spam(&no_ip).await,
        Err(AkismetError::MissingField("user_ip"))
    ));
    assert!(matches!(
        client.submit_ham(&no_agent).await,
        Err(AkismetError::MissingField("user_agent"))
    ));
}

#[tokio::test]
async fn test_strict_mode_reports_status() {
    let server = MockServer::start().await;
    reply(&server, "submit-ham", 503, "maintenance").await;

    match client_for(&server, true).submit_ham(&comment()).await {
        Err(AkismetError::Status { url, status, body }) => {
            assert_eq!(url.path(), "/1.1/submit-ham");
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lenient_mode_reads_error_bodies() {
    let server = MockServer::start().await;
    reply(&server, "comment-check", 500, "true").await;

    assert!(client_for(&server, false).check_spam(&comment()).await.unwrap());
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    // Bind and release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    drop(listener);

    let client = AkismetClient::builder()
        .blog(BLOG)
        .api_key("test-key")
        .http_client(Client::new())
        .endpoints(Endpoints::with_base(&base).unwrap())
        .build()
        .unwrap();

    assert!(matches!(
        client.verify_key().await,
        Err(AkismetError::Transport(_))
    ));
}

#[tokio::test]
async fn test_client_is_shared_across_tasks() {
    let server = MockServer::start().await;
    reply(&server, "comment-check", 200, "false").await;

    let client = client_for(&server, false);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.check_spam(&comment()).await })
        })
        .collect();

    for handle in handles {
        assert!(!handle.await.unwrap().unwrap());
    }
}

#[test]
fn test_production_endpoints_derive_from_key() {
    let client = AkismetClient::new(BLOG, "a1b2c3", Client::new()).unwrap();

    assert_eq!(
        client.endpoints().comment_check.as_str(),
        "https://a1b2c3.rest.akismet.com/1.1/comment-check"
    );
    assert_eq!(
        client.endpoints().submit_spam.as_str(),
        "https://a1b2c3.rest.akismet.com/1.1/submit-spam"
    );
    assert_eq!(
        client.endpoints().submit_ham.as_str(),
        "https://a1b2c3.rest.akismet.com/1.1/submit-ham"
    );
    assert_eq!(
        client.endpoints().verify_key.as_str(),
        "https://rest.akismet.com/1.1/verify-key"
    );
}

fn live_client() -> Option<AkismetClient> {
    let key = std::env::var("AKISMET_KEY").ok()?;
    AkismetClient::new("http://www.bagombo.org", key, Client::new()).ok()
}

#[tokio::test]
#[ignore = "talks to rest.akismet.com, needs AKISMET_KEY"]
async fn test_live_comment_is_not_spam() {
    let Some(client) = live_client() else { return };

    let comment = Comment::new("127.0.0.1", UA)
        .with_blog("http://www.bagombo.org")
        .with_author("Tyler Rhodes")
        .with_author_email("tyler@example.com")
        .with_comment_type("comment")
        .with_content("This is a test that should not be marked as spam due to the author value.");

    assert!(!client.check_spam(&comment).await.unwrap());
}

#[tokio::test]
#[ignore = "talks to rest.akismet.com, needs AKISMET_KEY"]
async fn test_live_comment_is_spam() {
    let Some(client) = live_client() else { return };

    let comment = Comment::new("127.0.0.1", UA)
        .with_blog("http://www.bagombo.org")
        .with_author("viagra-test-123")
        .with_author_email("test@test.com")
        .with_comment_type("comment")
        .with_content("This is a test that should be marked as spam due to the author value.");

    assert!(client.check_spam(&comment).await.unwrap());
}
