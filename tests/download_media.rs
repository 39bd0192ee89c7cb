mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::FlakyResponder;
use std::time::Duration;
use storycrafter::{MediaDownloader, MediaReference, RetryPolicy, StoryError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader(api_key: Option<&str>) -> MediaDownloader {
    MediaDownloader::new(reqwest::Client::new(), api_key.map(str::to_string))
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(1)))
}

#[test]
fn test_key_appended_only_when_missing_and_configured() {
    let with_key = downloader(Some("secret"));
    let without_key = downloader(None);

    assert_eq!(
        with_key
            .authorized_url("https://media.example.com/v1/files/abc:download?alt=media")
            .unwrap()
            .as_str(),
        "https://media.example.com/v1/files/abc:download?alt=media&key=secret"
    );
    assert_eq!(
        with_key
            .authorized_url("https://media.example.com/clip.mp4")
            .unwrap()
            .as_str(),
        "https://media.example.com/clip.mp4?key=secret"
    );

    let already_signed = "https://media.example.com/clip.mp4?alt=media&key=other";
    assert_eq!(
        with_key.authorized_url(already_signed).unwrap().as_str(),
        already_signed
    );

    let unsigned = "https://media.example.com/clip.mp4?alt=media";
    assert_eq!(without_key.authorized_url(unsigned).unwrap().as_str(), unsigned);
}

#[tokio::test]
async fn test_download_appends_key_and_encodes_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/clip.mp4"))
        .and(query_param("alt", "media"))
        .and(query_param("key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x00\x00\x00\x20ftypisom".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let media = MediaReference::new(format!("{}/files/clip.mp4?alt=media", server.uri()));
    let encoded = downloader(Some("secret")).download_media(&media).await.unwrap();

    assert_eq!(STANDARD.decode(encoded).unwrap(), b"\x00\x00\x00\x20ftypisom");
}

#[tokio::test]
async fn test_download_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/clip.mp4"))
        .respond_with(FlakyResponder::new(2, "video"))
        .expect(3)
        .mount(&server)
        .await;

    let media = MediaReference::new(format!("{}/files/clip.mp4", server.uri()));
    let encoded = downloader(None).download_media(&media).await.unwrap();

    assert_eq!(encoded, STANDARD.encode("video"));
}

#[tokio::test]
async fn test_download_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("file has expired"))
        .expect(3)
        .mount(&server)
        .await;

    let media = MediaReference::new(format!("{}/files/gone.mp4", server.uri()));
    let err = downloader(Some("secret"))
        .download_media(&media)
        .await
        .unwrap_err();

    match err {
        StoryError::DownloadFailed { status, body } => {
            assert!(status.contains("404"), "status was {status}");
            assert!(status.contains("Not Found"), "status was {status}");
            assert_eq!(body, "file has expired");
        }
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_url_is_an_invalid_reference() {
    let err = downloader(Some("secret"))
        .download_media(&MediaReference::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoryError::InvalidReference(_)));

    let err = downloader(Some("secret"))
        .download_media(&MediaReference::new("not a url"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoryError::InvalidReference(_)));
}
