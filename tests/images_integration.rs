//! Integration tests for representative image download

use camino::Utf8PathBuf;
use core::time::Duration;
use repo_trending::enrich::ImageDownloader;
use repo_trending::fetch::ProviderResult;
use std::fs;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is not UTF-8");
    (dir, path)
}

#[tokio::test]
async fn test_relative_image_is_resolved_and_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/o/r/dev/img/Logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES).insert_header("content-type", "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let (_guard, dir) = temp_dir();
    let downloader = ImageDownloader::new(1024, Duration::from_secs(5), server.uri()).unwrap();

    let readme = "# Title\n\n![badge](data:image/png;base64,AAAA)\n![logo](./img/Logo.png)\n<img src=\"other.gif\">";
    let result = downloader.extract_representative_image(readme, "o/r", Some("dev"), &dir).await;

    let ProviderResult::Found(image) = result else {
        panic!("expected an image, got {result}");
    };

    assert_eq!(image.filename, "1_logo.png");
    assert_eq!(image.original_url, "./img/Logo.png");
    assert_eq!(image.absolute_url, format!("{}/o/r/dev/img/Logo.png", server.uri()));
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.size, PNG_BYTES.len() as u64);
    assert_eq!(fs::read(&image.path).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_non_image_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/o/r/main/shot.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>").insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let (_guard, dir) = temp_dir();
    let downloader = ImageDownloader::new(1024, Duration::from_secs(5), server.uri()).unwrap();

    let result = downloader.extract_representative_image("![s](shot.png)", "o/r", None, &dir).await;
    assert!(matches!(result, ProviderResult::Rejected(_)), "got {result}");
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]).insert_header("content-type", "image/png"))
        .mount(&server)
        .await;

    let (_guard, dir) = temp_dir();
    let downloader = ImageDownloader::new(1024, Duration::from_secs(5), "https://raw.example.com").unwrap();

    let readme = format!("![big]({}/big.png)", server.uri());
    let result = downloader.extract_representative_image(&readme, "o/r", None, &dir).await;
    assert!(matches!(result, ProviderResult::Rejected(_)), "got {result}");
}

#[tokio::test]
async fn test_missing_image_is_unavailable() {
    let server = MockServer::start().await;
    let (_guard, dir) = temp_dir();
    let downloader = ImageDownloader::new(1024, Duration::from_secs(5), server.uri()).unwrap();

    let result = downloader.extract_representative_image("![gone](gone.png)", "o/r", None, &dir).await;
    assert!(matches!(result, ProviderResult::Unavailable(_)), "got {result}");
}

#[tokio::test]
async fn test_readme_without_images() {
    let (_guard, dir) = temp_dir();
    let downloader = ImageDownloader::new(1024, Duration::from_secs(5), "https://raw.example.com").unwrap();

    let result = downloader.extract_representative_image("just text", "o/r", None, &dir).await;
    assert!(!result.is_found());
}
