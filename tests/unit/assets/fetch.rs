use base64::Engine as _;

use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "ayo_canvas_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn fetches_base64_data_urls() {
    let payload = base64::engine::general_purpose::STANDARD.encode(b"hello");
    let bytes = DefaultFetcher::new()
        .fetch(&format!("data:image/png;base64,{payload}"))
        .unwrap();
    assert_eq!(bytes, b"hello");
}

#[test]
fn fetches_percent_encoded_data_urls() {
    let bytes = DefaultFetcher::new()
        .fetch("data:image/svg+xml,%3Csvg%3E")
        .unwrap();
    assert_eq!(bytes, b"<svg>");
}

#[test]
fn rejects_malformed_data_urls() {
    assert!(DefaultFetcher::new().fetch("data:image/png;base64").is_err());
    assert!(
        DefaultFetcher::new()
            .fetch("data:image/png;base64,@@@")
            .is_err()
    );
}

#[test]
fn reads_paths_relative_to_root() {
    let tmp = temp_dir("fetch_root");
    std::fs::create_dir_all(tmp.join("img")).unwrap();
    std::fs::write(tmp.join("img/a.bin"), b"abc").unwrap();

    let fetcher = DefaultFetcher::with_root(&tmp);
    assert_eq!(fetcher.root(), Some(tmp.as_path()));
    assert_eq!(fetcher.fetch("img/a.bin").unwrap(), b"abc");
    assert_eq!(
        fetcher
            .fetch(&format!("file://{}", tmp.join("img/a.bin").display()))
            .unwrap(),
        b"abc"
    );
    assert!(fetcher.fetch("img/missing.bin").is_err());

    std::fs::remove_dir_all(&tmp).ok();
}

#[cfg(not(feature = "http"))]
#[test]
fn http_requires_feature() {
    let err = DefaultFetcher::new()
        .fetch("https://example.invalid/a.png")
        .unwrap_err();
    assert!(err.to_string().contains("http"));
}
