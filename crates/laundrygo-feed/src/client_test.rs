use super::*;

fn test_client(base_url: &str, auth: Option<&str>) -> RealtimeClient {
    RealtimeClient::with_base_url(base_url, auth, 30).expect("client construction should not fail")
}

#[test]
fn build_url_appends_json_suffix() {
    let client = test_client("https://demo.firebaseio.com", None);
    let url = client.build_url("points").unwrap();
    assert_eq!(url.as_str(), "https://demo.firebaseio.com/points.json");
}

#[test]
fn build_url_handles_nested_paths_and_slashes() {
    let client = test_client("https://demo.firebaseio.com/", None);
    let url = client.build_url("/points/-Nabc/").unwrap();
    assert_eq!(url.as_str(), "https://demo.firebaseio.com/points/-Nabc.json");
}

#[test]
fn build_url_for_root() {
    let client = test_client("https://demo.firebaseio.com", None);
    let url = client.build_url("/").unwrap();
    assert_eq!(url.as_str(), "https://demo.firebaseio.com/.json");
}

#[test]
fn build_url_keeps_base_path() {
    let client = test_client("http://127.0.0.1:9000/db", None);
    let url = client.build_url("laundries").unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:9000/db/laundries.json");
}

#[test]
fn build_url_adds_auth_query() {
    let client = test_client("https://demo.firebaseio.com", Some("s3cr&t"));
    let url = client.build_url("points").unwrap();
    assert_eq!(
        url.as_str(),
        "https://demo.firebaseio.com/points.json?auth=s3cr%26t"
    );
}

#[test]
fn empty_auth_is_ignored() {
    let client = test_client("https://demo.firebaseio.com", Some(""));
    let url = client.build_url("points").unwrap();
    assert!(url.query().is_none());
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = RealtimeClient::with_base_url("not a url", None, 30).unwrap_err();
    assert!(matches!(err, FeedError::InvalidUrl { .. }));
}

#[test]
fn child_path_rejects_unusable_keys() {
    assert_eq!(child_path("points", "-Nabc").unwrap(), "points/-Nabc");
    assert_eq!(child_path("points/", " k1 ").unwrap(), "points/k1");
    for bad in ["", "  ", "a/b", "a.b", "a#b", "$a", "[0]"] {
        assert!(
            matches!(child_path("points", bad), Err(FeedError::InvalidKey(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn debug_output_redacts_auth() {
    let client = test_client("https://demo.firebaseio.com", Some("super-secret"));
    let rendered = format!("{client:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
