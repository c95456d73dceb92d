use super::*;

fn transport(base_url: &str) -> ReqwestTransport {
    ReqwestTransport::new(&ClientConfig::default().with_base_url(base_url)).unwrap()
}

#[test]
fn url_joins_base_and_path() {
    let t = transport("http://127.0.0.1:8000/api/");
    assert_eq!(t.base_url(), "http://127.0.0.1:8000/api");
    assert_eq!(t.url("/jobs/"), "http://127.0.0.1:8000/api/jobs/");
    assert_eq!(t.url("admin/jobs/"), "http://127.0.0.1:8000/api/admin/jobs/");
}

#[test]
fn methods_map_to_reqwest() {
    assert_eq!(reqwest_method(Method::Get), reqwest::Method::GET);
    assert_eq!(reqwest_method(Method::Patch), reqwest::Method::PATCH);
    assert_eq!(reqwest_method(Method::Delete), reqwest::Method::DELETE);
}

#[test]
fn build_form_rejects_bad_mime() {
    let parts = vec![FormPart::File {
        name: "cv_pdf".into(),
        file_name: "cv.pdf".into(),
        mime: "not a mime".into(),
        bytes: b"%PDF".to_vec(),
    }];
    let err = build_form(&parts).unwrap_err();
    assert!(matches!(err, ApiError::Encode(msg) if msg.contains("invalid mime type")));
}

#[test]
fn build_form_accepts_text_and_pdf() {
    let parts = vec![
        FormPart::text("full_name", "Ada Lovelace"),
        FormPart::File {
            name: "cv_pdf".into(),
            file_name: "cv.pdf".into(),
            mime: "application/pdf".into(),
            bytes: b"%PDF-1.7".to_vec(),
        },
    ];
    assert!(build_form(&parts).is_ok());
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let t = transport("http://127.0.0.1:9");
    let err = t.send(&ApiRequest::new(Method::Get, "/jobs/")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout));
}
