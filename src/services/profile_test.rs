use serde_json::json;

use super::*;
use crate::mock::{MockTransport, client};
use crate::net::RequestBody;

fn pdf() -> CvUpload {
    CvUpload::new("resume.PDF", b"%PDF-1.7 test".to_vec()).unwrap()
}

#[test]
fn cv_must_be_non_empty_pdf() {
    assert!(CvUpload::new("resume.pdf", b"%PDF".to_vec()).is_ok());
    match CvUpload::new("resume.docx", b"data".to_vec()) {
        Err(ApiError::Validation(errors)) => assert_eq!(errors.get(CV_FIELD), Some("CV must be a PDF file")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(matches!(CvUpload::new("resume.pdf", Vec::new()), Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn cv_from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cv.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let cv = CvUpload::from_path(&path).await.unwrap();
    assert_eq!(cv.file_name, "cv.pdf");
    assert_eq!(cv.bytes, b"%PDF-1.4");

    let missing = CvUpload::from_path(&dir.path().join("nope.pdf")).await;
    assert!(matches!(missing, Err(ApiError::Storage(_))));
}

#[tokio::test]
async fn get_and_patch_profile() {
    let mock = MockTransport::new();
    mock.respond(Method::Get, PROFILE_PATH, 200, json!({ "full_name": "Ada", "skills": ["Rust"], "github": "ada" }))
        .respond(Method::Patch, PROFILE_PATH, 200, json!({ "full_name": "Ada", "bio": "Hi" }));
    let (client, _store) = client(&mock);

    let profile = get(&client).await.unwrap();
    assert_eq!(profile.skills, vec!["Rust"]);
    assert_eq!(profile.extra.get("github"), Some(&json!("ada")));
    assert!(!profile.has_cv());

    let patched = patch(&client, &json!({ "bio": "Hi" })).await.unwrap();
    assert_eq!(patched.bio.as_deref(), Some("Hi"));
}

#[tokio::test]
async fn update_sends_put_json() {
    let mock = MockTransport::new();
    mock.respond(Method::Put, PROFILE_PATH, 200, json!({ "location": "Dhaka" }));
    let (client, _store) = client(&mock);

    let profile = Profile { location: Some("Dhaka".into()), ..Profile::default() };
    update(&client, &profile).await.unwrap();

    assert_eq!(mock.last_request().json_body(), Some(&json!({ "location": "Dhaka" })));
}

#[tokio::test]
async fn upload_cv_sends_single_pdf_part() {
    let mock = MockTransport::new();
    mock.respond(Method::Patch, PROFILE_PATH, 200, json!({ "cv_pdf": "/media/cv/resume.pdf" }));
    let (client, _store) = client(&mock);

    let profile = upload_cv(&client, pdf()).await.unwrap();

    assert!(profile.has_cv());
    let RequestBody::Multipart(parts) = mock.last_request().body else {
        panic!("expected multipart body");
    };
    assert_eq!(
        parts,
        vec![FormPart::File {
            name: "cv_pdf".into(),
            file_name: "resume.PDF".into(),
            mime: "application/pdf".into(),
            bytes: b"%PDF-1.7 test".to_vec(),
        }]
    );
}

#[tokio::test]
async fn update_with_cv_flattens_fields() {
    let mock = MockTransport::new();
    mock.respond(Method::Put, PROFILE_PATH, 200, json!({}));
    let (client, _store) = client(&mock);
    let mut fields = Map::new();
    fields.insert("bio".into(), json!("Hello"));
    fields.insert("skills".into(), json!(["Rust", "SQL"]));
    fields.insert("phone".into(), Value::Null);

    update_with_cv(&client, &fields, pdf()).await.unwrap();

    let RequestBody::Multipart(parts) = mock.last_request().body else {
        panic!("expected multipart body");
    };
    let names: Vec<&str> = parts
        .iter()
        .map(|part| match part {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name.as_str(),
        })
        .collect();
    assert_eq!(names, vec!["bio", "skills", "cv_pdf"]);
    assert_eq!(parts[1], FormPart::text("skills", r#"["Rust","SQL"]"#));
}

#[tokio::test]
async fn delete_cv_patches_null() {
    let mock = MockTransport::new();
    mock.respond(Method::Patch, PROFILE_PATH, 200, json!({ "cv_pdf": null }));
    let (client, _store) = client(&mock);

    let profile = delete_cv(&client).await.unwrap();

    assert!(!profile.has_cv());
    assert_eq!(mock.last_request().json_body(), Some(&json!({ "cv_pdf": null })));
}
