use docshare::{
    backend::FileRegistry,
    files::FileError,
    user::{Role, User},
};
use tokio::io::AsyncReadExt;
use url::Url;

use crate::helpers::TestContext;

async fn operation_user(ctx: &TestContext) -> User {
    ctx.user_with_session("operation_user", "pw", Role::Operation)
        .await
        .0
}

#[tokio::test]
async fn test_upload_accepts_exactly_allowed_extensions() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;

    for name in ["a.pptx", "b.docx", "c.xlsx", "D.PPTX", "e.DocX", "f.tar.xlsx"] {
        ctx.instance
            .upload(&ops, name, b"data")
            .await
            .unwrap_or_else(|e| panic!("{name} should be accepted: {e}"));
    }

    for name in [
        "a.pdf", "b.doc", "c.xls", "d.ppt", "e.txt", "f.xlsx.exe", "noextension", "xlsx", "g.",
    ] {
        let err = ctx.instance.upload(&ops, name, b"data").await.unwrap_err();
        assert!(
            matches!(err, docshare::Error::File(FileError::BadFileType { .. })),
            "{name} should be rejected, got {err}"
        );
    }

    assert_eq!(ctx.instance.list_files().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_upload_without_filename_is_no_file() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;

    let err = ctx.instance.upload(&ops, "", b"data").await.unwrap_err();
    assert!(matches!(err, docshare::Error::File(FileError::NoFile)));
    assert!(ctx.stored_names().is_empty());
    assert!(ctx.instance.list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_sanitizes_names() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;

    let record = ctx
        .instance
        .upload(&ops, "../../quarterly report.docx", b"Q")
        .await
        .unwrap();
    assert_eq!(record.filename, "quarterly_report.docx");
    assert_eq!(record.uploader, "operation_user");
    assert_eq!(ctx.stored_names(), ["quarterly_report.docx"]);
}

#[tokio::test]
async fn test_reupload_overwrites_bytes_and_appends_record() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;

    ctx.instance.upload(&ops, "deck.pptx", b"v1").await.unwrap();
    ctx.instance.upload(&ops, "deck.pptx", b"v2").await.unwrap();

    let records = ctx.instance.list_files().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.filename == "deck.pptx"));

    assert_eq!(ctx.instance.storage().read("deck.pptx").await.unwrap(), b"v2");
    assert_eq!(ctx.stored_names(), ["deck.pptx"]);
}

#[tokio::test]
async fn test_fetch_streams_exact_bytes() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;
    let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    ctx.instance.upload(&ops, "blob.xlsx", &payload).await.unwrap();

    let mut stored = ctx.instance.fetch_file("blob.xlsx").await.unwrap();
    assert_eq!(stored.len, payload.len() as u64);
    let mut read_back = Vec::new();
    stored.file.read_to_end(&mut read_back).await.unwrap();
    assert_eq!(read_back, payload);
}

#[tokio::test]
async fn test_fetch_never_recorded_is_not_found() {
    let ctx = TestContext::new().await;
    let err = ctx.instance.fetch_file("missing.docx").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_after_external_removal_is_not_found() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;
    ctx.instance.upload(&ops, "gone.docx", b"bytes").await.unwrap();

    std::fs::remove_file(ctx.upload_dir.path().join("gone.docx")).unwrap();

    let err = ctx.instance.fetch_file("gone.docx").await.unwrap_err();
    assert!(err.is_not_found());
    // The registry still lists it
    assert!(ctx.instance.locate_file("gone.docx").await.is_ok());
}

#[tokio::test]
async fn test_fetch_is_independent_of_registry() {
    let ctx = TestContext::new().await;
    std::fs::write(ctx.upload_dir.path().join("manual.docx"), b"M").unwrap();

    assert!(ctx.instance.locate_file("manual.docx").await.unwrap_err().is_not_found());
    let stored = ctx.instance.fetch_file("manual.docx").await.unwrap();
    assert_eq!(stored.len, 1);
}

#[tokio::test]
async fn test_fetch_rejects_traversal() {
    let ctx = TestContext::new().await;
    let outside = ctx.upload_dir.path().parent().unwrap().join("outside.docx");
    let _ = std::fs::write(&outside, b"secret");

    for name in ["../outside.docx", "..", ".", "a/b.docx", ""] {
        let err = ctx.instance.fetch_file(name).await.unwrap_err();
        assert!(err.is_not_found(), "{name:?} should not resolve");
    }
    let _ = std::fs::remove_file(outside);
}

#[tokio::test]
async fn test_locate_builds_reference() {
    let ctx = TestContext::new().await;
    let ops = operation_user(&ctx).await;
    ctx.instance.upload(&ops, "report.xlsx", b"X").await.unwrap();

    let base = Url::parse("http://localhost:3000/").unwrap();
    let url = ctx.instance.download_url(&base, "report.xlsx").await.unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/download/report.xlsx");

    let err = ctx
        .instance
        .download_url(&base, "other.xlsx")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_locate_returns_earliest_record() {
    let ctx = TestContext::new().await;
    ctx.instance
        .backend()
        .record_file("dup.docx", "first")
        .await
        .unwrap();
    ctx.instance
        .backend()
        .record_file("dup.docx", "second")
        .await
        .unwrap();

    let record = ctx.instance.locate_file("dup.docx").await.unwrap();
    assert_eq!(record.uploader, "first");
}
