//! End-to-end flows through the Instance, gates included.

use docshare::{auth::Access, user::Role};
use tokio::io::AsyncReadExt;

use crate::helpers::TestContext;

#[tokio::test]
async fn test_signup_and_authenticate() {
    let ctx = TestContext::new().await;

    ctx.instance.signup("alice", "pw1").await.unwrap();
    let err = ctx.instance.signup("alice", "pw2").await.unwrap_err();
    assert!(err.is_conflict());

    assert!(ctx.instance.authenticate("alice", "pw1").await.unwrap());
    assert!(!ctx.instance.authenticate("alice", "pw2").await.unwrap());
}

#[tokio::test]
async fn test_operation_uploads_client_downloads() {
    let ctx = TestContext::new().await;
    let (_, ops_session) = ctx
        .user_with_session("operation_user", "ops-pw", Role::Operation)
        .await;
    ctx.instance.signup("client_user", "client-pw").await.unwrap();
    let client = ctx.instance.login("client_user", "client-pw").await.unwrap();
    let client_session = docshare::auth::SessionIdentity::for_user(&client);

    let Access::Granted(uploader) = ctx
        .instance
        .check_role(Some(&ops_session), Role::Operation)
        .await
        .unwrap()
    else {
        panic!("operation user should pass the upload gate");
    };
    ctx.instance
        .upload(&uploader, "report.xlsx", b"X")
        .await
        .unwrap();

    assert!(
        ctx.instance
            .check_role(Some(&client_session), Role::Client)
            .await
            .unwrap()
            .is_granted()
    );
    let listed: Vec<(String, String)> = ctx
        .instance
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .map(|f| (f.filename, f.uploader))
        .collect();
    assert_eq!(
        listed,
        [("report.xlsx".to_string(), "operation_user".to_string())]
    );

    let mut stored = ctx.instance.fetch_file("report.xlsx").await.unwrap();
    let mut bytes = Vec::new();
    stored.file.read_to_end(&mut bytes).await.unwrap();
    assert_eq!(bytes, b"X");
}

#[tokio::test]
async fn test_unauthenticated_upload_changes_nothing() {
    let ctx = TestContext::new().await;

    let access = ctx
        .instance
        .check_role(None, Role::Operation)
        .await
        .unwrap();
    assert_eq!(access, Access::Unauthenticated);

    assert!(ctx.stored_names().is_empty());
    assert!(ctx.instance.list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_cannot_pass_upload_gate() {
    let ctx = TestContext::new().await;
    let (_, session) = ctx.user_with_session("carol", "pw", Role::Client).await;

    let access = ctx
        .instance
        .check_role(Some(&session), Role::Operation)
        .await
        .unwrap();
    assert!(matches!(access, Access::Forbidden { .. }));
    assert!(access.into_result().unwrap_err().is_permission_denied());
}
