use engine::{
    CloseSessionCmd, CreateSessionCmd, Engine, EngineError, JoinSessionCmd, SessionStatus, User,
};
use migration::MigratorTrait;
use sea_orm::Database;

async fn test_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn user(engine: &Engine, phone: &str, name: &str) -> User {
    engine.ensure_user(phone, name).await.unwrap()
}

#[tokio::test]
async fn create_session_enrolls_owner_as_member() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;

    let session = engine
        .create_session(CreateSessionCmd::new(alice.id).description("Asado"))
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.description.as_deref(), Some("Asado"));

    let active = engine.active_session_of(alice.id).await.unwrap().unwrap();
    assert_eq!(active.id, session.id);
}

#[tokio::test]
async fn second_active_session_is_a_conflict() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;

    engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();
    let err = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn join_reports_already_member() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;
    let bob = user(&engine, "+56922222222", "Bob").await;

    let session = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();

    let first = engine
        .join_session(JoinSessionCmd::new(session.id, bob.id))
        .await
        .unwrap();
    assert!(!first.already_member);
    assert!(first.closed_session.is_none());

    let second = engine
        .join_session(JoinSessionCmd::new(session.id, bob.id))
        .await
        .unwrap();
    assert!(second.already_member);
}

#[tokio::test]
async fn join_closes_previously_owned_session() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;
    let bob = user(&engine, "+56922222222", "Bob").await;

    let alices = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();
    let bobs = engine
        .create_session(CreateSessionCmd::new(bob.id))
        .await
        .unwrap();

    let outcome = engine
        .join_session(JoinSessionCmd::new(alices.id, bob.id))
        .await
        .unwrap();
    let closed = outcome.closed_session.unwrap();
    assert_eq!(closed.id, bobs.id);
    assert_eq!(closed.status, SessionStatus::Closed);

    let active = engine.active_session_of(bob.id).await.unwrap().unwrap();
    assert_eq!(active.id, alices.id);
}

#[tokio::test]
async fn join_closed_session_fails() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;
    let carol = user(&engine, "+56933333333", "Carol").await;

    let session = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();
    engine
        .close_session(CloseSessionCmd::new(session.id, alice.id))
        .await
        .unwrap();

    let err = engine
        .join_session(JoinSessionCmd::new(session.id, carol.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn close_requires_owner() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;
    let bob = user(&engine, "+56922222222", "Bob").await;

    let session = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();
    engine
        .join_session(JoinSessionCmd::new(session.id, bob.id))
        .await
        .unwrap();

    let err = engine
        .close_session(CloseSessionCmd::new(session.id, bob.id))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("only the owner may close the session".to_string())
    );
}

#[tokio::test]
async fn close_twice_fails() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;

    let session = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();
    engine
        .close_session(CloseSessionCmd::new(session.id, alice.id))
        .await
        .unwrap();

    let err = engine
        .close_session(CloseSessionCmd::new(session.id, alice.id))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("session already closed".to_string())
    );
}

#[tokio::test]
async fn close_clears_active_session_of_every_member() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;
    let bob = user(&engine, "+56922222222", "Bob").await;

    let session = engine
        .create_session(CreateSessionCmd::new(bob.id))
        .await
        .unwrap();
    engine
        .join_session(JoinSessionCmd::new(session.id, alice.id))
        .await
        .unwrap();

    let closed = engine
        .close_session(CloseSessionCmd::new(session.id, bob.id))
        .await
        .unwrap();
    assert_eq!(closed.status, SessionStatus::Closed);

    assert!(engine.active_session_of(alice.id).await.unwrap().is_none());
    assert!(engine.active_session_of(bob.id).await.unwrap().is_none());
}

#[tokio::test]
async fn membership_in_two_active_sessions_is_a_conflict() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;
    let bob = user(&engine, "+56922222222", "Bob").await;
    let carol = user(&engine, "+56933333333", "Carol").await;

    let alices = engine
        .create_session(CreateSessionCmd::new(alice.id))
        .await
        .unwrap();
    let bobs = engine
        .create_session(CreateSessionCmd::new(bob.id))
        .await
        .unwrap();

    // Carol owns nothing, so neither join closes anything for her.
    engine
        .join_session(JoinSessionCmd::new(alices.id, carol.id))
        .await
        .unwrap();
    engine
        .join_session(JoinSessionCmd::new(bobs.id, carol.id))
        .await
        .unwrap();

    let err = engine.active_session_of(carol.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn unknown_user_and_session_are_not_found() {
    let engine = test_engine().await;
    let alice = user(&engine, "+56911111111", "Alice").await;

    let err = engine.active_session_of(999).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user".to_string()));

    let err = engine
        .join_session(JoinSessionCmd::new(uuid::Uuid::new_v4(), alice.id))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("session".to_string()));
}
