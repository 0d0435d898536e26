use std::sync::Mutex;

use engine::{
    AssignItemCmd, CollectCmd, CreateSessionCmd, Engine, IngestReceiptCmd, ItemSelector,
    JoinSessionCmd, Money, NotificationSender, NotifyError, ParsedReceipt, ParsedReceiptItem,
    Session, User, UserSelector,
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

fn receipt(merchant: &str, total: i64, lines: &[(&str, i64)]) -> ParsedReceipt {
    ParsedReceipt {
        merchant: merchant.to_string(),
        total: Money::new(total),
        tip: Money::ZERO,
        items: lines
            .iter()
            .map(|(description, unit)| ParsedReceiptItem {
                description: description.to_string(),
                unit_amount: Money::new(*unit),
                count: 1,
            })
            .collect(),
    }
}

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl NotificationSender for RecordingSender {
    async fn send(&self, phone: &str, text: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), text.to_string()));
        Ok(())
    }
}

struct FailingSender;

impl NotificationSender for FailingSender {
    async fn send(&self, _phone: &str, _text: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("gateway unreachable".to_string()))
    }
}

/// Juan owns a session where Pedro owes him two items and Maria owes nothing.
async fn seed_session(engine: &Engine) -> (User, User, User, Session) {
    let juan = user(engine, "+56911111111", "Juan").await;
    let pedro = user(engine, "+56922222222", "Pedro").await;
    let maria = user(engine, "+56933333333", "Maria").await;

    let session = engine
        .create_session(CreateSessionCmd::new(juan.id).description("Asado"))
        .await
        .unwrap();
    engine
        .join_session(JoinSessionCmd::new(session.id, pedro.id))
        .await
        .unwrap();
    engine
        .join_session(JoinSessionCmd::new(session.id, maria.id))
        .await
        .unwrap();

    let (_, items) = engine
        .ingest_receipt(IngestReceiptCmd::new(
            juan.id,
            receipt("Restaurante", 1695, &[("agua", 1130), ("pan", 565)]),
        ))
        .await
        .unwrap();
    for item in &items {
        engine
            .assign_item(
                AssignItemCmd::new(session.id, juan.id, ItemSelector::ById(item.id))
                    .target(UserSelector::ById(pedro.id)),
            )
            .await
            .unwrap();
    }

    (juan, pedro, maria, session)
}

#[tokio::test]
async fn collection_notice_filters_to_the_collector() {
    let engine = test_engine().await;
    let (juan, pedro, maria, session) = seed_session(&engine).await;

    // Maria also paid for something of Pedro's; it must not leak into Juan's
    // collection notice.
    let (_, maria_items) = engine
        .ingest_receipt(IngestReceiptCmd::new(
            maria.id,
            receipt("Kiosko", 500, &[("bebida", 500)]),
        ))
        .await
        .unwrap();
    engine
        .assign_item(
            AssignItemCmd::new(session.id, maria.id, ItemSelector::ById(maria_items[0].id))
                .target(UserSelector::ById(pedro.id)),
        )
        .await
        .unwrap();

    let notice = engine
        .collection_notice(pedro.id, juan.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notice.total, Money::new(1695));
    assert_eq!(notice.invoices.len(), 1);
    assert_eq!(notice.invoices[0].items.len(), 2);
    assert_eq!(notice.collector_name, "Juan");

    // Maria owes Juan nothing.
    assert!(engine
        .collection_notice(maria.id, juan.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn collect_all_messages_debtors_and_skips_the_rest() {
    let engine = test_engine().await;
    let (juan, pedro, _maria, _) = seed_session(&engine).await;
    engine
        .add_payment_method(juan.id, "Cuenta corriente", Some("Banco Estado\n123456"))
        .await
        .unwrap();

    let sender = RecordingSender::default();
    let report = engine
        .collect_all(CollectCmd::new(juan.id), &sender)
        .await
        .unwrap();

    assert_eq!(report.notified, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (phone, text) = &sent[0];
    assert_eq!(phone, &pedro.phone);
    assert!(text.starts_with("Le debes a Juan 16.95:"));
    assert!(text.contains("• agua: 11.30"));
    assert!(text.contains("Puedes pagar a:"));
    assert!(text.contains("Banco Estado"));
}

#[tokio::test]
async fn collect_all_counts_failed_deliveries() {
    let engine = test_engine().await;
    let (juan, _, _, _) = seed_session(&engine).await;

    let report = engine
        .collect_all(CollectCmd::new(juan.id), &FailingSender)
        .await
        .unwrap();
    assert_eq!(report.notified, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn collect_without_active_session_fails() {
    let engine = test_engine().await;
    let solo = user(&engine, "+56944444444", "Solo").await;

    let err = engine
        .collect_all(CollectCmd::new(solo.id), &RecordingSender::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        engine::EngineError::Validation("no active session".to_string())
    );
}
