use engine::{
    AssignItemCmd, CloseSessionCmd, CreateSessionCmd, Engine, IngestReceiptCmd, Invoice, Item,
    ItemSelector, JoinSessionCmd, Money, ParsedReceipt, ParsedReceiptItem, ReconcileCmd,
    ReconcileOutcome, Session, User, UserSelector,
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

/// Creditor opens a session, debtor joins, the creditor ingests one receipt
/// and every item is assigned to the debtor.
async fn seed_debt(
    engine: &Engine,
    creditor: &User,
    debtor: &User,
    total: i64,
    lines: &[(&str, i64)],
) -> (Session, Invoice, Vec<Item>) {
    let session = match engine.active_session_of(creditor.id).await.unwrap() {
        Some(session) => session,
        None => engine
            .create_session(CreateSessionCmd::new(creditor.id))
            .await
            .unwrap(),
    };
    if engine.active_session_of(debtor.id).await.unwrap().is_none() {
        engine
            .join_session(JoinSessionCmd::new(session.id, debtor.id))
            .await
            .unwrap();
    }

    let (invoice, items) = engine
        .ingest_receipt(IngestReceiptCmd::new(
            creditor.id,
            receipt("Restaurante", total, lines),
        ))
        .await
        .unwrap();
    for item in &items {
        engine
            .assign_item(
                AssignItemCmd::new(session.id, creditor.id, ItemSelector::ById(item.id))
                    .target(UserSelector::ById(debtor.id)),
            )
            .await
            .unwrap();
    }

    (session, invoice, items)
}

#[tokio::test]
async fn exact_payment_settles_single_item() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (_, invoice, items) = seed_debt(&engine, &juan, &pedro, 5750, &[("cena", 5750)]).await;

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(5750)))
        .await
        .unwrap();

    let ReconcileOutcome::Settled(settlement) = outcome else {
        panic!("expected a full settlement");
    };
    assert_eq!(settlement.items_paid, 1);
    assert_eq!(settlement.items_partial, 0);
    assert_eq!(settlement.remaining, Money::ZERO);
    assert_eq!(settlement.payment.amount, Money::new(5750));
    assert_eq!(settlement.payment.payer_id, pedro.id);
    assert_eq!(settlement.payment.receiver_id, juan.id);

    let (invoice_after, items_after) = engine.invoice(invoice.id).await.unwrap();
    assert_eq!(invoice_after.pending, Money::ZERO);
    assert!(items_after[0].is_paid);
    assert_eq!(items_after[0].paid, Money::new(5750));
    assert_eq!(items_after[0].payment_id, Some(settlement.payment.id));
    assert_eq!(items_after[0].id, items[0].id);
}

#[tokio::test]
async fn partial_payment_allocates_in_creation_order() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (_, invoice, items) =
        seed_debt(&engine, &juan, &pedro, 5000, &[("fondo", 3000), ("postre", 2000)]).await;

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(4000)))
        .await
        .unwrap();

    let ReconcileOutcome::PartiallySettled(settlement) = outcome else {
        panic!("expected a partial settlement");
    };
    assert_eq!(settlement.items_paid, 1);
    assert_eq!(settlement.items_partial, 1);
    assert_eq!(settlement.remaining, Money::new(1000));

    let (invoice_after, items_after) = engine.invoice(invoice.id).await.unwrap();
    // 50.00 pending minus the 40.00 allocated
    assert_eq!(invoice_after.pending, Money::new(1000));

    let first = items_after.iter().find(|i| i.id == items[0].id).unwrap();
    assert!(first.is_paid);
    assert_eq!(first.paid, Money::new(3000));

    let second = items_after.iter().find(|i| i.id == items[1].id).unwrap();
    assert!(!second.is_paid);
    assert_eq!(second.paid, Money::new(1000));
    assert_eq!(second.payment_id, Some(settlement.payment.id));
}

#[tokio::test]
async fn partial_payment_leaves_items_beyond_exhaustion_untouched() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (_, invoice, items) = seed_debt(
        &engine,
        &juan,
        &pedro,
        6000,
        &[("fondo", 3000), ("postre", 2000), ("cafe", 1000)],
    )
    .await;

    engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(3000)))
        .await
        .unwrap();

    let (_, items_after) = engine.invoice(invoice.id).await.unwrap();
    let third = items_after.iter().find(|i| i.id == items[2].id).unwrap();
    assert!(!third.is_paid);
    assert_eq!(third.paid, Money::ZERO);
    assert_eq!(third.payment_id, None);
}

#[tokio::test]
async fn second_partial_payment_completes_the_debt() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (_, invoice, _) =
        seed_debt(&engine, &juan, &pedro, 5000, &[("fondo", 3000), ("postre", 2000)]).await;

    engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(4000)))
        .await
        .unwrap();
    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(1000)))
        .await
        .unwrap();

    assert!(matches!(outcome, ReconcileOutcome::Settled(_)));
    let (invoice_after, items_after) = engine.invoice(invoice.id).await.unwrap();
    assert_eq!(invoice_after.pending, Money::ZERO);
    assert!(items_after.iter().all(|item| item.is_paid));
}

#[tokio::test]
async fn over_payment_is_rejected_without_mutation() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (_, invoice, _) = seed_debt(&engine, &juan, &pedro, 5750, &[("cena", 5750)]).await;

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(10000)))
        .await
        .unwrap();

    let ReconcileOutcome::AmountExceedsPending { transfer, pending } = outcome else {
        panic!("expected the over-payment to be rejected");
    };
    assert_eq!(transfer, Money::new(10000));
    assert_eq!(pending, Money::new(5750));

    let (invoice_after, items_after) = engine.invoice(invoice.id).await.unwrap();
    assert_eq!(invoice_after.pending, Money::new(5750));
    assert!(!items_after[0].is_paid);
    assert_eq!(items_after[0].paid, Money::ZERO);
    assert_eq!(items_after[0].payment_id, None);
}

#[tokio::test]
async fn transfer_within_tolerance_counts_as_exact() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (_, invoice, _) = seed_debt(&engine, &juan, &pedro, 5750, &[("cena", 5750)]).await;

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(5749)))
        .await
        .unwrap();

    let ReconcileOutcome::Settled(settlement) = outcome else {
        panic!("expected a full settlement");
    };
    assert_eq!(settlement.payment.amount, Money::new(5749));

    let (invoice_after, items_after) = engine.invoice(invoice.id).await.unwrap();
    // The item is considered fully paid; the invoice owes nothing.
    assert!(items_after[0].is_paid);
    assert_eq!(items_after[0].paid, Money::new(5750));
    assert_eq!(invoice_after.pending, Money::ZERO);
}

#[tokio::test]
async fn nothing_pending_is_a_no_op() {
    let engine = test_engine().await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(1000)))
        .await
        .unwrap();
    assert!(matches!(outcome, ReconcileOutcome::NothingPending));
}

#[tokio::test]
async fn mixed_creditors_require_disambiguation() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let zoe = user(&engine, "+56933333333", "Zoe").await;

    let (session, juan_invoice, _) =
        seed_debt(&engine, &juan, &pedro, 3000, &[("fondo", 3000)]).await;

    // Zoe joins the same session and ingests her own receipt for Pedro.
    engine
        .join_session(JoinSessionCmd::new(session.id, zoe.id))
        .await
        .unwrap();
    let (zoe_invoice, zoe_items) = engine
        .ingest_receipt(IngestReceiptCmd::new(
            zoe.id,
            receipt("Kiosko", 500, &[("bebida", 500)]),
        ))
        .await
        .unwrap();
    engine
        .assign_item(
            AssignItemCmd::new(session.id, zoe.id, ItemSelector::ById(zoe_items[0].id))
                .target(UserSelector::ById(pedro.id)),
        )
        .await
        .unwrap();

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(3500)))
        .await
        .unwrap();
    let ReconcileOutcome::MixedCreditors { creditors } = outcome else {
        panic!("expected the mixed pending set to be rejected");
    };
    let ids: Vec<i32> = creditors.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![juan.id, zoe.id]);

    // Nothing moved.
    let (juan_after, _) = engine.invoice(juan_invoice.id).await.unwrap();
    assert_eq!(juan_after.pending, Money::new(3000));

    // Naming the creditor reconciles only that creditor's items.
    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(500)).creditor(zoe.id))
        .await
        .unwrap();
    let ReconcileOutcome::Settled(settlement) = outcome else {
        panic!("expected Zoe's item to settle");
    };
    assert_eq!(settlement.payment.receiver_id, zoe.id);

    let (zoe_after, _) = engine.invoice(zoe_invoice.id).await.unwrap();
    assert_eq!(zoe_after.pending, Money::ZERO);
    let (juan_after, _) = engine.invoice(juan_invoice.id).await.unwrap();
    assert_eq!(juan_after.pending, Money::new(3000));
}

#[tokio::test]
async fn items_in_closed_sessions_are_ignored() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;
    let (session, _, _) = seed_debt(&engine, &juan, &pedro, 3000, &[("fondo", 3000)]).await;

    engine
        .close_session(CloseSessionCmd::new(session.id, juan.id))
        .await
        .unwrap();

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(3000)))
        .await
        .unwrap();
    assert!(matches!(outcome, ReconcileOutcome::NothingPending));
}

#[tokio::test]
async fn one_payment_spans_invoices_of_the_same_creditor() {
    let engine = test_engine().await;
    let juan = user(&engine, "+56911111111", "Juan").await;
    let pedro = user(&engine, "+56922222222", "Pedro").await;

    let (_, first_invoice, _) = seed_debt(&engine, &juan, &pedro, 3000, &[("fondo", 3000)]).await;
    let (_, second_invoice, _) = seed_debt(&engine, &juan, &pedro, 2000, &[("postre", 2000)]).await;

    let outcome = engine
        .reconcile_transfer(ReconcileCmd::new(pedro.id, Money::new(5000)))
        .await
        .unwrap();
    let ReconcileOutcome::Settled(settlement) = outcome else {
        panic!("expected a full settlement");
    };
    assert_eq!(settlement.items_paid, 2);

    let (first_after, _) = engine.invoice(first_invoice.id).await.unwrap();
    let (second_after, _) = engine.invoice(second_invoice.id).await.unwrap();
    assert_eq!(first_after.pending, Money::ZERO);
    assert_eq!(second_after.pending, Money::ZERO);
}
