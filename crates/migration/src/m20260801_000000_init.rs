//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Cuentas:
//!
//! - `users`: phone-identified participants
//! - `sessions`: group-expense events owned by users
//! - `session_members`: many-to-many session membership
//! - `payment_methods`: "how to pay me" entries per user
//! - `invoices`: ingested receipts with total and unpaid balance
//! - `payments`: settled transfers between users
//! - `items`: billable units of an invoice with partial-payment tracking

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Phone,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Description,
    OwnerId,
    Status,
}

#[derive(Iden)]
enum SessionMembers {
    Table,
    SessionId,
    UserId,
}

#[derive(Iden)]
enum PaymentMethods {
    Table,
    Id,
    UserId,
    Name,
    Description,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    Description,
    TotalCents,
    PendingCents,
    PayerId,
    SessionId,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    PayerId,
    ReceiverId,
    AmountCents,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    InvoiceId,
    Description,
    DebtorId,
    UnitPriceCents,
    TipRateBp,
    TotalCents,
    PaidCents,
    IsPaid,
    PaymentId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-phone-unique")
                    .table(Users::Table)
                    .col(Users::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::Description).string())
                    .col(ColumnDef::new(Sessions::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Sessions::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sessions-owner_id")
                            .from(Sessions::Table, Sessions::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sessions-owner_id-status")
                    .table(Sessions::Table)
                    .col(Sessions::OwnerId)
                    .col(Sessions::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Session members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SessionMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SessionMembers::SessionId).string().not_null())
                    .col(ColumnDef::new(SessionMembers::UserId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(SessionMembers::SessionId)
                            .col(SessionMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-session_members-session_id")
                            .from(SessionMembers::Table, SessionMembers::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-session_members-user_id")
                            .from(SessionMembers::Table, SessionMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-session_members-user_id")
                    .table(SessionMembers::Table)
                    .col(SessionMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payment methods
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentMethods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentMethods::UserId).integer().not_null())
                    .col(ColumnDef::new(PaymentMethods::Name).string().not_null())
                    .col(ColumnDef::new(PaymentMethods::Description).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payment_methods-user_id")
                            .from(PaymentMethods::Table, PaymentMethods::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_methods-user_id")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Invoices
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::Description).string())
                    .col(ColumnDef::new(Invoices::TotalCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invoices::PendingCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::PayerId).integer().not_null())
                    .col(ColumnDef::new(Invoices::SessionId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-payer_id")
                            .from(Invoices::Table, Invoices::PayerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-session_id")
                            .from(Invoices::Table, Invoices::SessionId)
                            .to(Sessions::Table, Sessions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-session_id")
                    .table(Invoices::Table)
                    .col(Invoices::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-payer_id")
                    .table(Invoices::Table)
                    .col(Invoices::PayerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::PayerId).integer().not_null())
                    .col(ColumnDef::new(Payments::ReceiverId).integer().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-payer_id")
                            .from(Payments::Table, Payments::PayerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-receiver_id")
                            .from(Payments::Table, Payments::ReceiverId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::InvoiceId).integer().not_null())
                    .col(ColumnDef::new(Items::Description).string())
                    .col(ColumnDef::new(Items::DebtorId).integer())
                    .col(
                        ColumnDef::new(Items::UnitPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Items::TipRateBp).big_integer().not_null())
                    .col(ColumnDef::new(Items::TotalCents).big_integer().not_null())
                    .col(ColumnDef::new(Items::PaidCents).big_integer().not_null())
                    .col(ColumnDef::new(Items::IsPaid).boolean().not_null())
                    .col(ColumnDef::new(Items::PaymentId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-invoice_id")
                            .from(Items::Table, Items::InvoiceId)
                            .to(Invoices::Table, Invoices::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-debtor_id")
                            .from(Items::Table, Items::DebtorId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-payment_id")
                            .from(Items::Table, Items::PaymentId)
                            .to(Payments::Table, Payments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-invoice_id")
                    .table(Items::Table)
                    .col(Items::InvoiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-debtor_id-is_paid")
                    .table(Items::Table)
                    .col(Items::DebtorId)
                    .col(Items::IsPaid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
