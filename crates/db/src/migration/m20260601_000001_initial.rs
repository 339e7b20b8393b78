//! Initial database migration.
//!
//! Creates the core tables: users, transactions, rules, savings_ledger,
//! goals, goal_progress, recommendations. The unique index on
//! `transactions.dedup_token` is what makes the composite write operation
//! idempotent under redelivery.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    TotalSaved,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    Amount,
    Currency,
    Merchant,
    CategoryRaw,
    CategoryNormalized,
    OccurredAt,
    Source,
    DedupToken,
    CreatedAt,
}

#[derive(Iden)]
enum Rules {
    Table,
    Id,
    UserId,
    Name,
    IsActive,
    Config,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SavingsLedger {
    Table,
    Id,
    UserId,
    TransactionId,
    RuleName,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    UserId,
    Name,
    TargetAmount,
    CurrentAmount,
    Deadline,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum GoalProgress {
    Table,
    Id,
    GoalId,
    TransactionId,
    AmountAdded,
    CreatedAt,
}

#[derive(Iden)]
enum Recommendations {
    Table,
    Id,
    UserId,
    Title,
    Message,
    Category,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(
                        ColumnDef::new(Users::TotalSaved)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Currency).string().not_null())
                    .col(ColumnDef::new(Transactions::Merchant).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CategoryRaw)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CategoryNormalized)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Source).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::DedupToken)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-transactions-dedup_token")
                    .table(Transactions::Table)
                    .col(Transactions::DedupToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rules::UserId).uuid().not_null())
                    .col(ColumnDef::new(Rules::Name).string().not_null())
                    .col(ColumnDef::new(Rules::IsActive).boolean().not_null())
                    .col(ColumnDef::new(Rules::Config).json_binary().not_null())
                    .col(
                        ColumnDef::new(Rules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-rules-user_id")
                            .from(Rules::Table, Rules::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-rules-user_id-name")
                    .table(Rules::Table)
                    .col(Rules::UserId)
                    .col(Rules::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavingsLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsLedger::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingsLedger::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(SavingsLedger::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavingsLedger::RuleName).string().not_null())
                    .col(
                        ColumnDef::new(SavingsLedger::Amount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsLedger::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_ledger-user_id")
                            .from(SavingsLedger::Table, SavingsLedger::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_ledger-transaction_id")
                            .from(SavingsLedger::Table, SavingsLedger::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-savings_ledger-transaction_id-rule_name")
                    .table(SavingsLedger::Table)
                    .col(SavingsLedger::TransactionId)
                    .col(SavingsLedger::RuleName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Goals::UserId).uuid().not_null())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(
                        ColumnDef::new(Goals::TargetAmount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Goals::CurrentAmount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Goals::Deadline).date())
                    .col(ColumnDef::new(Goals::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(Goals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goals-user_id")
                            .from(Goals::Table, Goals::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goals-user_id-created_at")
                    .table(Goals::Table)
                    .col(Goals::UserId)
                    .col(Goals::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoalProgress::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoalProgress::GoalId).uuid().not_null())
                    .col(
                        ColumnDef::new(GoalProgress::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalProgress::AmountAdded)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalProgress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_progress-goal_id")
                            .from(GoalProgress::Table, GoalProgress::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_progress-transaction_id")
                            .from(GoalProgress::Table, GoalProgress::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_progress-goal_id")
                    .table(GoalProgress::Table)
                    .col(GoalProgress::GoalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Recommendations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recommendations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recommendations::UserId).uuid().not_null())
                    .col(ColumnDef::new(Recommendations::Title).string().not_null())
                    .col(ColumnDef::new(Recommendations::Message).string().not_null())
                    .col(
                        ColumnDef::new(Recommendations::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recommendations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recommendations-user_id")
                            .from(Recommendations::Table, Recommendations::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recommendations-user_id-created_at")
                    .table(Recommendations::Table)
                    .col(Recommendations::UserId)
                    .col(Recommendations::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recommendations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GoalProgress::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsLedger::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
