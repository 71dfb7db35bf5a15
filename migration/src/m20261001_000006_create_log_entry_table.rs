use sea_orm_migration::prelude::*;

/// Creates the append-only `log_entry` audit table.
///
/// `user_id` and `entity_id` are snapshots, not foreign keys: audit rows
/// outlive the users and entities they describe.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum LogEntry {
    Table,
    Id,
    UserId,
    UserRole,
    Action,
    EntityType,
    EntityId,
    EntityName,
    Details,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LogEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LogEntry::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LogEntry::UserId).integer().not_null())
                    .col(ColumnDef::new(LogEntry::UserRole).string_len(20).not_null())
                    .col(ColumnDef::new(LogEntry::Action).string_len(20).not_null())
                    .col(ColumnDef::new(LogEntry::EntityType).string_len(50).not_null())
                    .col(ColumnDef::new(LogEntry::EntityId).integer().not_null())
                    .col(ColumnDef::new(LogEntry::EntityName).string_len(255).not_null())
                    .col(ColumnDef::new(LogEntry::Details).text().not_null())
                    .col(
                        ColumnDef::new(LogEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_log_entry_user_id")
                    .table(LogEntry::Table)
                    .col(LogEntry::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_log_entry_entity_type")
                    .table(LogEntry::Table)
                    .col(LogEntry::EntityType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LogEntry::Table).to_owned())
            .await
    }
}
