use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserFavourite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserFavourite::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserFavourite::UserId).integer().not_null())
                    .col(ColumnDef::new(UserFavourite::EventId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favourite_user_id")
                            .from(UserFavourite::Table, UserFavourite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favourite_event_id")
                            .from(UserFavourite::Table, UserFavourite::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_favourite_user_id_event_id")
                    .table(UserFavourite::Table)
                    .col(UserFavourite::UserId)
                    .col(UserFavourite::EventId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserFavourite::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserFavourite {
    Table,
    Id,
    UserId,
    EventId,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}
