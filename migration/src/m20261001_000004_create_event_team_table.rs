use sea_orm_migration::prelude::*;

/// Creates the `event_team` join table.
///
/// The unique index on `(event_id, team_id)` closes the window between the
/// duplicate check and the insert.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventTeam::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventTeam::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventTeam::EventId).integer().not_null())
                    .col(ColumnDef::new(EventTeam::TeamId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_team_event_id")
                            .from(EventTeam::Table, EventTeam::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_team_team_id")
                            .from(EventTeam::Table, EventTeam::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_team_event_id_team_id")
                    .table(EventTeam::Table)
                    .col(EventTeam::EventId)
                    .col(EventTeam::TeamId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Reverse lookup from a team to its events
        manager
            .create_index(
                Index::create()
                    .name("idx_event_team_team_id")
                    .table(EventTeam::Table)
                    .col(EventTeam::TeamId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventTeam::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventTeam {
    Table,
    Id,
    EventId,
    TeamId,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Team {
    Table,
    Id,
}
