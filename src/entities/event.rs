use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub location: String,
    pub date: DateTimeWithTimeZone,
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub detail: String,
    pub status: String,
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_team::Entity")]
    EventTeam,
    #[sea_orm(has_many = "super::user_favourite::Entity")]
    UserFavourite,
}

impl Related<super::event_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventTeam.def()
    }
}

impl Related<super::user_favourite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserFavourite.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_team::Relation::Team.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_team::Relation::Event.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
