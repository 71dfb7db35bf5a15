use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub date_of_birth: Date,
    pub profile_image: Option<String>,
    pub team_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub last_login_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Parsed role; unknown stored values degrade to the least privileged role.
    pub fn role(&self) -> Role {
        Role::from_str(&self.role).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_delete = "SetNull"
    )]
    Team,
    #[sea_orm(has_many = "super::user_favourite::Entity")]
    UserFavourite,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::user_favourite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserFavourite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
