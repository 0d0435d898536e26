//! Sessions table.
//!
//! A session is a bounded group-expense event: one owner, a member set and a
//! lifecycle of exactly two states. `Closed` is terminal; a session is never
//! reopened and its invoices stay behind as the historical ledger.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Closed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for SessionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::Validation(format!(
                "invalid session status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub description: Option<String>,
    pub owner_id: i32,
    pub status: SessionStatus,
}

impl Session {
    pub fn new(description: Option<String>, owner_id: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            owner_id,
            status: SessionStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: Option<String>,
    pub owner_id: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Owner,
    #[sea_orm(has_many = "super::session_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
}

impl Related<super::session_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Session> for ActiveModel {
    fn from(session: &Session) -> Self {
        Self {
            id: ActiveValue::Set(session.id.to_string()),
            description: ActiveValue::Set(session.description.clone()),
            owner_id: ActiveValue::Set(session.owner_id),
            status: ActiveValue::Set(session.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Session {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("session".to_string()))?,
            description: model.description,
            owner_id: model.owner_id,
            status: SessionStatus::try_from(model.status.as_str())?,
        })
    }
}
