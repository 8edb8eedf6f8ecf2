use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One cached Edge response. `tags` holds space-delimited invalidation tags
/// padded with a leading and trailing space.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "m10n_cache")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cid: String,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    pub expire: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
