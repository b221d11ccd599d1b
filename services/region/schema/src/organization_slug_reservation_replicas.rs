use sea_orm::entity::prelude::*;

/// Region-local copy of a control slug reservation, keyed by the control
/// reservation id. The slug is indexed but not unique: a release and a new
/// reservation of the same slug may be applied in either order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization_slug_reservation_replicas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub reservation_id: i64,
    pub slug: String,
    pub organization_id: i64,
    pub user_id: i64,
    pub region_name: String,
    pub reservation_type: i16,
    pub date_updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
