use sea_orm::entity::prelude::*;

/// Global slug registry. The unique slug index is what makes concurrent
/// provisioning of the same slug converge on one reservation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization_slug_reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    /// Unique together with `user_id` and `region_name`, so one request maps
    /// to one reservation even when an alternate slug was assigned.
    pub requested_slug: String,
    pub organization_id: i64,
    pub user_id: i64,
    pub region_name: String,
    /// `SlugReservationType` wire value.
    pub reservation_type: i16,
    pub date_added: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
