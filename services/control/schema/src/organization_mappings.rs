use sea_orm::entity::prelude::*;

/// Control-side replica of a region organization. Written only by the
/// region outbox receiver.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization_mappings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub region_name: String,
    pub date_updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organization_member_mappings::Entity")]
    Members,
}

impl Related<super::organization_member_mappings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
