use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};

use silo_control_schema::{organization_mappings, organization_member_mappings};
use silo_domain::outbox::OutboxScope;
use silo_outbox::{OutboxError, RegionResolver};

/// Resolves destinations from the control-side organization replicas.
///
/// A user lives in every region holding an organization it belongs to; an
/// organization lives in its mapped region.
#[derive(Clone)]
pub struct DbRegionResolver {
    pub db: DatabaseConnection,
}

impl RegionResolver for DbRegionResolver {
    async fn regions_for(
        &self,
        scope: OutboxScope,
        shard_identifier: i64,
    ) -> Result<Vec<String>, OutboxError> {
        let regions = match scope {
            OutboxScope::User => {
                organization_mappings::Entity::find()
                    .select_only()
                    .column(organization_mappings::Column::RegionName)
                    .distinct()
                    .join(
                        JoinType::InnerJoin,
                        organization_mappings::Relation::Members.def(),
                    )
                    .filter(organization_member_mappings::Column::UserId.eq(shard_identifier))
                    .into_tuple::<String>()
                    .all(&self.db)
                    .await?
            }
            OutboxScope::Organization => {
                organization_mappings::Entity::find_by_id(shard_identifier)
                    .select_only()
                    .column(organization_mappings::Column::RegionName)
                    .into_tuple::<String>()
                    .all(&self.db)
                    .await?
            }
            OutboxScope::Webhook => return Err(OutboxError::UnresolvableScope(scope)),
        };
        Ok(regions)
    }
}
