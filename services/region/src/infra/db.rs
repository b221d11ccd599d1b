use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait, sea_query::OnConflict,
};

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::payload::SlugReservationType;
use silo_outbox::{NewOutbox, OutboxError, OutboxTable, write_outboxes};
use silo_region_schema::{
    organization_members, organization_slug_reservation_replicas, organizations, user_replicas,
};

use crate::domain::repository::{MemberRepository, OrganizationRepository, ReplicaRepository};
use crate::domain::types::{Member, Organization, SlugReservationReplica, UserReplica};
use crate::error::RegionServiceError;

// ── Organization repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrganizationRepository {
    pub db: DatabaseConnection,
}

impl OrganizationRepository for DbOrganizationRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, RegionServiceError> {
        let model = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find organization by slug")?;
        Ok(model.map(organization_from_model))
    }

    async fn update_with_outbox(
        &self,
        organization: &Organization,
        outboxes: &[NewOutbox],
    ) -> Result<(), RegionServiceError> {
        self.db
            .transaction::<_, (), OutboxError>(|txn| {
                let organization = organization.clone();
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    organizations::ActiveModel {
                        id: Set(organization.id.0),
                        name: Set(organization.name),
                        date_updated: Set(organization.date_updated),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    write_outboxes(txn, OutboxTable::Region, &outboxes, Utc::now()).await
                })
            })
            .await
            .context("update organization with outbox")?;
        Ok(())
    }

    async fn create_with_owner_and_outbox(
        &self,
        organization: &Organization,
        owner: &Member,
        outboxes: &[NewOutbox],
    ) -> Result<bool, RegionServiceError> {
        let created = self
            .db
            .transaction::<_, bool, OutboxError>(|txn| {
                let organization = organization.clone();
                let owner = owner.clone();
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    let rows = organizations::Entity::insert(organizations::ActiveModel {
                        id: Set(organization.id.0),
                        slug: Set(organization.slug),
                        name: Set(organization.name),
                        date_added: Set(organization.date_added),
                        date_updated: Set(organization.date_updated),
                    })
                    .on_conflict(
                        OnConflict::column(organizations::Column::Id)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    if rows == 0 {
                        return Ok(false);
                    }
                    organization_members::Entity::insert(organization_members::ActiveModel {
                        organization_id: Set(owner.organization_id.0),
                        user_id: Set(owner.user_id.0),
                        role: Set(owner.role),
                        date_added: Set(owner.date_added),
                    })
                    .on_conflict(
                        OnConflict::columns([
                            organization_members::Column::OrganizationId,
                            organization_members::Column::UserId,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    write_outboxes(txn, OutboxTable::Region, &outboxes, Utc::now()).await?;
                    Ok(true)
                })
            })
            .await
            .context("create organization with outbox")?;
        Ok(created)
    }
}

fn organization_from_model(model: organizations::Model) -> Organization {
    Organization {
        id: OrganizationId(model.id),
        slug: model.slug,
        name: model.name,
        date_added: model.date_added,
        date_updated: model.date_updated,
    }
}

// ── Member repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMemberRepository {
    pub db: DatabaseConnection,
}

impl MemberRepository for DbMemberRepository {
    async fn find(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<Member>, RegionServiceError> {
        let model = organization_members::Entity::find_by_id((organization_id.0, user_id.0))
            .one(&self.db)
            .await
            .context("find organization member")?;
        Ok(model.map(member_from_model))
    }

    async fn upsert_with_outbox(
        &self,
        member: &Member,
        outboxes: &[NewOutbox],
    ) -> Result<(), RegionServiceError> {
        self.db
            .transaction::<_, (), OutboxError>(|txn| {
                let member = member.clone();
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    organization_members::Entity::insert(organization_members::ActiveModel {
                        organization_id: Set(member.organization_id.0),
                        user_id: Set(member.user_id.0),
                        role: Set(member.role),
                        date_added: Set(member.date_added),
                    })
                    .on_conflict(
                        OnConflict::columns([
                            organization_members::Column::OrganizationId,
                            organization_members::Column::UserId,
                        ])
                        .update_column(organization_members::Column::Role)
                        .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    write_outboxes(txn, OutboxTable::Region, &outboxes, Utc::now()).await
                })
            })
            .await
            .context("upsert member with outbox")?;
        Ok(())
    }

    async fn delete_with_outbox(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        outboxes: &[NewOutbox],
    ) -> Result<bool, RegionServiceError> {
        let deleted = self
            .db
            .transaction::<_, bool, OutboxError>(|txn| {
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    let result = organization_members::Entity::delete_by_id((
                        organization_id.0,
                        user_id.0,
                    ))
                    .exec(txn)
                    .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    write_outboxes(txn, OutboxTable::Region, &outboxes, Utc::now()).await?;
                    Ok(true)
                })
            })
            .await
            .context("delete member with outbox")?;
        Ok(deleted)
    }
}

fn member_from_model(model: organization_members::Model) -> Member {
    Member {
        organization_id: OrganizationId(model.organization_id),
        user_id: UserId(model.user_id),
        role: model.role,
        date_added: model.date_added,
    }
}

// ── Replica repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReplicaRepository {
    pub db: DatabaseConnection,
}

impl ReplicaRepository for DbReplicaRepository {
    async fn upsert_user(&self, user: &UserReplica) -> Result<(), RegionServiceError> {
        user_replicas::Entity::insert(user_replicas::ActiveModel {
            user_id: Set(user.user_id.0),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            date_updated: Set(user.date_updated),
        })
        .on_conflict(
            OnConflict::column(user_replicas::Column::UserId)
                .update_columns([
                    user_replicas::Column::Email,
                    user_replicas::Column::Name,
                    user_replicas::Column::DateUpdated,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("upsert user replica")?;
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), RegionServiceError> {
        user_replicas::Entity::delete_by_id(user_id.0)
            .exec(&self.db)
            .await
            .context("delete user replica")?;
        Ok(())
    }

    async fn upsert_slug_reservation(
        &self,
        reservation: &SlugReservationReplica,
    ) -> Result<(), RegionServiceError> {
        organization_slug_reservation_replicas::Entity::insert(
            organization_slug_reservation_replicas::ActiveModel {
                reservation_id: Set(reservation.reservation_id.0),
                slug: Set(reservation.slug.clone()),
                organization_id: Set(reservation.organization_id.0),
                user_id: Set(reservation.user_id.0),
                region_name: Set(reservation.region_name.clone()),
                reservation_type: Set(reservation.reservation_type.as_i16()),
                date_updated: Set(reservation.date_updated),
            },
        )
        .on_conflict(
            OnConflict::column(organization_slug_reservation_replicas::Column::ReservationId)
                .update_columns([
                    organization_slug_reservation_replicas::Column::Slug,
                    organization_slug_reservation_replicas::Column::OrganizationId,
                    organization_slug_reservation_replicas::Column::UserId,
                    organization_slug_reservation_replicas::Column::RegionName,
                    organization_slug_reservation_replicas::Column::ReservationType,
                    organization_slug_reservation_replicas::Column::DateUpdated,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("upsert slug reservation replica")?;
        Ok(())
    }

    async fn delete_slug_reservation(
        &self,
        reservation_id: SlugReservationId,
    ) -> Result<(), RegionServiceError> {
        organization_slug_reservation_replicas::Entity::delete_by_id(reservation_id.0)
            .exec(&self.db)
            .await
            .context("delete slug reservation replica")?;
        Ok(())
    }

    async fn find_slug_reservation(
        &self,
        slug: &str,
    ) -> Result<Option<SlugReservationReplica>, RegionServiceError> {
        let model = organization_slug_reservation_replicas::Entity::find()
            .filter(organization_slug_reservation_replicas::Column::Slug.eq(slug))
            .order_by_desc(organization_slug_reservation_replicas::Column::DateUpdated)
            .one(&self.db)
            .await
            .context("find slug reservation replica")?;
        model.map(replica_from_model).transpose()
    }
}

fn replica_from_model(
    model: organization_slug_reservation_replicas::Model,
) -> Result<SlugReservationReplica, RegionServiceError> {
    let reservation_type = SlugReservationType::from_i16(model.reservation_type)
        .with_context(|| format!("unknown reservation type {}", model.reservation_type))?;
    Ok(SlugReservationReplica {
        reservation_id: SlugReservationId(model.reservation_id),
        slug: model.slug,
        organization_id: OrganizationId(model.organization_id),
        user_id: UserId(model.user_id),
        region_name: model.region_name,
        reservation_type,
        date_updated: model.date_updated,
    })
}
