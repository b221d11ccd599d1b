use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, TransactionTrait, sea_query::OnConflict,
};

use silo_control_schema::{
    organization_mappings, organization_member_mappings, organization_slug_reservations, users,
};
use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::payload::SlugReservationType;
use silo_outbox::{NewOutbox, OutboxError, OutboxTable, write_outboxes};

use crate::domain::repository::{
    MappingRepository, OutboxWriter, SlugReservationRepository, UserRepository,
};
use crate::domain::types::{MemberMapping, OrganizationMapping, SlugReservation, User};
use crate::error::ControlServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ControlServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn update_with_outbox(
        &self,
        user: &User,
        outboxes: &[NewOutbox],
    ) -> Result<(), ControlServiceError> {
        self.db
            .transaction::<_, (), OutboxError>(|txn| {
                let user = user.clone();
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id.0),
                        email: Set(user.email),
                        name: Set(user.name),
                        date_updated: Set(user.date_updated),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    write_outboxes(txn, OutboxTable::Control, &outboxes, Utc::now()).await
                })
            })
            .await
            .context("update user with outbox")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId(model.id),
        email: model.email,
        name: model.name,
        date_added: model.date_added,
        date_updated: model.date_updated,
    }
}

// ── Mapping repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMappingRepository {
    pub db: DatabaseConnection,
}

impl MappingRepository for DbMappingRepository {
    async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<OrganizationMapping>, ControlServiceError> {
        let model = organization_mappings::Entity::find()
            .filter(organization_mappings::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find organization mapping by slug")?;
        Ok(model.map(mapping_from_model))
    }

    async fn upsert_organization(
        &self,
        mapping: &OrganizationMapping,
    ) -> Result<(), ControlServiceError> {
        upsert_mapping(&self.db, mapping)
            .await
            .context("upsert organization mapping")?;
        Ok(())
    }

    async fn delete_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(), ControlServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    organization_member_mappings::Entity::delete_many()
                        .filter(
                            organization_member_mappings::Column::OrganizationId
                                .eq(organization_id.0),
                        )
                        .exec(txn)
                        .await?;
                    organization_mappings::Entity::delete_by_id(organization_id.0)
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .context("delete organization mapping")?;
        Ok(())
    }

    async fn upsert_member(&self, member: &MemberMapping) -> Result<(), ControlServiceError> {
        upsert_member(&self.db, member)
            .await
            .context("upsert member mapping")?;
        Ok(())
    }

    async fn delete_member(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<(), ControlServiceError> {
        organization_member_mappings::Entity::delete_by_id((organization_id.0, user_id.0))
            .exec(&self.db)
            .await
            .context("delete member mapping")?;
        Ok(())
    }

    async fn apply_provision(
        &self,
        mapping: &OrganizationMapping,
        owner: &MemberMapping,
    ) -> Result<(), ControlServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let mapping = mapping.clone();
                let owner = owner.clone();
                Box::pin(async move {
                    upsert_mapping(txn, &mapping).await?;
                    upsert_member(txn, &owner).await
                })
            })
            .await
            .context("apply organization provision")?;
        Ok(())
    }
}

async fn upsert_mapping<C: ConnectionTrait>(
    conn: &C,
    mapping: &OrganizationMapping,
) -> Result<(), sea_orm::DbErr> {
    organization_mappings::Entity::insert(organization_mappings::ActiveModel {
        organization_id: Set(mapping.organization_id.0),
        slug: Set(mapping.slug.clone()),
        name: Set(mapping.name.clone()),
        region_name: Set(mapping.region_name.clone()),
        date_updated: Set(mapping.date_updated),
    })
    .on_conflict(
        OnConflict::column(organization_mappings::Column::OrganizationId)
            .update_columns([
                organization_mappings::Column::Slug,
                organization_mappings::Column::Name,
                organization_mappings::Column::RegionName,
                organization_mappings::Column::DateUpdated,
            ])
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

async fn upsert_member<C: ConnectionTrait>(
    conn: &C,
    member: &MemberMapping,
) -> Result<(), sea_orm::DbErr> {
    organization_member_mappings::Entity::insert(organization_member_mappings::ActiveModel {
        organization_id: Set(member.organization_id.0),
        user_id: Set(member.user_id.0),
        role: Set(member.role.clone()),
        date_updated: Set(member.date_updated),
    })
    .on_conflict(
        OnConflict::columns([
            organization_member_mappings::Column::OrganizationId,
            organization_member_mappings::Column::UserId,
        ])
        .update_columns([
            organization_member_mappings::Column::Role,
            organization_member_mappings::Column::DateUpdated,
        ])
        .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

fn mapping_from_model(model: organization_mappings::Model) -> OrganizationMapping {
    OrganizationMapping {
        organization_id: OrganizationId(model.organization_id),
        slug: model.slug,
        name: model.name,
        region_name: model.region_name,
        date_updated: model.date_updated,
    }
}

// ── Slug reservation repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSlugReservationRepository {
    pub db: DatabaseConnection,
}

impl SlugReservationRepository for DbSlugReservationRepository {
    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<SlugReservation>, ControlServiceError> {
        let model = organization_slug_reservations::Entity::find()
            .filter(organization_slug_reservations::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find slug reservation")?;
        model.map(reservation_from_model).transpose()
    }

    async fn find_by_request(
        &self,
        user_id: UserId,
        requested_slug: &str,
        region_name: &str,
    ) -> Result<Option<SlugReservation>, ControlServiceError> {
        let model = organization_slug_reservations::Entity::find()
            .filter(organization_slug_reservations::Column::UserId.eq(user_id.0))
            .filter(organization_slug_reservations::Column::RequestedSlug.eq(requested_slug))
            .filter(organization_slug_reservations::Column::RegionName.eq(region_name))
            .one(&self.db)
            .await
            .context("find slug reservation by request")?;
        model.map(reservation_from_model).transpose()
    }

    async fn insert_if_absent_with_outbox(
        &self,
        reservation: &SlugReservation,
        outboxes: &[NewOutbox],
    ) -> Result<bool, ControlServiceError> {
        let inserted = self
            .db
            .transaction::<_, bool, OutboxError>(|txn| {
                let reservation = reservation.clone();
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    // The unique slug and request indexes arbitrate concurrent
                    // inserts; either conflict leaves the row out.
                    let rows = organization_slug_reservations::Entity::insert(
                        organization_slug_reservations::ActiveModel {
                            id: Set(reservation.id.0),
                            slug: Set(reservation.slug),
                            requested_slug: Set(reservation.requested_slug),
                            organization_id: Set(reservation.organization_id.0),
                            user_id: Set(reservation.user_id.0),
                            region_name: Set(reservation.region_name),
                            reservation_type: Set(reservation.reservation_type.as_i16()),
                            date_added: Set(reservation.date_added),
                        },
                    )
                    .on_conflict(OnConflict::new().do_nothing().to_owned())
                    .exec_without_returning(txn)
                    .await?;
                    if rows == 0 {
                        return Ok(false);
                    }
                    write_outboxes(txn, OutboxTable::Control, &outboxes, Utc::now()).await?;
                    Ok(true)
                })
            })
            .await
            .context("insert slug reservation with outbox")?;
        Ok(inserted)
    }

    async fn delete_with_outbox(
        &self,
        reservation: &SlugReservation,
        outboxes: &[NewOutbox],
    ) -> Result<bool, ControlServiceError> {
        let deleted = self
            .db
            .transaction::<_, bool, OutboxError>(|txn| {
                let id = reservation.id.0;
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    let result = organization_slug_reservations::Entity::delete_by_id(id)
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    write_outboxes(txn, OutboxTable::Control, &outboxes, Utc::now()).await?;
                    Ok(true)
                })
            })
            .await
            .context("delete slug reservation with outbox")?;
        Ok(deleted)
    }
}

fn reservation_from_model(
    model: organization_slug_reservations::Model,
) -> Result<SlugReservation, ControlServiceError> {
    let reservation_type = SlugReservationType::from_i16(model.reservation_type)
        .with_context(|| format!("unknown reservation type {}", model.reservation_type))?;
    Ok(SlugReservation {
        id: SlugReservationId(model.id),
        slug: model.slug,
        requested_slug: model.requested_slug,
        organization_id: OrganizationId(model.organization_id),
        user_id: UserId(model.user_id),
        region_name: model.region_name,
        reservation_type,
        date_added: model.date_added,
    })
}

// ── Outbox writer ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxWriter {
    pub db: DatabaseConnection,
}

impl OutboxWriter for DbOutboxWriter {
    async fn write(&self, outboxes: &[NewOutbox]) -> Result<(), ControlServiceError> {
        self.db
            .transaction::<_, (), OutboxError>(|txn| {
                let outboxes = outboxes.to_vec();
                Box::pin(async move {
                    write_outboxes(txn, OutboxTable::Control, &outboxes, Utc::now()).await
                })
            })
            .await
            .context("write control outboxes")?;
        Ok(())
    }
}
