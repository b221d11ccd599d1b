use chrono::Utc;

use silo_domain::id::UserId;
use silo_outbox::{OutboxProducer, RegionResolver};

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ControlServiceError;

pub struct UpdateUserInput {
    pub user_id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Update a user and replicate it to every region it belongs to.
pub struct UpdateUserUseCase<U, R>
where
    U: UserRepository,
    R: RegionResolver,
{
    pub users: U,
    pub resolver: R,
}

impl<U, R> UpdateUserUseCase<U, R>
where
    U: UserRepository,
    R: RegionResolver,
{
    pub async fn execute(&self, input: UpdateUserInput) -> Result<User, ControlServiceError> {
        let mut user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(ControlServiceError::UserNotFound)?;

        if let Some(email) = input.email {
            user.email = email;
        }
        if let Some(name) = input.name {
            user.name = name;
        }
        user.date_updated = Utc::now();

        let outboxes = user.control_outboxes_for_update(&self.resolver).await?;
        self.users.update_with_outbox(&user, &outboxes).await?;
        Ok(user)
    }
}
