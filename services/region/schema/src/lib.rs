pub mod organization_members;
pub mod organization_slug_reservation_replicas;
pub mod organizations;
pub mod user_replicas;
