pub mod organization_mappings;
pub mod organization_member_mappings;
pub mod organization_slug_reservations;
pub mod users;
