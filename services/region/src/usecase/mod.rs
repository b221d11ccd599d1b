pub mod apply;
pub mod member;
pub mod organization;
pub mod provision;
pub mod slug;
