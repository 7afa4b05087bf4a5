//! User aggregate
//!
//! Contains the User entity, the acting identity and registration DTO.

pub mod model;

mod dto_create;

pub use model::{normalize_user_id, Actor, User, UserId, UserRole};

pub use dto_create::RegisterClientDto;
