pub use super::bloqueos::Entity as Bloqueos;
pub use super::users::Entity as Users;
