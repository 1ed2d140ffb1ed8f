pub mod prelude;

pub mod bloqueos;
pub mod users;
