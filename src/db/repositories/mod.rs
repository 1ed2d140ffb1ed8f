pub mod bloqueo;
pub mod user;
