mod connect;
pub mod control;
mod error;
pub mod position;
pub mod queries;
mod replica;
pub mod status;

pub use connect::{connect_mysql, ConnectOptions};
pub use replica::MySqlReplica;
