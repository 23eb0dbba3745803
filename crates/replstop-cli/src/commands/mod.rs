mod status;
mod stop;

pub use status::cmd_status;
pub use stop::cmd_stop;
