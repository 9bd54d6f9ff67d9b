pub mod delete;
pub mod gateway;
pub mod list;
pub mod put;
pub mod read;

pub use delete::delete_action;
pub use gateway::gateway_handler;
pub use list::list_action;
pub use put::put_action;
pub use read::read_action;
