pub mod handlers;
pub mod intake;
pub mod middleware;
pub mod requesters;
pub mod routes;
pub mod sweep;

pub use routes::create_router;
