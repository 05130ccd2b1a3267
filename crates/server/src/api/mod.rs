pub mod arcs;
pub mod catalog;
pub mod handlers;
pub mod images;
pub mod middleware;
pub mod preferences;
pub mod routes;

pub use routes::create_router;
