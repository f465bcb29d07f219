pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod equipment;
pub mod order;
pub mod payment;
pub mod produce;
pub mod product;
pub mod transport;
pub mod user;

mod router;
pub use router::get_router;
