pub mod auth;
pub mod cart;
pub mod items;
pub mod orders;
pub mod payments;
