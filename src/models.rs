pub mod auth;
pub mod delivery;
pub mod equipment;
pub mod reports;
pub mod settings;
pub mod social;
pub mod street;
pub mod visit;
