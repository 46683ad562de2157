pub mod backup;
pub mod gateway;
pub mod migration;
pub mod store;
