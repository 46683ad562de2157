pub mod repository;
pub mod statistics_service;
