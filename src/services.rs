pub mod audit;
pub mod auth;
pub mod eligibility;
pub mod export;
pub mod password;
pub mod report_service;
pub mod token;
