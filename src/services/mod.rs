pub mod admin_service;
pub mod auth_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod image_service;
pub mod payment_service;
