pub mod availability_service;
pub mod dispatch_service;
pub mod email_config_service;
pub mod lead_service;
