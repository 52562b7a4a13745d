pub mod branch;
pub mod client;
pub mod email_config;
pub mod inn;
pub mod lead;
pub mod outbound;
pub mod package;
pub mod room;
pub mod rule;
pub mod seller;
