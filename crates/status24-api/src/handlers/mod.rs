pub mod admin;
pub mod incidents;
pub mod organizations;
pub mod root;
pub mod services;
pub mod status;
