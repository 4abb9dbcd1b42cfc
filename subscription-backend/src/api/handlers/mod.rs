// src/api/handlers/mod.rs
pub mod subscription_handler;
pub mod system_handler;
