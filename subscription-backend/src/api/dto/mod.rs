// src/api/dto/mod.rs
pub mod subscription_dto;
