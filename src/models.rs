// src/models.rs

pub mod auth;
pub mod campanha;
pub mod convite;
pub mod pedido;
pub mod roles;
