// src/services.rs

pub mod auth;
pub mod cadastro_service;
pub mod convite_service;
pub mod gateway;
pub mod pagamento_service;
pub mod projeto_service;
