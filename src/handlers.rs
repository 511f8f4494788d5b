// src/handlers.rs

pub mod auth;
pub mod cadastro;
pub mod convites;
pub mod pagamentos;
pub mod projetos;
