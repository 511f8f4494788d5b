// src/db.rs

pub mod cadastro_repo;
pub use cadastro_repo::CadastroRepository;
pub mod campanha_repo;
pub use campanha_repo::CampanhaRepository;
pub mod convite_repo;
pub use convite_repo::ConviteRepository;
pub mod pedido_repo;
pub use pedido_repo::PedidoRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod projeto_repo;
pub mod referencia;
pub use projeto_repo::ProjetoRepository;
