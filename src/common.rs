pub mod clock;
pub mod cpf;
pub mod error;
pub mod payload;
