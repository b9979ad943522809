pub mod purchase;
pub mod training;
pub mod user;
