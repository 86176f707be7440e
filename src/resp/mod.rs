pub mod ack;
pub mod jwt;
pub mod problem;
