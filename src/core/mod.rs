pub mod orchestrator;
pub mod password_gen;
