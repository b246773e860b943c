// src/config/mod.rs
pub mod run;
pub mod terms;
