// src/models/mod.rs

pub mod extraction;
pub mod key;
pub mod session;
