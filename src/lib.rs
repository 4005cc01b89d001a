// src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod telegram;
