// src/handlers/mod.rs

pub mod auth;
pub mod exam;
pub mod extract;
pub mod files;
pub mod game;
pub mod group;
pub mod item;
