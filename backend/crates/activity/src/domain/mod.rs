//! Domain Layer

pub mod actions;
pub mod entity;
pub mod kind;
pub mod repository;
