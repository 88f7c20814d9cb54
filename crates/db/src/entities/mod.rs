//! `SeaORM` entities.

pub mod files;
