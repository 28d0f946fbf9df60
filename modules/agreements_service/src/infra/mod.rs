//! Infrastructure adapters: database, token verification, auth provider

pub mod auth;
pub mod identity;
pub mod storage;
