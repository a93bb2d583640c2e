//! Request-scoped extractors shared by handlers.

pub mod ident;
