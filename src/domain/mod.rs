// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of HTTP concerns

pub mod poll;
pub mod repositories;
pub mod user;
pub mod validation;
