/*
 * Responsibility
 * - Public surface of v1 (routes() re-export, handlers/extractors for tests)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
