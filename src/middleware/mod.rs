/*
 * Responsibility
 * - Public interface of the middleware layer
 *   - auth::access::apply(...) for role-protected route groups
 *   - http::apply(...) for cross-cutting HTTP concerns
 */
pub mod auth;
pub mod http;
