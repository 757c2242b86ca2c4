/*!
 * Authenticated identity extractor
 *
 * Responsibility:
 * - Hand the gate's `AuthenticatedIdentity` to handlers as a typed value
 *
 * Public API:
 * - Identity
 */

mod core;

pub use self::core::Identity;
