// Core moderation module - the guardian content filter and ban ledger.
// Models first, then the services that use them.

pub mod ban_ledger;
pub mod clock;
pub mod moderation_models;
pub mod moderation_service;
pub mod sanitizer;
pub mod scanner;

pub use ban_ledger::*;
pub use clock::*;
pub use moderation_models::*;
pub use moderation_service::*;
