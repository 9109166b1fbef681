//! Session token secrets, pairs, and claim sets.

pub mod claims;
pub mod pair;
pub mod secret;
