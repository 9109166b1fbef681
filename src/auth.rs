//! Auth-domain identifiers, account records, and session token models.

pub mod account;
pub mod id;
pub mod token;

pub use account::*;
pub use id::*;
pub use token::{claims::*, pair::*, secret::*};
