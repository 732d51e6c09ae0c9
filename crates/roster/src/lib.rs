//! Deployment roster parsing for the participant registry.
//!
//! A roster lists the participants a deployment registers on a fresh (or
//! existing) registry: the deployer address plus an ordered list of users
//! with their display names and roles. The crate only checks the roster's
//! shape. Address formats, display name rules, and role validity belong to
//! the registry, which reports them per entry at registration time.
//!
//! # Example
//!
//! ```
//! use roster::{Roster, RosterRole};
//!
//! let json = r#"{
//!     "version": 1,
//!     "deployer": "0x32aF180b7F075E4a000041c392aEf5E27B27F910",
//!     "users": [
//!         {"address": "0x32aF180b7F075E4a000041c392aEf5E27B27F910", "displayName": "Roni Manager", "role": 1},
//!         {"address": "0xaD3115B2247b22ce685Fc8711194fE317F2974ce", "displayName": "Bob Customer", "role": "customer"}
//!     ]
//! }"#;
//!
//! let roster = Roster::from_json(json).expect("valid roster");
//! assert_eq!(roster.entries().len(), 2);
//! assert_eq!(roster.entries()[0].role(), &RosterRole::Code(1));
//! ```

mod error;
mod roster;

pub use error::RosterError;
pub use roster::{Roster, RosterEntry, RosterRole, SUPPORTED_VERSION};
