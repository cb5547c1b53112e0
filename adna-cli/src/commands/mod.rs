pub mod fingerprint;
pub mod issue;
pub mod revoke;
pub mod stats;
pub mod verify;
