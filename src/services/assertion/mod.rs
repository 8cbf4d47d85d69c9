pub mod claims;
pub mod consts;
pub mod digest;
pub mod generator;
pub mod signing_key;
pub mod tracking_evidence;

pub use claims::ComplementaryInfo;
pub use digest::Digest;
pub use generator::{ClientAssertion, ClientAssertionGenerator};
pub use signing_key::SigningContext;
