pub mod client_assertion;
pub mod health;
