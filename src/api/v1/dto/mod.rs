pub mod client_assertion;
