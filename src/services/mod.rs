pub mod assertion;
pub mod oauth2;
