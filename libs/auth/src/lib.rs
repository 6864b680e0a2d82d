pub use credentials::BasicCredentials;
pub use password::{hash_password, verify_password};
pub use principal::AuthPrincipal;

mod credentials;
mod password;
mod principal;
