pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use token::{Claims, TokenService};

lazy_static! {
    // Word characters only: letters (any script), digits and underscores.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^\w+$").unwrap();
}

/// Form submitted to create an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationForm {
    /// Unique account name, 4 to 25 characters, no whitespace.
    #[validate(
        length(min = 4, max = 25),
        regex(
            path = "USERNAME_REGEX",
            message = "Name may contain only letters, digits and underscores"
        )
    )]
    pub name: String,
    /// Contact address, 6 to 35 characters.
    #[validate(length(min = 6, max = 35), email)]
    pub email: String,
    /// Must not be empty and must equal `confirm`.
    #[validate(
        length(min = 1, message = "Password is required"),
        must_match(other = "confirm", message = "Passwords must match")
    )]
    pub password: String,
    pub confirm: String,
}

/// Form submitted to sign in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 4, max = 25))]
    pub name: String,
    #[validate(length(min = 1))]
    pub password: String,
}
