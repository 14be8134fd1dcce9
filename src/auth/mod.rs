mod decorator;
mod material;

pub use decorator::{build_decorator, AuthDecorator};
pub use material::{AuthConfig, AuthError, AuthKind, AuthMaterial};
