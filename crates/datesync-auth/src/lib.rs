pub mod flow;
pub mod google;
pub mod storage;
pub mod token;

pub use flow::{authenticate, CALLBACK_PORT};
pub use google::{GoogleOAuth2Provider, GoogleTokenResponse};
pub use storage::{SecureStorage, TokenSet};
pub use token::{resolve_access_token, valid_access_token, ACCESS_TOKEN_ENV, GOOGLE_SERVICE};
