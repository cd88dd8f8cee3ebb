pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod roles;

pub use claims::{Claims, TokenKind};
pub use codec::{IssuedPair, IssuedToken, TokenCodec};
pub use config::JwtConfig;
pub use error::{AuthError, AuthResult};
pub use extractors::{parse_bearer, AuthContext};
pub use gate::{Access, Admission, MethodTable, MethodTableBuilder, RequestGate};
pub use roles::{Role, UnknownRole, ROLE_ADMIN, ROLE_USER};
