pub mod claims;
pub mod clock;
#[cfg(test)]
pub(crate) mod testing;

pub use claims::{ClaimsError, Role, Session, TokenClaims, decode_session};
pub use clock::{Clock, FixedClock, SystemClock};
