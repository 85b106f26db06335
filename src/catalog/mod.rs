pub mod client;
pub mod credentials;
pub mod login;
pub mod traits;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::*;
pub use credentials::*;
pub use login::*;
pub use traits::*;
pub use transport::*;
