pub mod account;
pub mod auth;
pub mod definition;
pub mod execute;
pub mod node;

pub use account::*;
pub use auth::*;
pub use definition::*;
pub use execute::*;
pub use node::*;
