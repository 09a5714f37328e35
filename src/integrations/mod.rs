//! External service integrations.

pub mod voipms {
    pub use crate::balance_client::*;
}

pub mod ip_echo {
    pub use crate::ip_resolver::*;
}
