//! External service integrations.

pub mod survey_client {
    pub use crate::survey_client::*;
}

pub mod dispatcher {
    pub use crate::dispatcher::*;
}

pub mod checkpoint {
    pub use crate::checkpoint::*;
}
