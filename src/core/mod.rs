// Domain-layer modules and shared errors/models
pub mod preparer {
    pub use crate::preparer::*;
}

pub mod formatter {
    pub use crate::formatter::*;
}

pub mod pipeline {
    pub use crate::pipeline::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
