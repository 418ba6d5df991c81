mod backup;
mod validators;

pub use backup::*;
