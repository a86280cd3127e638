//! Activities module - the append-only timeline of a target and the sink
//! through which the tracking service emits it.

mod activities_model;
mod activities_sink;

pub use activities_model::*;
pub use activities_sink::*;
