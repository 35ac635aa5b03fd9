// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod desk;
pub mod filter;
pub mod format;
pub mod gateway;
pub mod groups;
pub mod ids;
pub mod model;
pub mod rules;
pub mod selection;
pub mod session;
pub mod state;

pub use desk::*;
pub use filter::*;
pub use gateway::*;
pub use groups::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use session::*;
pub use state::*;
