//! Full-order (offline) and reduced (online) time integration drivers.

pub mod offline;
pub mod online;

pub use offline::{FullOrderSolver, SwirlInitialCondition};
pub use online::ReducedOnlineSolver;
