//! Execution orchestration: single-provider runs, multi-provider fan-out and
//! the image path.

mod compare;
mod image;
mod single;

pub use compare::{CompareHandle, MultiModelComparator, ObserverMap};
pub use image::ImageExecutor;
pub use single::{ExecutionHandle, SingleModelExecutor};
