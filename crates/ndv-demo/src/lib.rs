#![forbid(unsafe_code)]

//! ndv demo: drives an [`ArrayDisplayModel`](ndv_model::ArrayDisplayModel)
//! through a short scripted scenario and prints what its signals report.

pub mod cli;
pub mod logging;
pub mod scenario;
