pub mod color;
pub mod etl;
pub mod extractor;
pub mod html;
pub mod pipeline;
pub mod rules;
pub mod walker;

pub use crate::domain::model::{Harvest, TransformResult};
pub use crate::domain::ports::{Fetcher, LunarOracle, Pipeline, Storage};
pub use crate::utils::error::Result;
