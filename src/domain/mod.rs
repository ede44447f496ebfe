// Domain layer: core models, keyword tables and ports (interfaces).

pub mod model;
pub mod ports;
pub mod tables;
