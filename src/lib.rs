pub mod classifier;
pub mod config;
pub mod description;
pub mod images;
pub mod listing;
pub mod mapper;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod reference;
pub mod store;
pub mod utils;
