pub mod opts;
pub mod pipeline;
pub mod playlist;
pub mod stages;
