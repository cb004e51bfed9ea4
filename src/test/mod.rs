pub mod utils;

mod scoring;
