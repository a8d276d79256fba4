#![allow(dead_code)]

pub mod mock_sources;
pub mod test_data_builder;
