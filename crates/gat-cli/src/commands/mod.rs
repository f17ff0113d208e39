pub mod audit;
pub mod common;
pub mod optimize;
pub mod simulate;
pub mod status;
pub mod train;
