pub mod access_unit;
pub mod errors;
pub mod mix_queue;
pub mod segment;
pub mod segmenter;
