pub mod backends;
pub mod parsers;
pub mod terraform;
