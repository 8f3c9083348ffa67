pub mod featured;
pub mod ranking;
pub mod samples;
pub mod search;
