//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the idle → running → done state machine of one run
//! - `Pacer`: minimum-gap clock used for page visits and image downloads

mod crawl_phase;
mod pacer;

pub use crawl_phase::CrawlPhase;
pub use pacer::Pacer;
