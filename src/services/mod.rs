pub mod block_service;
pub mod cache;
pub mod compatibility_service;
pub mod eligibility;
pub mod geo;
pub mod matching_service;
pub mod scoring;
pub mod swipe_service;
