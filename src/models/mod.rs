pub mod activity;
pub mod hug;
pub mod mood;
pub mod reward;
pub mod streak;
pub mod user;
