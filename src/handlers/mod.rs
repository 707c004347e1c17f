pub mod activities;
pub mod analytics;
pub mod auth;
pub mod health;
pub mod hugs;
pub mod moods;
pub mod streaks;
pub mod ws;
