pub mod analytics;
pub mod milestones;
pub mod streaks;
pub mod wellness;
