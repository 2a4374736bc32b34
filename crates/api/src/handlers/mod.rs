pub mod assistant;
pub mod coupons;
pub mod customers;
pub mod events;
pub mod files;
pub mod library;
pub mod messages;
pub mod notes;
pub mod pro_tips;
pub mod reports;
pub mod sync;
pub mod tasks;
