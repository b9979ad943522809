// Users: dashboard profile, photo and progress; admin listing and deletion.

pub mod handlers;
pub mod photos;
pub mod progress;
pub mod store;
