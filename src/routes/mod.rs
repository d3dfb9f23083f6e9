pub mod compare;
pub mod health;
pub mod metrics;
pub mod submissions;
