// src/domain/mod.rs
pub mod subscription;
pub mod subscription_model;

pub use subscription::{PriceRangeQuery, Subscription, SubscriptionChanges};
