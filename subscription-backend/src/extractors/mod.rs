pub mod subscription_path;
pub mod validated_json;

pub use subscription_path::SubscriptionPath;
pub use validated_json::ValidatedJson;
