pub mod health_check;
pub mod members;
pub mod session;
pub mod site;
pub mod subscriptions;
