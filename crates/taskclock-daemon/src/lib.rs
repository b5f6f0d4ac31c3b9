pub mod badge;
pub mod bootstrap;
pub mod config;
pub mod countdown_badge;
pub mod daemon;
pub mod dbus_impl;
pub mod event_router;
pub mod hours_aggregator;
pub mod notification_manager;
pub mod notification_policy;
pub mod resume_watch;

pub use countdown_badge::{CountdownBadge, CountdownPhase};
pub use event_router::{EventRouter, RouterCommand};
pub use hours_aggregator::HoursAggregator;
