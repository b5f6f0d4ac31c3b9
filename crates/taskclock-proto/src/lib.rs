pub mod daemon;
pub mod signals;

pub use signals::{InboundSignal, OutboundSignal};
