//! Event Handlers
//!
//! - keyboard: key presses → intents
//!
//! Worker responses and auth events go straight to `servicefinder::update`.

pub mod keyboard;

pub use keyboard::key_to_intent;
