//! Learner-progress engine.
//!
//! The ledger applies activities to a learner's profile and publishes the
//! resulting celebrations on the event bus.

pub mod ledger;
