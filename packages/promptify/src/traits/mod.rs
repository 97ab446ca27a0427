//! Core trait abstractions for the prompt controller.
//!
//! These traits define the collaborators an application plugs in: the remote
//! prompt service, the alert sink, the pacing clock and the image probe.

pub mod alerter;
pub mod client;
pub mod clock;
pub mod probe;
