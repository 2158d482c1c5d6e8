//! # Events Module
//!
//! Progress reporting that keeps the pipeline independent of any UI.
//!
//! ## Design
//! The pipeline emits events through a channel; the CLI (or any other
//! front end) listens on the receiving side and renders progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Photo(PhotoEvent::Started { index, total, .. }) = event {
//!             println!("{}/{}", index, total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&library, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
