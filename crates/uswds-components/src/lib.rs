//! uswds Components
//!
//! Accessible UI behaviors attached to existing markup through event
//! delegation. A [`Behavior`] maps event types and selectors to handlers
//! and is bound to any number of roots with `on`/`off`. [`Tooltip`] and
//! [`SortableTable`] are built on it.
//!
//! # Example
//! ```rust,ignore
//! use uswds_components::{Config, Tooltip};
//!
//! let mut doc = uswds_html::parse(r#"<button class="usa-tooltip" title="Hi">B</button>"#);
//! let tooltip = Tooltip::new(&Config::default())?;
//! let body = doc.body();
//! tooltip.on(&mut doc, body)?;
//! ```

mod behavior;
mod config;
mod error;
mod select;
pub mod table;
pub mod tooltip;

pub use behavior::{Behavior, BehaviorBuilder, Handler, Hook};
pub use config::Config;
pub use error::{BehaviorError, TableError};
pub use select::{select, select_compiled};
pub use table::SortableTable;
pub use tooltip::Tooltip;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
