//! Effects - side effects declared by the reducer
//!
//! Effects are returned from the reducer and handled by the main loop.
//! This keeps the reducer pure while making async operations explicit.

use crate::geo::Coordinate;

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Resolve the user's position with the configured provider
    Locate,

    /// Fetch the nearest PM2.5 reading; `seq` tags the result
    FetchReading { seq: u64, coordinate: Coordinate },
}
