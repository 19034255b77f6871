//! View trait for per-car snapshot projections

use crate::RaceConfig;
use crate::types::{CarId, RaceSnapshot};

use super::ViewBinding;

/// Two-phase projection of a [`RaceSnapshot`] onto what one consumer needs for one car.
///
/// `bind()` runs once when a consumer subscribes and rejects unknown cars up
/// front; `adapt()` runs for every delivered snapshot and does no lookups beyond
/// indexing the bound car.
pub trait SnapshotView: Sized + Send + 'static {
    /// Validate the subscription against the race configuration.
    ///
    /// The default binding only checks that the car exists; views needing more
    /// static data can override it.
    fn bind(config: &RaceConfig, car: CarId) -> crate::Result<ViewBinding> {
        ViewBinding::new(config, car)
    }

    /// Project one snapshot. `None` if the snapshot does not contain the bound car.
    fn adapt(snapshot: &RaceSnapshot, binding: &ViewBinding) -> Option<Self>;
}
