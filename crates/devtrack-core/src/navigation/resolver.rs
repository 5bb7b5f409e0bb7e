use std::sync::Arc;

use tracing::debug;

use crate::facade::DeviationFacade;
use crate::model::Deviation;

/// Pre-fetch the record behind an edit route.
///
/// Without an id this returns `None` and touches nothing. Otherwise it
/// runs `load_one` and hands back the selected record once the call has
/// settled, provided it is the requested one (a failed load leaves an
/// older selection in place, which is not returned).
pub async fn resolve_deviation(
    facade: &DeviationFacade,
    id: Option<&str>,
) -> Option<Arc<Deviation>> {
    let id = id?;
    debug!(id, "resolving deviation");
    facade.load_one(id).await;
    facade.selected().filter(|d| d.id == id)
}
