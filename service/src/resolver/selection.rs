use std::sync::Arc;

use domain::model::vo::SelectionResult;

const NO_SELECTORS: &str = "No selectors are configured";

/// Asks each selector in order until one picks a resource among `candidates`.
///
/// Selector errors and picks outside the candidates count as no preference. Returns the last
/// rationale seen when nothing was picked.
pub(super) fn select_in_order<S, T, N, F>(
    job_id: &str,
    selectors: &[Arc<S>],
    candidates: &[T],
    id_of: fn(&T) -> &str,
    name_of: N,
    select: F,
) -> Result<T, String>
where
    S: ?Sized,
    N: Fn(&S) -> &'static str,
    F: Fn(&S) -> anyhow::Result<SelectionResult<T>>,
{
    let mut rationale = NO_SELECTORS.to_owned();

    for selector in selectors.iter().map(|s| &**s) {
        let name = name_of(selector);
        match select(selector) {
            Ok(SelectionResult::Selected {
                resource,
                rationale: why,
            }) => {
                let selected_id = id_of(&resource);
                if candidates.iter().any(|c| id_of(c) == selected_id) {
                    tracing::debug!(
                        job_id = %job_id,
                        selector = name,
                        "Selected {selected_id}: {}",
                        why.as_deref().unwrap_or("no rationale")
                    );
                    return Ok(resource);
                }
                tracing::warn!(
                    job_id = %job_id,
                    selector = name,
                    "Selector chose {selected_id} which isn't a candidate"
                );
                rationale = format!("{name} selected invalid resource {selected_id}");
            }
            Ok(SelectionResult::NoPreference { rationale: why }) => {
                tracing::debug!(job_id = %job_id, selector = name, "No preference");
                rationale = why.unwrap_or_else(|| format!("{name} had no preference"));
            }
            Ok(SelectionResult::Rejected { reason }) => {
                tracing::debug!(job_id = %job_id, selector = name, "Rejected: {reason}");
                rationale = reason;
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, selector = name, "Selector failed: {e:#}");
                rationale = format!("{name} failed: {e}");
            }
        }
    }

    Err(rationale)
}
