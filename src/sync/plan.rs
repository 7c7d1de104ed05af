use reelsync_common::Result;
use reelsync_db::pool::{get_conn, DbPool};
use reelsync_db::queries::documents::apply_intent;
use reelsync_db::update::{Target, UpdateDoc, UpdateIntent};
use tracing::{debug, warn};

/// Intents computed by a routine before any of them is written.
#[derive(Debug, Default)]
pub struct UpdatePlan {
    intents: Vec<UpdateIntent>,
}

/// Result of applying an [`UpdatePlan`].
#[derive(Debug, Default)]
pub struct PlanOutcome {
    /// Intents that changed or created a document.
    pub writes: usize,
    /// Season/episode targets that matched nothing.
    pub unmatched: Vec<Target>,
}

impl UpdatePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an update against an existing target. Empty updates are dropped.
    pub fn push(&mut self, target: Target, update: UpdateDoc) {
        if !update.is_empty() {
            self.intents.push(UpdateIntent::new(target, update));
        }
    }

    /// Queue an update that creates the movie or show when absent.
    pub fn push_upsert(&mut self, target: Target, update: UpdateDoc) {
        if !update.is_empty() {
            self.intents.push(UpdateIntent::upsert(target, update));
        }
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Apply every intent in order.
    ///
    /// Intents are independent; the first database error aborts the rest and
    /// earlier writes stay committed.
    pub fn apply(&self, pool: &DbPool) -> Result<PlanOutcome> {
        let mut outcome = PlanOutcome::default();
        if self.intents.is_empty() {
            return Ok(outcome);
        }

        let conn = get_conn(pool)?;
        for intent in &self.intents {
            let applied = apply_intent(&conn, intent)?;
            debug!(
                target = %intent.target,
                fields = intent.update.len(),
                matched = applied.matched,
                modified = applied.modified,
                upserted = applied.upserted,
                "Applied update"
            );

            if applied.modified || applied.upserted {
                outcome.writes += 1;
            }
            if applied.matched == 0 {
                warn!(target = %intent.target, "Update matched no catalog entry");
                outcome.unmatched.push(intent.target.clone());
            }
        }

        Ok(outcome)
    }
}
