//! Gated variant reveal with idempotent per-session records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use play_core::{ArtifactId, SessionId, VariantId, VariantVisibility};

use crate::store::{self, RevealStore, VariantStore};

/// Decides which dependent variants become visible when an artifact unlocks.
///
/// Reveal records are keyed uniquely on (session, variant), so invoking the
/// gate twice (a retried request, a duplicate success) can never
/// double-reveal. Only the ids newly revealed by the current call are
/// returned.
pub struct RevealGate {
    variants: Arc<dyn VariantStore>,
    reveals: Arc<dyn RevealStore>,
}

impl RevealGate {
    pub fn new(variants: Arc<dyn VariantStore>, reveals: Arc<dyn RevealStore>) -> Self {
        Self { variants, reveals }
    }

    /// Reveal every not-yet-revealed public variant of `artifact` for
    /// `session`. Role-restricted variants stay gated behind their own
    /// access rules and are never auto-revealed here.
    pub async fn reveal_public(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
        at: DateTime<Utc>,
    ) -> store::Result<Vec<VariantId>> {
        let mut newly_revealed = Vec::new();

        for variant in self.variants.variants_of(artifact).await? {
            if variant.visibility != VariantVisibility::Public {
                continue;
            }
            if self.reveals.insert_if_absent(session, &variant.id, at).await? {
                newly_revealed.push(variant.id);
            }
        }

        Ok(newly_revealed)
    }
}
