//! Signal Collector: the viewer-derived sets every downstream exclusion
//! filter is built from.

use std::collections::HashSet;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::store::GraphStore;

/// The viewer's reach through the graph: who they follow, and whose content
/// they already see.
#[derive(Debug, Clone)]
pub struct ViewerScope {
    pub viewer_id: Uuid,
    /// Distinct users the viewer follows. Never contains the viewer, even if
    /// a self-follow edge exists upstream.
    pub followees: HashSet<Uuid>,
    /// `followees` plus the viewer - the owners of content the viewer
    /// already has access to.
    pub circle: HashSet<Uuid>,
}

impl ViewerScope {
    pub async fn collect<S: GraphStore + ?Sized>(
        store: &S,
        viewer_id: Uuid,
    ) -> ServiceResult<Self> {
        let mut followees: HashSet<Uuid> =
            store.followee_ids(viewer_id).await?.into_iter().collect();
        // a self-follow edge must not make the viewer their own candidate
        followees.remove(&viewer_id);

        let mut circle = followees.clone();
        circle.insert(viewer_id);

        Ok(Self {
            viewer_id,
            followees,
            circle,
        })
    }

    /// Ids of posts authored by the viewer or their followees. Fetched on
    /// demand; only the operations that filter on it pay for it.
    pub async fn owned_post_ids<S: GraphStore + ?Sized>(
        &self,
        store: &S,
    ) -> ServiceResult<HashSet<Uuid>> {
        let owners = self.owner_ids();
        Ok(store
            .post_ids_by_owners(&owners)
            .await?
            .into_iter()
            .collect())
    }

    pub fn followee_ids(&self) -> Vec<Uuid> {
        self.followees.iter().copied().collect()
    }

    pub fn owner_ids(&self) -> Vec<Uuid> {
        self.circle.iter().copied().collect()
    }
}
