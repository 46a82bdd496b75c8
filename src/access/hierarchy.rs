//! Organization hierarchy resolution

use crate::{error::AppError, repository::OrganizationStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Expands an organization into the organizations whose data it may see.
///
/// Visibility is one hop in each direction: the organization itself, its
/// parent and its direct children. Grandparents and grandchildren are not
/// visible.
#[derive(Clone)]
pub struct OrgHierarchyResolver {
    store: Arc<dyn OrganizationStore>,
}

impl OrgHierarchyResolver {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    /// Organizations visible from `org_id`. Always contains `org_id`.
    pub async fn visible_organizations(&self, org_id: Uuid) -> Result<BTreeSet<Uuid>, AppError> {
        let mut visible = BTreeSet::from([org_id]);

        match self.store.get_by_id(org_id).await? {
            Some(org) => {
                if let Some(parent_id) = org.parent_id {
                    visible.insert(parent_id);
                }
            }
            None => {
                tracing::warn!(organization_id = %org_id, "Resolving visibility for unknown organization");
                return Ok(visible);
            }
        }

        for child in self.store.list_children(org_id).await? {
            visible.insert(child.id);
        }

        tracing::debug!(
            organization_id = %org_id,
            visible = visible.len(),
            "Organization hierarchy resolved"
        );

        Ok(visible)
    }

    /// Organizations that `org_id` administers: itself and its direct children.
    ///
    /// The parent is visible but not administered.
    pub async fn managed_organizations(&self, org_id: Uuid) -> Result<BTreeSet<Uuid>, AppError> {
        let mut managed = BTreeSet::from([org_id]);
        for child in self.store.list_children(org_id).await? {
            managed.insert(child.id);
        }
        Ok(managed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::organization::Organization;
    use crate::repository::MemoryStore;

    /// root → parent → org → child → grandchild, plus a sibling of org
    struct Tree {
        root: Organization,
        parent: Organization,
        org: Organization,
        sibling: Organization,
        child: Organization,
        grandchild: Organization,
    }

    async fn build_tree(store: &MemoryStore) -> Tree {
        let root = Organization::new("root", None);
        let parent = Organization::new("parent", Some(root.id));
        let org = Organization::new("org", Some(parent.id));
        let sibling = Organization::new("sibling", Some(parent.id));
        let child = Organization::new("child", Some(org.id));
        let grandchild = Organization::new("grandchild", Some(child.id));

        for o in [&root, &parent, &org, &sibling, &child, &grandchild] {
            crate::repository::OrganizationStore::insert(store, o).await.unwrap();
        }

        Tree { root, parent, org, sibling, child, grandchild }
    }

    #[tokio::test]
    async fn test_one_hop_each_direction() {
        let store = Arc::new(MemoryStore::new());
        let tree = build_tree(&store).await;
        let resolver = OrgHierarchyResolver::new(store);

        let visible = resolver.visible_organizations(tree.org.id).await.unwrap();
        assert_eq!(visible, BTreeSet::from([tree.org.id, tree.parent.id, tree.child.id]));
    }

    #[tokio::test]
    async fn test_no_transitive_closure() {
        let store = Arc::new(MemoryStore::new());
        let tree = build_tree(&store).await;
        let resolver = OrgHierarchyResolver::new(store);

        let from_org = resolver.visible_organizations(tree.org.id).await.unwrap();
        assert!(!from_org.contains(&tree.root.id));
        assert!(!from_org.contains(&tree.grandchild.id));
        assert!(!from_org.contains(&tree.sibling.id));

        // The parent sees its own children but not their children
        let from_parent = resolver.visible_organizations(tree.parent.id).await.unwrap();
        assert_eq!(
            from_parent,
            BTreeSet::from([tree.parent.id, tree.root.id, tree.org.id, tree.sibling.id])
        );
        assert!(!from_parent.contains(&tree.child.id));
    }

    #[tokio::test]
    async fn test_root_without_parent() {
        let store = Arc::new(MemoryStore::new());
        let tree = build_tree(&store).await;
        let resolver = OrgHierarchyResolver::new(store);

        let visible = resolver.visible_organizations(tree.root.id).await.unwrap();
        assert_eq!(visible, BTreeSet::from([tree.root.id, tree.parent.id]));
    }

    #[tokio::test]
    async fn test_managed_excludes_parent() {
        let store = Arc::new(MemoryStore::new());
        let tree = build_tree(&store).await;
        let resolver = OrgHierarchyResolver::new(store);

        let managed = resolver.managed_organizations(tree.org.id).await.unwrap();
        assert_eq!(managed, BTreeSet::from([tree.org.id, tree.child.id]));
    }

    #[tokio::test]
    async fn test_unknown_organization_contains_itself() {
        let resolver = OrgHierarchyResolver::new(Arc::new(MemoryStore::new()));
        let unknown = Uuid::new_v4();

        let visible = resolver.visible_organizations(unknown).await.unwrap();
        assert_eq!(visible, BTreeSet::from([unknown]));
    }
}
