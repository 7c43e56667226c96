//! Named-set reconciliation: a pure add/remove diff plus the driver that
//! turns it into remote calls.
//!
//! The diff is computed entirely from names, compared exactly and
//! case-sensitively. The driver resolves every addition by lookup before
//! mutating anything, so a single unresolvable name aborts the pass with
//! zero remote writes, then performs at most one batched add call and at
//! most one batched remove call. Implementations whose remote API has no
//! batch endpoint loop per item inside `add`/`remove`; the abort-before-
//! mutate ordering is preserved either way.

use async_trait::async_trait;

use crate::error::SyncResult;

/// Add/remove split for one named collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedSetDiff {
    /// Claimed names absent from the current set, in claim order, deduped.
    pub to_add: Vec<String>,
    /// Current names absent from the claimed set.
    pub to_remove: Vec<String>,
}

impl NamedSetDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the add/remove split between a claimed name list and the
/// current remote-side names.
#[must_use]
pub fn diff_names(claimed: &[String], current: &[String]) -> NamedSetDiff {
    let mut to_add = Vec::new();
    for name in claimed {
        if !current.contains(name) && !to_add.contains(name) {
            to_add.push(name.clone());
        }
    }

    let to_remove = current
        .iter()
        .filter(|name| !claimed.contains(name))
        .cloned()
        .collect();

    NamedSetDiff { to_add, to_remove }
}

/// Mutation counts from one named-set pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOutcome {
    pub added: usize,
    pub removed: usize,
}

/// Remote operations backing one named collection.
///
/// `resolve` turns a claimed name into the representation the add call
/// needs; `add`/`remove` receive the full batch in one call each.
#[async_trait]
pub trait NamedSetOps: Sync {
    type Item: Send + Sync;

    /// The name an existing item is keyed by.
    fn item_name(item: &Self::Item) -> &str;

    async fn resolve(&self, name: &str) -> SyncResult<Self::Item>;

    async fn add(&self, items: &[Self::Item]) -> SyncResult<()>;

    async fn remove(&self, items: &[Self::Item]) -> SyncResult<()>;
}

/// Converge one named collection toward `claimed`.
///
/// Lookup failures abort before any mutation. An empty diff on both sides
/// makes zero remote calls.
pub async fn reconcile_named_set<O: NamedSetOps>(
    ops: &O,
    claimed: &[String],
    current: Vec<O::Item>,
) -> SyncResult<SetOutcome> {
    let current_names: Vec<String> = current
        .iter()
        .map(|item| O::item_name(item).to_string())
        .collect();
    let diff = diff_names(claimed, &current_names);

    let mut additions = Vec::with_capacity(diff.to_add.len());
    for name in &diff.to_add {
        additions.push(ops.resolve(name).await?);
    }

    let removals: Vec<O::Item> = current
        .into_iter()
        .filter(|item| diff.to_remove.iter().any(|n| n == O::item_name(item)))
        .collect();

    let outcome = SetOutcome {
        added: additions.len(),
        removed: removals.len(),
    };

    if !additions.is_empty() {
        ops.add(&additions).await?;
    }
    if !removals.is_empty() {
        ops.remove(&removals).await?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use idsync_client::RemoteError;
    use std::sync::Mutex;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn diff_splits_add_and_remove() {
        let diff = diff_names(&names(&["a", "b", "c"]), &names(&["b", "d"]));
        assert_eq!(diff.to_add, names(&["a", "c"]));
        assert_eq!(diff.to_remove, names(&["d"]));
    }

    #[test]
    fn diff_of_equal_sets_is_empty() {
        let diff = diff_names(&names(&["a", "b"]), &names(&["a", "b"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn duplicate_claims_collapse() {
        let diff = diff_names(&names(&["a", "a", "b"]), &[]);
        assert_eq!(diff.to_add, names(&["a", "b"]));
    }

    #[test]
    fn names_compare_case_sensitively() {
        let diff = diff_names(&names(&["Admin"]), &names(&["admin"]));
        assert_eq!(diff.to_add, names(&["Admin"]));
        assert_eq!(diff.to_remove, names(&["admin"]));
    }

    /// Records every call so tests can assert ordering and counts.
    struct RecordingOps {
        calls: Mutex<Vec<String>>,
        fail_resolving: Option<String>,
    }

    impl RecordingOps {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_resolving: None,
            }
        }

        fn failing_on(name: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_resolving: Some(name.to_string()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NamedSetOps for RecordingOps {
        type Item = String;

        fn item_name(item: &String) -> &str {
            item
        }

        async fn resolve(&self, name: &str) -> SyncResult<String> {
            self.calls.lock().unwrap().push(format!("resolve:{name}"));
            if self.fail_resolving.as_deref() == Some(name) {
                return Err(SyncError::remote(
                    format!("resolving {name}"),
                    RemoteError::NotFound(name.to_string()),
                ));
            }
            Ok(name.to_string())
        }

        async fn add(&self, items: &[String]) -> SyncResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("add:{}", items.join(",")));
            Ok(())
        }

        async fn remove(&self, items: &[String]) -> SyncResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remove:{}", items.join(",")));
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_diff_makes_no_calls() {
        let ops = RecordingOps::new();
        let outcome = reconcile_named_set(&ops, &names(&["a"]), vec!["a".to_string()])
            .await
            .unwrap();
        assert_eq!(outcome, SetOutcome::default());
        assert!(ops.calls().is_empty());
    }

    #[tokio::test]
    async fn additions_are_batched_into_one_call() {
        let ops = RecordingOps::new();
        let outcome = reconcile_named_set(&ops, &names(&["a", "b", "c"]), vec![])
            .await
            .unwrap();
        assert_eq!(outcome.added, 3);
        assert_eq!(
            ops.calls(),
            vec!["resolve:a", "resolve:b", "resolve:c", "add:a,b,c"]
        );
    }

    #[tokio::test]
    async fn lookup_failure_aborts_before_any_mutation() {
        let ops = RecordingOps::failing_on("b");
        let err = reconcile_named_set(&ops, &names(&["a", "b"]), vec!["stale".to_string()])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        // Both the add and the remove of "stale" must have been skipped.
        assert_eq!(ops.calls(), vec!["resolve:a", "resolve:b"]);
    }

    #[tokio::test]
    async fn removals_are_batched_into_one_call() {
        let ops = RecordingOps::new();
        let outcome = reconcile_named_set(
            &ops,
            &names(&["keep"]),
            vec!["keep".to_string(), "x".to_string(), "y".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(outcome.removed, 2);
        assert_eq!(ops.calls(), vec!["remove:x,y"]);
    }
}
