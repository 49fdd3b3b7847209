//! Cache key generators for consistent key naming.
//!
//! Layout is `<namespace>_list:<scope>` for list results and
//! `<namespace>:<id>` for single records, e.g. `task_list:a@x.com`,
//! `task_list:all`, `permission_list:a@x.com`, `task:42`.

use tasktrack_core::{Collection, Scope};

/// Key holding the cached list for a scope.
///
/// Paginated and unpaginated reads share this key, so whichever populates it
/// first is what the other reads back until expiry or invalidation.
#[must_use]
pub fn list_key(collection: Collection, scope: &Scope) -> String {
    format!("{}_list:{}", collection.cache_namespace(), scope)
}

/// Key holding the cached record for an id.
#[must_use]
pub fn record_key(collection: Collection, id: &str) -> String {
    format!("{}:{}", collection.cache_namespace(), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keys() {
        assert_eq!(list_key(Collection::TASK, &Scope::All), "task_list:all");
        assert_eq!(
            list_key(Collection::TASK, &Scope::Email("a@x.com".to_string())),
            "task_list:a@x.com"
        );
        assert_eq!(
            list_key(Collection::PERMISSION, &Scope::Email("a@x.com".to_string())),
            "permission_list:a@x.com"
        );
    }

    #[test]
    fn test_record_keys() {
        assert_eq!(record_key(Collection::TASK, "42"), "task:42");
        assert_eq!(record_key(Collection::PERMISSION, "p1"), "permission:p1");
    }
}
