use thiserror::Error;

use crate::Key;

/// Errors that can occur when configuring or operating a pool or pool registry.
///
/// A failed operation leaves the pool or registry exactly as it was before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool was built without a factory, so it would have no way to create items.
    #[error("a factory is required to build a pool")]
    MissingFactory,

    /// The key was not created by this pool or its item has since been pruned or cleared.
    #[error("item {key} does not belong to the pool")]
    NotOwned {
        /// The key that was rejected.
        key: Key,
    },

    /// The item is already inactive, so it cannot be pushed back again.
    #[error("item {key} is already in the pool")]
    AlreadyStored {
        /// The key that was rejected.
        key: Key,
    },

    /// A registry was asked to create a pool for a prototype that already has one.
    #[error("a pool already exists for prototype {prototype}")]
    DuplicatePool {
        /// Debug rendering of the prototype key.
        prototype: String,
    },

    /// A registry configured with [`MissingPoolPolicy::Fail`][crate::MissingPoolPolicy::Fail]
    /// was asked to operate on a prototype that has no pool.
    #[error("no pool exists for prototype {prototype}")]
    PoolMissing {
        /// Debug rendering of the prototype key.
        prototype: String,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{PoolConfig, RecyclingPool};

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn ownership_errors_name_the_item() {
        let mut pool = RecyclingPool::new(PoolConfig::new(1), |_| 0_u32);
        let key = pool.pull();
        pool.push(key).unwrap();

        let error = pool.push(key).unwrap_err();
        assert!(error.to_string().contains("already in the pool"));
        assert!(error.to_string().contains(&key.to_string()));

        let mut other = RecyclingPool::new(PoolConfig::new(1), |_| 0_u32);
        let error = other.push(key).unwrap_err();
        assert!(error.to_string().contains("does not belong to the pool"));
    }

    #[test]
    fn registry_errors_render_prototype() {
        let error = Error::DuplicatePool {
            prototype: format!("{:?}", "bullet"),
        };

        assert_eq!(
            error.to_string(),
            "a pool already exists for prototype \"bullet\""
        );
    }
}
