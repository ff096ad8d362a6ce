pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - a pool operation panicked \
                                             while holding the lock and pool state can no longer \
                                             be trusted";
