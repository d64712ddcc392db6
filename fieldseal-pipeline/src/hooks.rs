//! Which hooks run for which operation, and in what order.

use fieldseal_types::Operation;

/// Hooks run before the store executes, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeHook {
    /// Encrypt classified fields of `data`.
    EncryptData,
    /// Hash hashed fields of `data`.
    HashData,
    /// Encrypt classified operands of `where`.
    EncryptWhere,
}

/// Hooks run after the store succeeded, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterHook {
    /// Evict the resource's cache namespace.
    BreakCache,
    /// Publish `<resource>.deleted` for the matched records.
    NotifyDeleted,
    DecryptResult,
}

/// The ordered hook chains for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPlan {
    pub before: Vec<BeforeHook>,
    pub after: Vec<AfterHook>,
}

impl HookPlan {
    pub fn for_operation(operation: Operation) -> Self {
        let mut before = Vec::new();
        if operation.accepts_data() {
            before.extend([BeforeHook::EncryptData, BeforeHook::HashData]);
        }
        if operation.accepts_where() {
            before.push(BeforeHook::EncryptWhere);
        }

        // Decryption can fail on stored data; it runs last so eviction and
        // events always follow a successful write.
        let mut after = Vec::new();
        if operation.is_mutation() {
            after.push(AfterHook::BreakCache);
        }
        if operation.is_delete() {
            after.push(AfterHook::NotifyDeleted);
        }
        after.push(AfterHook::DecryptResult);

        Self { before, after }
    }
}
