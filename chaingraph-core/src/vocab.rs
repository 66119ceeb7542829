//! Predicate and node-type vocabulary
//!
//! Every triple the engine writes uses a predicate from this module.
//! Ledger, transaction and account nodes carry a `type` scalar with one of
//! the [`node_type`] tags; memo nodes carry their memo kind tag instead.
//! Centralizing the names keeps writers, queries and tests in agreement.

/// Node type tags, stored under the [`pred::TYPE`] predicate
pub mod node_type {
    /// One sequential unit of the source log
    pub const LEDGER: &str = "ledger";
    /// One ordered record within a ledger
    pub const TRANSACTION: &str = "transaction";
    /// An externally-identified account entity
    pub const ACCOUNT: &str = "account";
}

/// Predicate names
pub mod pred {
    /// Node type tag
    pub const TYPE: &str = "type";
    /// External id (transaction external id, account identifier, memo kind
    /// shares [`VALUE`])
    pub const ID: &str = "id";
    /// Ledger sequence number
    pub const SEQ: &str = "seq";
    /// Transaction index within its ledger (0-based)
    pub const INDEX: &str = "index";
    /// Derived total-order key `"{ledgerSeq}-{index}"`
    pub const SORT_HANDLE: &str = "sortHandle";
    /// Transaction fee amount
    pub const FEE_AMOUNT: &str = "feeAmount";
    /// Source account identifier scalar on the transaction
    pub const SOURCE_ACCOUNT_ID: &str = "sourceAccountID";
    /// Transaction -> account edge
    pub const SOURCE_ACCOUNT: &str = "sourceAccount";
    /// Ledger -> transaction and account -> transaction edges
    pub const TRANSACTIONS: &str = "transactions";
    /// Transaction -> ledger edge
    pub const LEDGER: &str = "ledger";
    /// Backward chain edge (transaction -> transaction, ledger -> ledger)
    pub const PREV: &str = "prev";
    /// Transaction -> memo edge
    pub const MEMO: &str = "memo";
    /// Memo -> transaction edge
    pub const TRANSACTION: &str = "transaction";
    /// Memo value scalar
    pub const VALUE: &str = "value";
    /// Lower time bound scalar
    pub const TIME_BOUND_MIN: &str = "timeBoundMin";
    /// Upper time bound scalar
    pub const TIME_BOUND_MAX: &str = "timeBoundMax";
    /// Ledger header hash
    pub const HASH: &str = "hash";
    /// Ledger header previous-hash
    pub const PREV_HASH: &str = "prevHash";
    /// Ledger header close time
    pub const CLOSE_TIME: &str = "closeTime";
}
