//! Table definitions for every persisted record type.

/// Name and key schema of one backend table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub partition_key: &'static str,
    pub sort_key: Option<&'static str>,
}

/// Campaigns keyed by `(account_id, id)`.
pub const CAMPAIGNS: TableDef = TableDef {
    name: "adpilot_campaign",
    partition_key: "account_id",
    sort_key: Some("id"),
};

/// Automation rules keyed by generated id.
pub const RULES: TableDef = TableDef {
    name: "adpilot_rule",
    partition_key: "id",
    sort_key: None,
};

/// Type-A revenue records keyed by platform campaign id.
pub const PLATFORM_REVENUE: TableDef = TableDef {
    name: "adpilot_platform_revenue",
    partition_key: "id",
    sort_key: None,
};

/// Type-B revenue records keyed by correlation key.
pub const TRACKED_REVENUE: TableDef = TableDef {
    name: "adpilot_tracked_revenue",
    partition_key: "utm",
    sort_key: None,
};

/// Ad accounts keyed by platform account id.
pub const ACCOUNTS: TableDef = TableDef {
    name: "adpilot_account",
    partition_key: "account_id",
    sort_key: None,
};

/// Ignore-list entries keyed by account id.
pub const IGNORED_ACCOUNTS: TableDef = TableDef {
    name: "adpilot_ignored_account",
    partition_key: "account_id",
    sort_key: None,
};

/// Every table the memory store pre-creates.
pub const ALL: [TableDef; 6] = [
    CAMPAIGNS,
    RULES,
    PLATFORM_REVENUE,
    TRACKED_REVENUE,
    ACCOUNTS,
    IGNORED_ACCOUNTS,
];
