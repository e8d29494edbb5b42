/// Constants used by the lane and identifier classifiers.
pub mod classifier {
    /// Case-insensitive lane prefix marking a CIL lane (`CIL2` => range `200`).
    pub const CIL_PREFIX: &str = "cil";
    /// Width of every range bucket.
    pub const RANGE_BUCKET_WIDTH: u64 = 100;
    /// Number of leading identifier characters compared against the prefix table.
    pub const CATEGORY_PREFIX_LEN: usize = 6;
    /// Category assigned when the identifier is missing or blank.
    pub const CATEGORY_UNKNOWN: &str = "unknown";
    /// Category assigned when the identifier prefix is not in the table.
    pub const CATEGORY_OTHER: &str = "other";
    /// Built-in identifier prefixes and their category names.
    pub const DEFAULT_CATEGORY_PREFIXES: [(&str, &str); 3] = [
        ("93YRBB", "kwid"),
        ("93YHJD", "duster"),
        ("8A18SR", "oroch"),
    ];
    /// Category distributed by location range instead of the priority pass.
    pub const DEFAULT_CATEGORY: &str = "kwid";
}

/// Constants used by allocation and rebalancing.
pub mod allocation {
    /// Default seed for every seeded permutation.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default worker count when none is configured.
    pub const DEFAULT_WORKER_COUNT: usize = 3;
    /// Default iteration cap for the rebalance loop.
    pub const DEFAULT_MAX_REBALANCE_ITERATIONS: usize = 1000;
    /// Default minimum group size for a category to take part in the priority pass.
    pub const DEFAULT_PRIORITY_MIN_GROUP_SIZE: usize = 1;
    /// Largest spread between the most and least loaded worker that counts as balanced.
    pub const BALANCED_SPREAD: usize = 1;
    /// Prefix of generated worker display names (`Worker 1`, `Worker 2`, ...).
    pub const DEFAULT_WORKER_NAME_PREFIX: &str = "Worker";
    /// Value written into the assignment column for records left unassigned.
    pub const UNASSIGNED_MARKER: &str = "";
    /// Offset mixed into the run seed before seeding the permutation RNG.
    pub const RNG_SEED_OFFSET: u64 = 0xD15_7A7C;
}

/// Constants describing the tabular input and output contract.
pub mod columns {
    /// Default header of the identifier-code column.
    pub const IDENTIFIER: &str = "CHASSI";
    /// Default header of the location (lane) column.
    pub const LOCATION: &str = "RUA";
    /// Default header of the slot column.
    pub const SLOT: &str = "VAGA";
    /// Default header of the appended assignment column.
    pub const ASSIGNMENT: &str = "TECNICO";
}

/// Constants used by the CSV collaborators.
pub mod csv_file {
    /// Default field delimiter.
    pub const DEFAULT_DELIMITER: u8 = b',';
    /// Source id prefix for CSV file sources.
    pub const SOURCE_ID_PREFIX: &str = "csv:";
}
