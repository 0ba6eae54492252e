//! Stable codes for every loader diagnostic.

use std::fmt;

/// Error codes for loader diagnostics.
///
/// Format: `L####` / `W####` where the first digit says how the load reacts:
/// - L1xxx: instance errors; the instance is discarded and loading continues
/// - L2xxx: fatal errors; the load is rolled back and stops
/// - W1xxx: warnings; nothing is discarded
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Instance errors (L1xxx)
    /// Token type cannot be assigned to the attribute domain
    L1001,
    /// Value does not fit the attribute domain
    L1002,
    /// Malformed date, time, timestamp or datetime literal
    L1003,
    /// NULL assigned to a NOT NULL attribute
    L1004,
    /// Instance line has fewer values than attributes
    L1005,
    /// Instance line has fewer values than constructor arguments
    L1006,
    /// More constructor arguments than the method accepts
    L1007,
    /// More values than attributes on an instance line
    L1008,
    /// Collection opened inside a collection
    L1009,
    /// Referenced class is not in the attribute's object domain
    L1010,
    /// Class object assigned to a restricted object domain
    L1011,
    /// Constructed instance was referenced before it was defined
    L1012,
    /// Partition key selects a different partition
    L1013,
    /// Partition key attribute not listed for a partitioned class
    L1014,

    // Fatal errors (L2xxx)
    /// Object domain names more than one class
    L2001,
    /// Reference into an internal system class
    L2002,
    /// Unknown class name
    L2003,
    /// Unknown numeric class id
    L2004,
    /// Schema lookup failed
    L2005,
    /// Attribute does not belong to the class/shared namespace
    L2006,
    /// Constructor method not found
    L2007,
    /// Object store operation failed
    L2008,
    /// Out of memory
    L2009,

    // Warnings (W1xxx)
    /// Class skipped because it is ignored or internal
    W1001,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::L1001,
        ErrorCode::L1002,
        ErrorCode::L1003,
        ErrorCode::L1004,
        ErrorCode::L1005,
        ErrorCode::L1006,
        ErrorCode::L1007,
        ErrorCode::L1008,
        ErrorCode::L1009,
        ErrorCode::L1010,
        ErrorCode::L1011,
        ErrorCode::L1012,
        ErrorCode::L1013,
        ErrorCode::L1014,
        ErrorCode::L2001,
        ErrorCode::L2002,
        ErrorCode::L2003,
        ErrorCode::L2004,
        ErrorCode::L2005,
        ErrorCode::L2006,
        ErrorCode::L2007,
        ErrorCode::L2008,
        ErrorCode::L2009,
        ErrorCode::W1001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::L1001 => "L1001",
            ErrorCode::L1002 => "L1002",
            ErrorCode::L1003 => "L1003",
            ErrorCode::L1004 => "L1004",
            ErrorCode::L1005 => "L1005",
            ErrorCode::L1006 => "L1006",
            ErrorCode::L1007 => "L1007",
            ErrorCode::L1008 => "L1008",
            ErrorCode::L1009 => "L1009",
            ErrorCode::L1010 => "L1010",
            ErrorCode::L1011 => "L1011",
            ErrorCode::L1012 => "L1012",
            ErrorCode::L1013 => "L1013",
            ErrorCode::L1014 => "L1014",
            ErrorCode::L2001 => "L2001",
            ErrorCode::L2002 => "L2002",
            ErrorCode::L2003 => "L2003",
            ErrorCode::L2004 => "L2004",
            ErrorCode::L2005 => "L2005",
            ErrorCode::L2006 => "L2006",
            ErrorCode::L2007 => "L2007",
            ErrorCode::L2008 => "L2008",
            ErrorCode::L2009 => "L2009",
            ErrorCode::W1001 => "W1001",
        }
    }

    /// Check if this is an instance error (L1xxx range).
    pub fn is_instance_error(&self) -> bool {
        self.as_str().starts_with("L1")
    }

    /// Check if this is a fatal error (L2xxx range).
    pub fn is_fatal(&self) -> bool {
        self.as_str().starts_with("L2")
    }

    /// Check if this is a warning code (Wxxx range).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W1001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a code string like `"L1002"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
