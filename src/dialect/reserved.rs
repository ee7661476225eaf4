//! Reserved-word sets.
//!
//! Each dialect instance computes its reserved-word set lazily, exactly once:
//! the vendor word list when the dialect ships one, else the SQL:2003
//! baseline, merged with the words reported live by the driver's metadata.
//! Driver words are a superset addition, never a subtraction. The merged set
//! is cached for the dialect instance's lifetime.

use std::collections::BTreeSet;

use once_cell::sync::OnceCell;

/// SQL:2003 reserved words, the fallback baseline for dialects without a
/// vendor-specific list.
pub const SQL_2003: &[&str] = &[
    "add", "all", "allocate", "alter", "and", "any", "are", "array", "as", "asensitive",
    "asymmetric", "at", "atomic", "authorization", "begin", "between", "bigint", "binary", "blob",
    "boolean", "both", "by", "call", "called", "cascaded", "case", "cast", "char", "character",
    "check", "clob", "close", "collate", "column", "commit", "condition", "connect", "constraint",
    "continue", "corresponding", "create", "cross", "cube", "current", "current_date",
    "current_path", "current_role", "current_time", "current_timestamp", "current_user", "cursor",
    "cycle", "date", "day", "deallocate", "dec", "decimal", "declare", "default", "delete",
    "deref", "describe", "deterministic", "disconnect", "distinct", "double", "drop", "dynamic",
    "each", "element", "else", "end", "escape", "except", "exec", "execute", "exists", "external",
    "false", "fetch", "filter", "float", "for", "foreign", "free", "from", "full", "function",
    "get", "global", "grant", "group", "grouping", "having", "hold", "hour", "identity",
    "immediate", "in", "indicator", "inner", "inout", "input", "insensitive", "insert", "int",
    "integer", "intersect", "interval", "into", "is", "isolation", "join", "language", "large",
    "lateral", "leading", "left", "like", "local", "localtime", "localtimestamp", "match",
    "member", "merge", "method", "minute", "modifies", "module", "month", "multiset", "national",
    "natural", "nchar", "nclob", "new", "no", "none", "not", "null", "numeric", "of", "old", "on",
    "only", "open", "or", "order", "out", "outer", "output", "over", "overlaps", "parameter",
    "partition", "precision", "prepare", "primary", "procedure", "range", "reads", "real",
    "recursive", "ref", "references", "referencing", "release", "return", "returns", "revoke",
    "right", "rollback", "rollup", "row", "rows", "savepoint", "scroll", "search", "second",
    "select", "sensitive", "session_user", "set", "similar", "smallint", "some", "specific",
    "specifictype", "sql", "sqlexception", "sqlstate", "sqlwarning", "start", "static",
    "submultiset", "symmetric", "system", "system_user", "table", "tablesample", "then", "time",
    "timestamp", "timezone_hour", "timezone_minute", "to", "trailing", "translation", "treat",
    "trigger", "true", "union", "unique", "unknown", "unnest", "update", "user", "using", "value",
    "values", "varchar", "varying", "when", "whenever", "where", "window", "with", "within",
    "without", "year",
];

/// Oracle-specific additions to the baseline.
pub const ORACLE: &[&str] = &[
    "access", "audit", "cluster", "comment", "compress", "connect", "exclusive", "file",
    "identified", "increment", "index", "initial", "level", "lock", "long", "maxextents",
    "minus", "mlslabel", "mode", "modify", "noaudit", "nocompress", "nowait", "number", "offline",
    "online", "option", "pctfree", "prior", "privileges", "public", "raw", "rename", "resource",
    "rowid", "rownum", "session", "share", "size", "successful", "synonym", "sysdate", "uid",
    "validate", "varchar2", "view", "whenever",
];

/// PostgreSQL-specific additions to the baseline.
pub const POSTGRES: &[&str] = &[
    "analyse", "analyze", "asc", "concurrently", "desc", "do", "freeze", "ilike", "initially",
    "isnull", "limit", "notnull", "offset", "placing", "returning", "session_user", "variadic",
    "verbose",
];

/// SQL Server specific additions to the baseline.
pub const MSSQL: &[&str] = &[
    "backup", "break", "browse", "bulk", "checkpoint", "clustered", "compute", "contains",
    "containstable", "database", "dbcc", "deny", "disk", "distributed", "dump", "errlvl",
    "exit", "file", "fillfactor", "freetext", "freetexttable", "goto", "holdlock", "identitycol",
    "identity_insert", "if", "index", "key", "kill", "lineno", "load", "nocheck", "nonclustered",
    "off", "offsets", "opendatasource", "openquery", "openrowset", "openxml", "option", "percent",
    "pivot", "plan", "print", "proc", "public", "raiserror", "read", "readtext", "reconfigure",
    "replication", "restore", "restrict", "revert", "rowcount", "rowguidcol", "rule", "save",
    "securityaudit", "setuser", "shutdown", "statistics", "textsize", "top", "tran",
    "transaction", "truncate", "tsequal", "unpivot", "updatetext", "use", "waitfor", "while",
    "writetext",
];

/// MySQL-specific additions to the baseline.
pub const MYSQL: &[&str] = &[
    "accessible", "asc", "before", "change", "databases", "delayed", "desc", "distinctrow",
    "div", "dual", "explain", "force", "fulltext", "high_priority", "if", "ignore", "index",
    "infile", "key", "keys", "kill", "limit", "linear", "lines", "load", "lock", "long",
    "longblob", "longtext", "low_priority", "mediumblob", "mediumint", "mediumtext",
    "middleint", "mod", "no_write_to_binlog", "optimize", "optionally", "outfile", "purge",
    "read", "read_write", "regexp", "rename", "replace", "require", "restrict", "rlike",
    "schema", "schemas", "separator", "show", "spatial", "sql_big_result",
    "sql_calc_found_rows", "sql_small_result", "ssl", "straight_join", "terminated", "tinyblob",
    "tinyint", "tinytext", "undo", "unlock", "unsigned", "usage", "use", "utc_date", "utc_time",
    "utc_timestamp", "varbinary", "varcharacter", "while", "write", "xor", "zerofill",
];

/// Lazily merged reserved-word set for one dialect instance.
#[derive(Debug, Default)]
pub struct ReservedWords {
    vendor: Option<&'static [&'static str]>,
    merged: OnceCell<BTreeSet<String>>,
}

impl ReservedWords {
    /// Create a set backed by a vendor word list.
    pub fn vendor(words: &'static [&'static str]) -> Self {
        Self {
            vendor: Some(words),
            merged: OnceCell::new(),
        }
    }

    /// Create a set backed only by the SQL:2003 baseline.
    pub fn baseline() -> Self {
        Self {
            vendor: None,
            merged: OnceCell::new(),
        }
    }

    /// The baseline-plus-vendor word set, computed on first access.
    pub fn get(&self) -> &BTreeSet<String> {
        self.merged.get_or_init(|| {
            let mut set: BTreeSet<String> =
                SQL_2003.iter().map(|w| w.to_string()).collect();
            if let Some(vendor) = self.vendor {
                set.extend(vendor.iter().map(|w| w.to_string()));
            }
            set
        })
    }

    /// Case-insensitive membership test. The cached set only holds the
    /// baseline and vendor words; `driver_words` vary per connection and are
    /// checked on every call.
    pub fn contains(&self, word: &str, driver_words: &[String]) -> bool {
        self.get().contains(&word.to_lowercase())
            || driver_words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_contains_sql2003_words() {
        let words = ReservedWords::baseline();
        assert!(words.contains("SELECT", &[]));
        assert!(words.contains("where", &[]));
        assert!(!words.contains("customers", &[]));
    }

    #[test]
    fn test_vendor_list_extends_baseline() {
        let words = ReservedWords::vendor(ORACLE);
        assert!(words.contains("rownum", &[]));
        // Baseline words are still present
        assert!(words.contains("select", &[]));
    }

    #[test]
    fn test_driver_words_checked_per_call() {
        let words = ReservedWords::baseline();
        // An earlier driver-less query must not freeze the driver list out.
        assert!(words.contains("select", &[]));
        let driver = vec!["WEIRDWORD".to_string()];
        assert!(words.contains("weirdword", &driver));
        assert!(!words.contains("weirdword", &[]));
    }
}
