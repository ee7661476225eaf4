//! Column metadata and type-spec parsing.

use serde::{Deserialize, Serialize};

use crate::error::{MetaError, Result};

use super::object::{DbObject, Named, ObjectType};

/// Integer type names across the supported vendors.
const INTEGER_TYPES: &[&str] = &[
    "int", "integer", "bigint", "smallint", "tinyint", "int2", "int4", "int8", "serial",
    "bigserial", "smallserial",
];

/// Decimal type names; these count as integer types at zero fraction digits.
const DECIMAL_TYPES: &[&str] = &["number", "numeric", "decimal", "dec"];

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Data type name (e.g., "int", "varchar", "number").
    pub data_type: String,

    /// Size / length / precision, when the type carries one.
    pub size: Option<u32>,

    /// Fraction digits (scale) for decimal types.
    pub fraction_digits: Option<u32>,

    /// Default value expression as reported by the source, if any.
    pub default_value: Option<String>,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Whether the column is used for optimistic-locking versioning.
    pub version_column: bool,

    /// Documentation comment.
    pub doc: Option<String>,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl Column {
    /// Create a column with the given name and type, nullable, without size.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            size: None,
            fraction_digits: None,
            default_value: None,
            nullable: true,
            version_column: false,
            doc: None,
            owner_table: None,
        }
    }

    /// Create a column from a combined `type(size[,fraction])` specification.
    pub fn with_type_spec(name: impl Into<String>, spec: &str) -> Result<Self> {
        let (data_type, size, fraction_digits) = parse_type_spec(spec)?;
        Ok(Self {
            size,
            fraction_digits,
            ..Self::new(name, data_type)
        })
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_fraction_digits(mut self, digits: u32) -> Self {
        self.fraction_digits = Some(digits);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as the optimistic-locking version column.
    pub fn as_version_column(mut self) -> Self {
        self.version_column = true;
        self
    }

    /// Whether the column holds integer values.
    ///
    /// True for the integer type family, and for decimal types whose fraction
    /// digits are zero (or unspecified).
    pub fn is_integer_type(&self) -> bool {
        let lower = self.data_type.to_lowercase();
        if INTEGER_TYPES.contains(&lower.as_str()) {
            return true;
        }
        DECIMAL_TYPES.contains(&lower.as_str()) && self.fraction_digits.unwrap_or(0) == 0
    }

    /// Render the type with its size specification, e.g. `varchar(30)` or
    /// `number(8,2)`.
    pub fn type_spec(&self) -> String {
        match (self.size, self.fraction_digits) {
            (Some(size), Some(frac)) => format!("{}({},{})", self.data_type, size, frac),
            (Some(size), None) => format!("{}({})", self.data_type, size),
            _ => self.data_type.clone(),
        }
    }

    /// Structural comparison: same type spec, nullability and default,
    /// ignoring the owning table.
    pub fn is_identical(&self, other: &Column) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.data_type.eq_ignore_ascii_case(&other.data_type)
            && self.size == other.size
            && self.fraction_digits == other.fraction_digits
            && self.nullable == other.nullable
            && self.default_value == other.default_value
    }
}

impl Named for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Column {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Column
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

/// Owner-anchored equality: identical structure on the same table.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}

/// Parse a `type(size[,fraction])` specification.
///
/// Returns the bare type name with optional size and fraction digits:
/// `"number(8,2)"` -> `("number", Some(8), Some(2))`, `"int"` -> `("int", None, None)`.
pub fn parse_type_spec(spec: &str) -> Result<(String, Option<u32>, Option<u32>)> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(MetaError::parse("empty type specification", spec));
    }
    let Some(open) = spec.find('(') else {
        if spec.contains(')') || spec.contains(',') {
            return Err(MetaError::parse("unbalanced type specification", spec));
        }
        return Ok((spec.to_string(), None, None));
    };

    let type_name = spec[..open].trim();
    if type_name.is_empty() {
        return Err(MetaError::parse("missing type name", spec));
    }
    let rest = &spec[open + 1..];
    let Some(close) = rest.find(')') else {
        return Err(MetaError::parse("missing closing parenthesis", spec));
    };
    if !rest[close + 1..].trim().is_empty() {
        return Err(MetaError::parse("trailing text after size", spec));
    }

    let args = &rest[..close];
    let mut parts = args.split(',');
    let size_part = parts.next().unwrap_or("").trim();
    let size = size_part
        .parse::<u32>()
        .map_err(|_| MetaError::parse("invalid size", spec))?;

    let fraction = match parts.next() {
        Some(frac_part) => Some(
            frac_part
                .trim()
                .parse::<u32>()
                .map_err(|_| MetaError::parse("invalid fraction digits", spec))?,
        ),
        None => None,
    };
    if parts.next().is_some() {
        return Err(MetaError::parse("too many size arguments", spec));
    }

    Ok((type_name.to_string(), Some(size), fraction))
}
