//! Column kinds and column definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::IndexKind;
use crate::error::SchemaError;
use crate::fluent::{Fluent, Value};
use crate::foreign_key::ForeignKeyAction;

/// Spatial subtypes for geometry and geography columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    /// A single point.
    Point,
    /// A line string.
    LineString,
    /// A polygon.
    Polygon,
    /// A heterogeneous collection.
    GeometryCollection,
    /// Several points.
    MultiPoint,
    /// Several line strings.
    MultiLineString,
    /// Several polygons.
    MultiPolygon,
}

impl GeometryType {
    /// Lowercase SQL name of the subtype.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::LineString => "linestring",
            Self::Polygon => "polygon",
            Self::GeometryCollection => "geometrycollection",
            Self::MultiPoint => "multipoint",
            Self::MultiLineString => "multilinestring",
            Self::MultiPolygon => "multipolygon",
        }
    }
}

/// The closed set of column kinds.
///
/// Each grammar maps every kind through an exhaustive `match`, so adding a
/// kind here forces every dialect to decide how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Fixed-length string.
    Char { length: u32 },
    /// Variable-length string.
    String { length: u32 },
    /// Tiny text.
    TinyText,
    /// Text.
    Text,
    /// Medium text.
    MediumText,
    /// Long text.
    LongText,
    /// 8-bit integer.
    TinyInteger,
    /// 16-bit integer.
    SmallInteger,
    /// 24-bit integer.
    MediumInteger,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Single precision float with optional precision.
    Float { precision: Option<u8> },
    /// Double precision float.
    Double,
    /// Exact decimal with total digits and decimal places.
    Decimal { total: u8, places: u8 },
    /// Boolean.
    Boolean,
    /// One value out of an allowed list.
    Enum { allowed: Vec<String> },
    /// Any subset of an allowed list.
    Set { allowed: Vec<String> },
    /// JSON document.
    Json,
    /// Binary JSON document.
    Jsonb,
    /// Date.
    Date,
    /// Date and time.
    DateTime { precision: Option<u8> },
    /// Date and time with time zone.
    DateTimeTz { precision: Option<u8> },
    /// Time of day.
    Time { precision: Option<u8> },
    /// Time of day with time zone.
    TimeTz { precision: Option<u8> },
    /// Timestamp.
    Timestamp { precision: Option<u8> },
    /// Timestamp with time zone.
    TimestampTz { precision: Option<u8> },
    /// Year.
    Year,
    /// Binary data; `fixed` selects a fixed-length column.
    Binary { length: Option<u32>, fixed: bool },
    /// UUID.
    Uuid,
    /// IPv4 or IPv6 address.
    IpAddress,
    /// MAC address.
    MacAddress,
    /// Planar spatial value.
    Geometry {
        subtype: Option<GeometryType>,
        srid: Option<u32>,
    },
    /// Geodetic spatial value.
    Geography {
        subtype: Option<GeometryType>,
        srid: Option<u32>,
    },
    /// Computed column without a storage type of its own.
    Computed { expression: String },
}

impl ColumnType {
    /// Short kind name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Char { .. } => "char",
            Self::String { .. } => "string",
            Self::TinyText => "tinyText",
            Self::Text => "text",
            Self::MediumText => "mediumText",
            Self::LongText => "longText",
            Self::TinyInteger => "tinyInteger",
            Self::SmallInteger => "smallInteger",
            Self::MediumInteger => "mediumInteger",
            Self::Integer => "integer",
            Self::BigInteger => "bigInteger",
            Self::Float { .. } => "float",
            Self::Double => "double",
            Self::Decimal { .. } => "decimal",
            Self::Boolean => "boolean",
            Self::Enum { .. } => "enum",
            Self::Set { .. } => "set",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Date => "date",
            Self::DateTime { .. } => "dateTime",
            Self::DateTimeTz { .. } => "dateTimeTz",
            Self::Time { .. } => "time",
            Self::TimeTz { .. } => "timeTz",
            Self::Timestamp { .. } => "timestamp",
            Self::TimestampTz { .. } => "timestampTz",
            Self::Year => "year",
            Self::Binary { .. } => "binary",
            Self::Uuid => "uuid",
            Self::IpAddress => "ipAddress",
            Self::MacAddress => "macAddress",
            Self::Geometry { .. } => "geometry",
            Self::Geography { .. } => "geography",
            Self::Computed { .. } => "computed",
        }
    }

    /// Integer kinds that can back an auto-incrementing key.
    #[must_use]
    pub const fn is_serial(&self) -> bool {
        matches!(
            self,
            Self::TinyInteger
                | Self::SmallInteger
                | Self::MediumInteger
                | Self::Integer
                | Self::BigInteger
        )
    }

    /// Numeric kinds that accept the `unsigned` modifier.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_serial() || matches!(self, Self::Float { .. } | Self::Double | Self::Decimal { .. })
    }

    /// Spatial kinds.
    #[must_use]
    pub const fn is_spatial(&self) -> bool {
        matches!(self, Self::Geometry { .. } | Self::Geography { .. })
    }

    /// Precision of temporal kinds.
    #[must_use]
    pub const fn precision(&self) -> Option<u8> {
        match self {
            Self::DateTime { precision }
            | Self::DateTimeTz { precision }
            | Self::Time { precision }
            | Self::TimeTz { precision }
            | Self::Timestamp { precision }
            | Self::TimestampTz { precision } => *precision,
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    /// Resolves a kind name using the factory defaults (length 255,
    /// decimal 8,2). Kinds that need an allowed-value list or an
    /// expression cannot be built from a name alone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "char" => Self::Char { length: 255 },
            "string" => Self::String { length: 255 },
            "tinyText" => Self::TinyText,
            "text" => Self::Text,
            "mediumText" => Self::MediumText,
            "longText" => Self::LongText,
            "tinyInteger" => Self::TinyInteger,
            "smallInteger" => Self::SmallInteger,
            "mediumInteger" => Self::MediumInteger,
            "integer" => Self::Integer,
            "bigInteger" => Self::BigInteger,
            "float" => Self::Float { precision: None },
            "double" => Self::Double,
            "decimal" => Self::Decimal {
                total: 8,
                places: 2,
            },
            "boolean" => Self::Boolean,
            "json" => Self::Json,
            "jsonb" => Self::Jsonb,
            "date" => Self::Date,
            "dateTime" => Self::DateTime { precision: None },
            "dateTimeTz" => Self::DateTimeTz { precision: None },
            "time" => Self::Time { precision: None },
            "timeTz" => Self::TimeTz { precision: None },
            "timestamp" => Self::Timestamp { precision: None },
            "timestampTz" => Self::TimestampTz { precision: None },
            "year" => Self::Year,
            "binary" => Self::Binary {
                length: None,
                fixed: false,
            },
            "uuid" => Self::Uuid,
            "ipAddress" => Self::IpAddress,
            "macAddress" => Self::MacAddress,
            "geometry" => Self::Geometry {
                subtype: None,
                srid: None,
            },
            "geography" => Self::Geography {
                subtype: None,
                srid: None,
            },
            other => return Err(SchemaError::UnknownColumnType(other.to_string())),
        };
        Ok(kind)
    }
}

/// A column in a blueprint: a name, a kind and its modifiers.
///
/// Modifiers live in an ordered [`Fluent`] record. Mutators return
/// `&mut Self` so they chain directly off the blueprint factories:
///
/// ```rust
/// use oxide_schema::Blueprint;
///
/// let mut table = Blueprint::new("posts");
/// table.string("slug", 255).unique().comment("URL slug");
/// assert_eq!(table.columns()[0].comment_text(), Some("URL slug"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    name: String,
    kind: ColumnType,
    attributes: Fluent,
}

impl ColumnDefinition {
    /// Creates a column with no modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Fluent::new(),
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column kind.
    #[must_use]
    pub const fn kind(&self) -> &ColumnType {
        &self.kind
    }

    /// Raw attribute record.
    #[must_use]
    pub const fn attributes(&self) -> &Fluent {
        &self.attributes
    }

    /// Sets an arbitrary attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.set(key, value);
        self
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    /// Allows NULL values.
    pub fn nullable(&mut self) -> &mut Self {
        self.set("nullable", true)
    }

    /// Disallows NULL values (the default).
    pub fn not_null(&mut self) -> &mut Self {
        self.set("nullable", false)
    }

    /// Sets a literal default value.
    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set("default", value)
    }

    /// Sets a raw SQL expression as default.
    pub fn default_raw(&mut self, expression: impl Into<String>) -> &mut Self {
        self.set("default", Value::raw(expression))
    }

    /// Defaults the column to the current timestamp.
    pub fn use_current(&mut self) -> &mut Self {
        self.set("use_current", true)
    }

    /// Updates the column to the current timestamp on row update (MySQL).
    pub fn use_current_on_update(&mut self) -> &mut Self {
        self.set("use_current_on_update", true)
    }

    /// Sets an `on update` expression (MySQL).
    pub fn on_update(&mut self, expression: impl Into<String>) -> &mut Self {
        self.set("on_update", Value::raw(expression))
    }

    /// Marks a numeric column unsigned.
    pub fn unsigned(&mut self) -> &mut Self {
        self.set("unsigned", true)
    }

    /// Marks an integer column auto-incrementing.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.set("auto_increment", true)
    }

    /// Sets the first value of the auto-increment sequence.
    pub fn starting_value(&mut self, value: u32) -> &mut Self {
        self.set("starting_value", value)
    }

    /// Adds a primary key on this column.
    pub fn primary(&mut self) -> &mut Self {
        self.set(IndexKind::Primary.attribute(), true)
    }

    /// Adds a unique index on this column.
    pub fn unique(&mut self) -> &mut Self {
        self.set(IndexKind::Unique.attribute(), true)
    }

    /// Adds a unique index with an explicit name.
    pub fn unique_named(&mut self, index: impl Into<String>) -> &mut Self {
        self.set(IndexKind::Unique.attribute(), index.into())
    }

    /// Adds a plain index on this column.
    pub fn index(&mut self) -> &mut Self {
        self.set(IndexKind::Index.attribute(), true)
    }

    /// Adds a plain index with an explicit name.
    pub fn index_named(&mut self, index: impl Into<String>) -> &mut Self {
        self.set(IndexKind::Index.attribute(), index.into())
    }

    /// Adds a fulltext index on this column.
    pub fn fulltext(&mut self) -> &mut Self {
        self.set(IndexKind::Fulltext.attribute(), true)
    }

    /// Adds a spatial index on this column.
    pub fn spatial_index(&mut self) -> &mut Self {
        self.set(IndexKind::Spatial.attribute(), true)
    }

    /// On a changed column, drops the index of the given kind instead.
    pub fn without_index(&mut self, kind: IndexKind) -> &mut Self {
        self.set(kind.attribute(), false)
    }

    /// Adds a column comment.
    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.set("comment", comment.into())
    }

    /// Sets the character set (MySQL).
    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.set("charset", charset.into())
    }

    /// Sets the collation.
    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.set("collation", collation.into())
    }

    /// Places the column after another one (MySQL).
    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.set("after", column.into())
    }

    /// Places the column first in the table (MySQL).
    pub fn first(&mut self) -> &mut Self {
        self.set("first", true)
    }

    /// Marks the column as a modification of an existing column.
    pub fn change(&mut self) -> &mut Self {
        self.set("change", true)
    }

    /// Renames the column as part of a change.
    pub fn rename_to(&mut self, name: impl Into<String>) -> &mut Self {
        self.set("rename_to", name.into()).change()
    }

    /// Virtual generated column.
    pub fn virtual_as(&mut self, expression: impl Into<String>) -> &mut Self {
        self.set("virtual_as", Value::raw(expression))
    }

    /// Stored generated column.
    pub fn stored_as(&mut self, expression: impl Into<String>) -> &mut Self {
        self.set("stored_as", Value::raw(expression))
    }

    /// Identity column (PostgreSQL), with optional sequence options.
    pub fn generated_as(&mut self, sequence_options: Option<&str>) -> &mut Self {
        let value = sequence_options.map_or(Value::Bool(true), Value::raw);
        self.set("generated_as", value)
    }

    /// Makes an identity column `generated always` rather than `by default`.
    pub fn always(&mut self) -> &mut Self {
        self.set("always", true)
    }

    /// Hides the column from `select *` (MySQL).
    pub fn invisible(&mut self) -> &mut Self {
        self.set("invisible", true)
    }

    // =========================================================================
    // Foreign key shorthand
    // =========================================================================

    /// Adds a foreign key whose table is inferred from the column name.
    ///
    /// `user_id` references `users.id`, `category_id` references
    /// `categories.id`.
    pub fn constrained(&mut self) -> &mut Self {
        self.set("constrained", true)
    }

    /// Adds a foreign key on an explicit table and column.
    pub fn constrained_on(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> &mut Self {
        self.set("constrained_table", table.into())
            .set("constrained_column", column.into())
            .constrained()
    }

    /// `on delete` action for the shorthand foreign key.
    pub fn on_delete(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.set("on_delete", action.as_sql())
    }

    /// `on update` action for the shorthand foreign key.
    pub fn on_update_action(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.set("on_update_action", action.as_sql())
    }

    /// `on delete cascade`.
    pub fn cascade_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::Cascade)
    }

    /// `on delete restrict`.
    pub fn restrict_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::Restrict)
    }

    /// `on delete set null`.
    pub fn null_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::SetNull)
    }

    /// `on update cascade`.
    pub fn cascade_on_update(&mut self) -> &mut Self {
        self.on_update_action(ForeignKeyAction::Cascade)
    }

    /// `on update restrict`.
    pub fn restrict_on_update(&mut self) -> &mut Self {
        self.on_update_action(ForeignKeyAction::Restrict)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether NULL is allowed.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.attributes.get_bool("nullable")
    }

    /// Whether nullability was set explicitly to NOT NULL.
    #[must_use]
    pub fn is_explicitly_not_null(&self) -> bool {
        self.attributes.get("nullable") == Some(&Value::Bool(false))
    }

    /// Default value, if one was set.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.attributes.get("default")
    }

    /// Whether the column defaults to the current timestamp.
    #[must_use]
    pub fn uses_current(&self) -> bool {
        self.attributes.get_bool("use_current")
    }

    /// Whether the column updates to the current timestamp.
    #[must_use]
    pub fn uses_current_on_update(&self) -> bool {
        self.attributes.get_bool("use_current_on_update")
    }

    /// Raw `on update` expression.
    #[must_use]
    pub fn on_update_expression(&self) -> Option<&str> {
        self.attributes.get_str("on_update")
    }

    /// Whether the column is unsigned.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.attributes.get_bool("unsigned")
    }

    /// Whether the column auto-increments.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.attributes.get_bool("auto_increment")
    }

    /// Auto-increment starting value.
    #[must_use]
    pub fn starting_value_of(&self) -> Option<i64> {
        self.attributes.get_int("starting_value")
    }

    /// Index flag of the given kind.
    #[must_use]
    pub fn index_flag(&self, kind: IndexKind) -> Option<&Value> {
        self.attributes.get(kind.attribute())
    }

    /// Removes and returns the index flag of the given kind.
    pub fn take_index_flag(&mut self, kind: IndexKind) -> Option<Value> {
        self.attributes.remove(kind.attribute())
    }

    /// Column comment.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        self.attributes.get_str("comment")
    }

    /// Character set.
    #[must_use]
    pub fn charset_name(&self) -> Option<&str> {
        self.attributes.get_str("charset")
    }

    /// Collation.
    #[must_use]
    pub fn collation_name(&self) -> Option<&str> {
        self.attributes.get_str("collation")
    }

    /// Column this one is placed after.
    #[must_use]
    pub fn after_column(&self) -> Option<&str> {
        self.attributes.get_str("after")
    }

    /// Whether the column is placed first.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.attributes.get_bool("first")
    }

    /// Whether this entry changes an existing column.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.attributes.get_bool("change")
    }

    /// New name when the change also renames the column.
    #[must_use]
    pub fn renamed_to(&self) -> Option<&str> {
        self.attributes.get_str("rename_to")
    }

    /// Virtual generation expression.
    #[must_use]
    pub fn virtual_expression(&self) -> Option<&str> {
        self.attributes.get_str("virtual_as")
    }

    /// Stored generation expression.
    #[must_use]
    pub fn stored_expression(&self) -> Option<&str> {
        self.attributes.get_str("stored_as")
    }

    /// Whether the column is a virtual or stored generated column.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.virtual_expression().is_some() || self.stored_expression().is_some()
    }

    /// Identity settings: `None` when not an identity column, otherwise the
    /// optional sequence options.
    #[must_use]
    pub fn identity(&self) -> Option<Option<&str>> {
        match self.attributes.get("generated_as")? {
            Value::Bool(true) => Some(None),
            Value::Expression(options) => Some(Some(options.as_str())),
            _ => None,
        }
    }

    /// Whether an identity column is `generated always`.
    #[must_use]
    pub fn is_always(&self) -> bool {
        self.attributes.get_bool("always")
    }

    /// Whether the column is invisible.
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.attributes.get_bool("invisible")
    }

    /// Whether a shorthand foreign key is pending on this column.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.attributes.get_bool("constrained")
    }

    /// Explicit table of the shorthand foreign key.
    #[must_use]
    pub fn constrained_table(&self) -> Option<&str> {
        self.attributes.get_str("constrained_table")
    }

    /// Explicit referenced column of the shorthand foreign key.
    #[must_use]
    pub fn constrained_column(&self) -> Option<&str> {
        self.attributes.get_str("constrained_column")
    }

    /// `on delete` action of the shorthand foreign key.
    #[must_use]
    pub fn on_delete_action(&self) -> Option<ForeignKeyAction> {
        self.attributes.get_str("on_delete")?.parse().ok()
    }

    /// `on update` action of the shorthand foreign key.
    #[must_use]
    pub fn on_update_action_of(&self) -> Option<ForeignKeyAction> {
        self.attributes.get_str("on_update_action")?.parse().ok()
    }

    /// Clears the shorthand foreign key once it has been synthesized.
    pub(crate) fn take_constrained(&mut self) -> bool {
        matches!(self.attributes.remove("constrained"), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_chain() {
        let mut col = ColumnDefinition::new("price", ColumnType::Decimal { total: 8, places: 2 });
        col.unsigned().nullable().default(0).comment("in cents");

        assert!(col.is_unsigned());
        assert!(col.is_nullable());
        assert_eq!(col.default_value(), Some(&Value::Int(0)));
        assert_eq!(col.comment_text(), Some("in cents"));
        assert!(!col.is_auto_increment());
    }

    #[test]
    fn test_not_null_is_explicit() {
        let mut col = ColumnDefinition::new("title", ColumnType::String { length: 255 });
        assert!(!col.is_nullable());
        assert!(!col.is_explicitly_not_null());
        col.not_null();
        assert!(col.is_explicitly_not_null());
    }

    #[test]
    fn test_rename_to_implies_change() {
        let mut col = ColumnDefinition::new("name", ColumnType::String { length: 100 });
        col.rename_to("full_name");
        assert!(col.is_change());
        assert_eq!(col.renamed_to(), Some("full_name"));
    }

    #[test]
    fn test_identity_settings() {
        let mut col = ColumnDefinition::new("id", ColumnType::BigInteger);
        assert_eq!(col.identity(), None);
        col.generated_as(None);
        assert_eq!(col.identity(), Some(None));
        col.generated_as(Some("start with 100"));
        assert_eq!(col.identity(), Some(Some("start with 100")));
    }

    #[test]
    fn test_constrained_shorthand() {
        let mut col = ColumnDefinition::new("user_id", ColumnType::BigInteger);
        col.constrained_on("accounts", "uuid").cascade_on_delete();

        assert!(col.is_constrained());
        assert_eq!(col.constrained_table(), Some("accounts"));
        assert_eq!(col.constrained_column(), Some("uuid"));
        assert_eq!(col.on_delete_action(), Some(ForeignKeyAction::Cascade));
        assert!(col.take_constrained());
        assert!(!col.is_constrained());
    }

    #[test]
    fn test_column_type_from_str() {
        assert_eq!(
            "string".parse::<ColumnType>(),
            Ok(ColumnType::String { length: 255 })
        );
        assert_eq!("bigInteger".parse::<ColumnType>(), Ok(ColumnType::BigInteger));
        assert_eq!(
            "varchar2".parse::<ColumnType>(),
            Err(SchemaError::UnknownColumnType("varchar2".to_string()))
        );
        assert!("enum".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_column_type_classification() {
        assert!(ColumnType::BigInteger.is_serial());
        assert!(ColumnType::Double.is_numeric());
        assert!(!ColumnType::Double.is_serial());
        assert!(!ColumnType::Text.is_numeric());
        assert_eq!(ColumnType::Timestamp { precision: Some(3) }.precision(), Some(3));
    }
}
