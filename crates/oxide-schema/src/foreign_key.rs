//! Foreign key specs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::fluent::Fluent;

/// Referential action for `on delete` / `on update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    /// No action (checked at end of statement).
    NoAction,
    /// Restrict (checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the referencing columns to NULL.
    SetNull,
    /// Set the referencing columns to their default.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "no action",
            Self::Restrict => "restrict",
            Self::Cascade => "cascade",
            Self::SetNull => "set null",
            Self::SetDefault => "set default",
        }
    }
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ForeignKeyAction {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "no action" => Ok(Self::NoAction),
            "restrict" => Ok(Self::Restrict),
            "cascade" => Ok(Self::Cascade),
            "set null" => Ok(Self::SetNull),
            "set default" => Ok(Self::SetDefault),
            other => Err(SchemaError::UnknownForeignKeyAction(other.to_string())),
        }
    }
}

/// A foreign key constraint in a blueprint.
///
/// ```rust
/// use oxide_schema::Blueprint;
///
/// let mut table = Blueprint::new("posts");
/// table
///     .foreign(&["user_id"])
///     .references(&["id"])
///     .on("users")
///     .cascade_on_delete();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDefinition {
    attributes: Fluent,
}

impl ForeignKeyDefinition {
    /// Creates a foreign key on the given local columns.
    #[must_use]
    pub fn new(index: impl Into<String>, columns: Vec<String>) -> Self {
        let mut attributes = Fluent::new();
        attributes.set("index", index.into()).set("columns", columns);
        Self { attributes }
    }

    /// Raw attribute record.
    #[must_use]
    pub const fn attributes(&self) -> &Fluent {
        &self.attributes
    }

    /// Overrides the constraint name.
    pub fn name(&mut self, index: impl Into<String>) -> &mut Self {
        self.attributes.set("index", index.into());
        self
    }

    /// Referenced columns.
    pub fn references(&mut self, columns: &[&str]) -> &mut Self {
        self.attributes.set("references", columns);
        self
    }

    /// Referenced table.
    pub fn on(&mut self, table: impl Into<String>) -> &mut Self {
        self.attributes.set("on", table.into());
        self
    }

    /// Sets the `on delete` action.
    pub fn on_delete(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.attributes.set("on_delete", action.as_sql());
        self
    }

    /// Sets the `on update` action.
    pub fn on_update(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.attributes.set("on_update", action.as_sql());
        self
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

    /// `on delete no action`.
    pub fn no_action_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::NoAction)
    }

    /// `on update cascade`.
    pub fn cascade_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::Cascade)
    }

    /// `on update restrict`.
    pub fn restrict_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::Restrict)
    }

    /// `on update set null`.
    pub fn null_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::SetNull)
    }

    /// `on update no action`.
    pub fn no_action_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::NoAction)
    }

    /// Makes the constraint deferrable (or explicitly not deferrable).
    pub fn deferrable(&mut self, value: bool) -> &mut Self {
        self.attributes.set("deferrable", value);
        self
    }

    /// Sets whether the constraint is checked immediately.
    pub fn initially_immediate(&mut self, value: bool) -> &mut Self {
        self.attributes.set("initially_immediate", value);
        self
    }

    /// Skips validation of existing rows (PostgreSQL `not valid`).
    pub fn not_valid(&mut self) -> &mut Self {
        self.attributes.set("not_valid", true);
        self
    }

    /// Constraint name.
    #[must_use]
    pub fn index(&self) -> &str {
        self.attributes.get_str("index").unwrap_or_default()
    }

    /// Local columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.attributes.get_list("columns").unwrap_or_default()
    }

    /// Referenced table.
    #[must_use]
    pub fn referenced_table(&self) -> Option<&str> {
        self.attributes.get_str("on")
    }

    /// Referenced columns; defaults to `id`.
    #[must_use]
    pub fn referenced_columns(&self) -> Vec<String> {
        self.attributes
            .get_list("references")
            .map_or_else(|| vec!["id".to_string()], <[String]>::to_vec)
    }

    /// `on delete` action.
    #[must_use]
    pub fn on_delete_action(&self) -> Option<ForeignKeyAction> {
        self.attributes.get_str("on_delete")?.parse().ok()
    }

    /// `on update` action.
    #[must_use]
    pub fn on_update_action(&self) -> Option<ForeignKeyAction> {
        self.attributes.get_str("on_update")?.parse().ok()
    }

    /// Deferrable setting, if any.
    #[must_use]
    pub fn deferrable_setting(&self) -> Option<bool> {
        self.attributes.get("deferrable").and_then(|v| v.as_bool())
    }

    /// Initially-immediate setting, if any.
    #[must_use]
    pub fn initially_immediate_setting(&self) -> Option<bool> {
        self.attributes
            .get("initially_immediate")
            .and_then(|v| v.as_bool())
    }

    /// Whether validation is skipped.
    #[must_use]
    pub fn is_not_valid(&self) -> bool {
        self.attributes.get_bool("not_valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_builder() {
        let mut fk = ForeignKeyDefinition::new("posts_user_id_foreign", vec!["user_id".into()]);
        fk.references(&["id"]).on("users").cascade_on_delete().restrict_on_update();

        assert_eq!(fk.index(), "posts_user_id_foreign");
        assert_eq!(fk.columns(), ["user_id".to_string()]);
        assert_eq!(fk.referenced_table(), Some("users"));
        assert_eq!(fk.referenced_columns(), vec!["id".to_string()]);
        assert_eq!(fk.on_delete_action(), Some(ForeignKeyAction::Cascade));
        assert_eq!(fk.on_update_action(), Some(ForeignKeyAction::Restrict));
        assert_eq!(fk.deferrable_setting(), None);
    }

    #[test]
    fn test_referenced_columns_default_to_id() {
        let fk = ForeignKeyDefinition::new("x", vec!["user_id".into()]);
        assert_eq!(fk.referenced_columns(), vec!["id".to_string()]);
        assert_eq!(fk.on_delete_action(), None);
    }

    #[test]
    fn test_action_round_trip_through_sql() {
        for action in [
            ForeignKeyAction::NoAction,
            ForeignKeyAction::Restrict,
            ForeignKeyAction::Cascade,
            ForeignKeyAction::SetNull,
            ForeignKeyAction::SetDefault,
        ] {
            assert_eq!(action.as_sql().parse::<ForeignKeyAction>(), Ok(action));
        }
    }
}
