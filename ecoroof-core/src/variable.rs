//! Report variable definitions.
//!
//! Every quantity the models report to the host output system is declared once
//! with its name, unit and how the host should aggregate it over a reporting
//! period. Names use `|` as a hierarchical separator, e.g.
//! `Green Roof|Soil Temperature`.
//!
//! ```rust
//! use ecoroof_core::define_report_variable;
//! use ecoroof_core::variable::Aggregation;
//!
//! define_report_variable!(
//!     VAR_EXAMPLE,
//!     name = "Green Roof|Example",
//!     unit = "W/m2",
//!     aggregation = Aggregation::State,
//!     description = "An example flux",
//! );
//!
//! assert_eq!(VAR_EXAMPLE.name, "Green Roof|Example");
//! ```

use serde::{Deserialize, Serialize};

/// How a reported value combines over a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aggregation {
    /// Instantaneous state; averaged over the period.
    State,
    /// Per-timestep amount; summed over the period.
    Sum,
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Aggregation::State => write!(f, "State"),
            Aggregation::Sum => write!(f, "Sum"),
        }
    }
}

/// Static metadata for a report variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportVariableDefinition {
    pub name: &'static str,
    pub unit: &'static str,
    pub aggregation: Aggregation,
    pub description: &'static str,
}

impl ReportVariableDefinition {
    pub const fn new(
        name: &'static str,
        unit: &'static str,
        aggregation: Aggregation,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            unit,
            aggregation,
            description,
        }
    }
}

impl std::fmt::Display for ReportVariableDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] ({})", self.name, self.unit, self.aggregation)
    }
}

/// Look up a definition by name in a fixed set.
pub fn find_definition(
    definitions: &[&'static ReportVariableDefinition],
    name: &str,
) -> Option<&'static ReportVariableDefinition> {
    definitions.iter().copied().find(|d| d.name == name)
}

/// Declare a `pub static` [`ReportVariableDefinition`].
#[macro_export]
macro_rules! define_report_variable {
    (
        $var_name:ident,
        name = $name:expr,
        unit = $unit:expr,
        aggregation = $aggregation:expr,
        description = $desc:expr $(,)?
    ) => {
        #[doc = concat!("Report variable definition for ", $name)]
        pub static $var_name: $crate::variable::ReportVariableDefinition =
            $crate::variable::ReportVariableDefinition::new($name, $unit, $aggregation, $desc);
    };
}
