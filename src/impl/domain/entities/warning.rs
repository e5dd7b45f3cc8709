use super::{contract::PriceTimeUnit, date_range::DateRange};

/// Non-fatal data-quality finding attached to an invoice detail. Warnings
/// never change the computed numbers; they flag them for human review.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    ContractNotApproved,
    NoRecordedActivity { period: DateRange },
    OverlappingCoverage,
    HoursCapExceeded { period: DateRange },
    PriceTimeUnitNotApplicable { unit: PriceTimeUnit },
    /// Free-form warning, as read back from a stored or externally edited
    /// invoice.
    Custom(String),
}

impl Warning {
    /// Stable message, independent of the period the warning refers to.
    pub fn message(&self) -> &str {
        match self {
            Warning::ContractNotApproved => "contract not approved",
            Warning::NoRecordedActivity { .. } => "no recorded activity in period",
            Warning::OverlappingCoverage => "overlapping contract coverage",
            Warning::HoursCapExceeded { .. } => "hours cap exceeded, billed at cap",
            Warning::PriceTimeUnitNotApplicable { .. } => {
                "price time unit not applicable to care type"
            }
            Warning::Custom(s) => s,
        }
    }

    /// Whether this warning carries `message`. Warnings read back from storage
    /// are free-form text that may end with the period or unit they refer to,
    /// so those match on the message prefix.
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Warning::Custom(text) => {
                text == message
                    || text
                        .strip_prefix(message)
                        .is_some_and(|rest| rest.starts_with(" ("))
            }
            other => other.message() == message,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::NoRecordedActivity { period } | Warning::HoursCapExceeded { period } => {
                write!(f, "{} ({})", self.message(), period)
            }
            Warning::PriceTimeUnitNotApplicable { unit } => {
                write!(f, "{} ({})", self.message(), unit.as_str())
            }
            _ => write!(f, "{}", self.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn stored_warning_still_matches_its_message() {
        let warning = Warning::NoRecordedActivity { period: period() };
        let stored = Warning::Custom(warning.to_string());

        assert!(warning.matches("no recorded activity in period"));
        assert!(stored.matches("no recorded activity in period"));
        assert!(Warning::Custom("contract not approved".to_string()).matches("contract not approved"));
    }

    #[test]
    fn prefix_alone_does_not_match() {
        let stored = Warning::Custom("no recorded activity in period, see notes".to_string());
        assert!(!stored.matches("no recorded activity in period"));
        assert!(!Warning::OverlappingCoverage.matches("overlapping"));
    }
}
