use std::collections::HashSet;

use tracing::warn;

use crate::entities::{ContractId, DateRange, PriceTimeUnit, Warning};

use super::contract_selector::SelectedContract;

/// Accumulates the warnings of a single contract.
pub(crate) struct WarningCollector {
    contract_id: ContractId,
    warnings: Vec<Warning>,
}

impl WarningCollector {
    pub(crate) fn new(contract_id: ContractId) -> Self {
        Self {
            contract_id,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn contract_not_approved(&mut self) {
        self.push(Warning::ContractNotApproved);
    }

    pub(crate) fn overlapping_coverage(&mut self) {
        self.push(Warning::OverlappingCoverage);
    }

    pub(crate) fn no_recorded_activity(&mut self, period: DateRange) {
        self.push(Warning::NoRecordedActivity { period });
    }

    pub(crate) fn hours_cap_exceeded(&mut self, period: DateRange) {
        self.push(Warning::HoursCapExceeded { period });
    }

    pub(crate) fn price_time_unit_not_applicable(&mut self, unit: PriceTimeUnit) {
        let warning = Warning::PriceTimeUnitNotApplicable { unit };
        // Reported once per contract, not per period.
        if !self.warnings.contains(&warning) {
            self.push(warning);
        }
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    fn push(&mut self, warning: Warning) {
        warn!(contract_id = self.contract_id.0, warning = %warning, "invoice warning");
        self.warnings.push(warning);
    }
}

/// Contracts sharing at least one effective day with another selected
/// contract of the same care type.
pub(crate) fn overlapping_contracts(selected: &[SelectedContract]) -> HashSet<ContractId> {
    let mut overlapping = HashSet::new();
    for (i, a) in selected.iter().enumerate() {
        for b in &selected[i + 1..] {
            if a.contract.care_type == b.contract.care_type && a.effective.overlaps(&b.effective) {
                overlapping.insert(a.contract.id);
                overlapping.insert(b.contract.id);
            }
        }
    }
    overlapping
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn keeps_warnings_in_order_of_discovery() {
        let mut collector = WarningCollector::new(ContractId(1));
        collector.contract_not_approved();
        collector.no_recorded_activity(period());
        collector.hours_cap_exceeded(period());

        let messages: Vec<_> = collector
            .into_warnings()
            .iter()
            .map(|w| w.message().to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "contract not approved",
                "no recorded activity in period",
                "hours cap exceeded, billed at cap",
            ]
        );
    }

    #[test]
    fn unit_mismatch_is_reported_once() {
        let mut collector = WarningCollector::new(ContractId(1));
        collector.price_time_unit_not_applicable(PriceTimeUnit::Daily);
        collector.price_time_unit_not_applicable(PriceTimeUnit::Daily);
        assert_eq!(collector.into_warnings().len(), 1);
    }
}
