use std::collections::HashSet;

use fractic_server_error::ServerError;

use crate::{
    domain::repositories::billing_repository::BillingRepository,
    entities::{ClientId, Contract, ContractId, DateRange},
};

use super::warning_collector::overlapping_contracts;

/// A candidate contract together with the part of it falling inside the
/// requested range.
#[derive(Debug, Clone)]
pub(crate) struct SelectedContract {
    pub(crate) contract: Contract,
    pub(crate) effective: DateRange,
    pub(crate) overlaps_other: bool,
}

pub(crate) struct ContractSelector<'a, R: BillingRepository> {
    repository: &'a R,
}

impl<'a, R: BillingRepository> ContractSelector<'a, R> {
    pub(crate) fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Every contract of the client intersecting `range`, clipped to the
    /// intersection. Contracts are kept whatever their status; callers flag
    /// the unapproved ones.
    pub(crate) async fn select(
        &self,
        client_id: ClientId,
        range: &DateRange,
    ) -> Result<Vec<SelectedContract>, ServerError> {
        let contracts = self.repository.contracts_for_client(client_id, range).await?;
        Ok(clip_and_mark(contracts, range))
    }
}

pub(crate) fn clip_and_mark(contracts: Vec<Contract>, range: &DateRange) -> Vec<SelectedContract> {
    let mut selected: Vec<SelectedContract> = contracts
        .into_iter()
        .filter_map(|contract| {
            contract
                .validity
                .intersect(range)
                .map(|effective| SelectedContract {
                    contract,
                    effective,
                    overlaps_other: false,
                })
        })
        .collect();

    let overlapping: HashSet<ContractId> = overlapping_contracts(&selected);
    for s in selected.iter_mut() {
        s.overlaps_other = overlapping.contains(&s.contract.id);
    }
    selected
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::entities::{
        CareType, ContractStatus, FinancingAct, FinancingOption, PriceTimeUnit,
    };

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn contract(id: i64, start: NaiveDate, end: NaiveDate, care_type: CareType) -> Contract {
        Contract {
            id: ContractId(id),
            client_id: ClientId(1),
            sender_id: None,
            validity: DateRange::new(start, end).unwrap(),
            price: Decimal::from(10),
            price_time_unit: PriceTimeUnit::Hourly,
            care_type,
            hours: None,
            hours_type: None,
            vat: None,
            status: ContractStatus::Approved,
            financing_act: FinancingAct::Wmo,
            financing_option: FinancingOption::Zin,
        }
    }

    #[test]
    fn clips_to_requested_range_and_drops_disjoint_contracts() {
        let range = DateRange::new(d(6, 1), d(6, 30)).unwrap();
        let selected = clip_and_mark(
            vec![
                contract(1, d(5, 15), d(6, 10), CareType::Ambulante),
                contract(2, d(7, 1), d(7, 31), CareType::Ambulante),
            ],
            &range,
        );

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].effective, DateRange::new(d(6, 1), d(6, 10)).unwrap());
        assert!(!selected[0].overlaps_other);
    }

    #[test]
    fn marks_overlap_only_within_same_care_type() {
        let range = DateRange::new(d(6, 1), d(6, 30)).unwrap();
        let selected = clip_and_mark(
            vec![
                contract(1, d(6, 1), d(6, 20), CareType::Ambulante),
                contract(2, d(6, 15), d(6, 30), CareType::Ambulante),
                contract(3, d(6, 1), d(6, 30), CareType::Accommodation),
            ],
            &range,
        );

        let flags: Vec<_> = selected.iter().map(|s| (s.contract.id.0, s.overlaps_other)).collect();
        assert_eq!(flags, vec![(1, true), (2, true), (3, false)]);
    }

    #[test]
    fn overlap_is_judged_on_effective_ranges() {
        // Both contracts overlap in July, outside the requested range.
        let range = DateRange::new(d(6, 1), d(6, 30)).unwrap();
        let selected = clip_and_mark(
            vec![
                contract(1, d(6, 1), d(7, 20), CareType::Ambulante),
                contract(2, d(7, 1), d(7, 31), CareType::Ambulante),
            ],
            &range,
        );
        assert_eq!(selected.len(), 1);
        assert!(!selected[0].overlaps_other);
    }
}
