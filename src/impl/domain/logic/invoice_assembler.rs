use fractic_server_error::ServerError;
use futures::{
    stream::{self, StreamExt},
    TryStreamExt,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::{
    config::BillingConfig,
    domain::repositories::billing_repository::BillingRepository,
    entities::{
        CareType, ClientId, Contract, DateRange, InvoiceDetail, InvoicePeriod, InvoiceResult,
        PeriodQuantity,
    },
};

use super::{
    amount_arithmetic::{checked_mul, checked_sum},
    appointment_aggregator::AppointmentAggregator,
    contract_selector::{ContractSelector, SelectedContract},
    period_splitter::PeriodSplitter,
    rate_calculator::{period_amount, unit_applies_to_minutes, BillableQuantity},
    vat_applier::VatApplier,
    warning_collector::WarningCollector,
};

const MINUTES_PER_HOUR: i64 = 60;

/// Computes an invoice from current store data without writing anything.
///
/// Contracts are computed independently and concurrently (bounded by
/// `max_concurrent_contracts`); their order in the result follows the
/// selector's order. The first store error aborts the whole computation.
pub(crate) struct InvoiceAssembler<'a, R: BillingRepository> {
    repository: &'a R,
    vat_applier: VatApplier,
    max_concurrent_contracts: usize,
}

impl<'a, R: BillingRepository> InvoiceAssembler<'a, R> {
    pub(crate) fn new(repository: &'a R, config: &BillingConfig) -> Self {
        Self {
            repository,
            vat_applier: VatApplier::new(config.decimal_places()),
            max_concurrent_contracts: config.max_concurrent_contracts.max(1),
        }
    }

    pub(crate) async fn assemble(
        &self,
        client_id: ClientId,
        range: DateRange,
    ) -> Result<InvoiceResult, ServerError> {
        let selected = ContractSelector::new(self.repository)
            .select(client_id, &range)
            .await?;
        if selected.is_empty() {
            info!(client_id = client_id.0, range = %range, "no contracts overlap billing range");
            return Ok(InvoiceResult::empty(client_id, range));
        }

        let sender_id = selected.iter().find_map(|s| s.contract.sender_id);
        let invoice_details = stream::iter(selected)
            .map(|s| self.contract_detail(client_id, s))
            .buffered(self.max_concurrent_contracts)
            .try_collect::<Vec<_>>()
            .await?;
        let pre_vat_total_amount = checked_sum(
            invoice_details.iter().map(|d| d.pre_vat_total),
            "invoice pre-VAT total",
        )?;
        let total_amount = checked_sum(invoice_details.iter().map(|d| d.total), "invoice total")?;

        Ok(InvoiceResult {
            client_id,
            sender_id,
            range,
            pre_vat_total_amount,
            total_amount,
            invoice_details,
        })
    }

    async fn contract_detail(
        &self,
        client_id: ClientId,
        selected: SelectedContract,
    ) -> Result<InvoiceDetail, ServerError> {
        let SelectedContract {
            contract,
            effective,
            overlaps_other,
        } = selected;

        let mut warnings = WarningCollector::new(contract.id);
        if !contract.is_billable_status() {
            warnings.contract_not_approved();
        }
        if overlaps_other {
            warnings.overlapping_coverage();
        }

        let ranges = PeriodSplitter::for_contract(&contract).split(&effective)?;
        let mut periods = Vec::with_capacity(ranges.len());
        for range in ranges {
            let period = match contract.care_type {
                CareType::Ambulante => {
                    self.ambulante_period(client_id, &contract, range, &mut warnings)
                        .await?
                }
                CareType::Accommodation => accommodation_period(&contract, range, &mut warnings)?,
            };
            periods.push(period);
        }

        let pre_vat_total = checked_sum(
            periods.iter().map(|p| p.amount),
            &format!("pre-VAT total of contract {}", contract.id.0),
        )?;
        let total = self
            .vat_applier
            .apply(pre_vat_total, contract.vat_percentage())?;
        debug!(
            contract_id = contract.id.0,
            periods = periods.len(),
            pre_vat_total = %pre_vat_total,
            total = %total,
            "contract billed"
        );

        Ok(InvoiceDetail {
            contract_id: contract.id,
            contract_type: contract.care_type,
            periods,
            pre_vat_total,
            vat: contract.vat_percentage(),
            total,
            price: contract.price,
            price_time_unit: contract.price_time_unit,
            warnings: warnings.into_warnings(),
        })
    }

    async fn ambulante_period(
        &self,
        client_id: ClientId,
        contract: &Contract,
        range: DateRange,
        warnings: &mut WarningCollector,
    ) -> Result<InvoicePeriod, ServerError> {
        let unit = contract.price_time_unit;
        if !unit_applies_to_minutes(unit) {
            warnings.price_time_unit_not_applicable(unit);
            return Ok(InvoicePeriod {
                range,
                quantity: PeriodQuantity::Ambulante {
                    total_minutes: None,
                    billed_minutes: Decimal::ZERO,
                },
                amount: Decimal::ZERO,
            });
        }

        let minutes = AppointmentAggregator::new(self.repository)
            .sum_minutes(client_id, &range)
            .await?;
        if minutes == 0 {
            warnings.no_recorded_activity(range);
        }

        let recorded = Decimal::from(minutes);
        let cap = contract
            .hours
            .map(|hours| checked_mul(hours, Decimal::from(MINUTES_PER_HOUR), "hours cap"))
            .transpose()?;
        let billed_minutes = match cap {
            Some(cap) if recorded > cap => {
                warnings.hours_cap_exceeded(range);
                cap
            }
            _ => recorded,
        };

        let amount = match period_amount(
            BillableQuantity::Minutes(billed_minutes),
            contract.price,
            unit,
        )? {
            Some(amount) => amount,
            None => {
                warnings.price_time_unit_not_applicable(unit);
                Decimal::ZERO
            }
        };

        Ok(InvoicePeriod {
            range,
            quantity: PeriodQuantity::Ambulante {
                total_minutes: Some(minutes),
                billed_minutes,
            },
            amount,
        })
    }
}

fn accommodation_period(
    contract: &Contract,
    range: DateRange,
    warnings: &mut WarningCollector,
) -> Result<InvoicePeriod, ServerError> {
    let days = range.num_days();
    let amount = match period_amount(
        BillableQuantity::Days(days),
        contract.price,
        contract.price_time_unit,
    )? {
        Some(amount) => amount,
        None => {
            warnings.price_time_unit_not_applicable(contract.price_time_unit);
            Decimal::ZERO
        }
    };
    Ok(InvoicePeriod {
        range,
        quantity: PeriodQuantity::Accommodation { days },
        amount,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::{
        entities::{
            Appointment, AppointmentId, ContractId, ContractStatus, FinancingAct, FinancingOption,
            HoursType, PriceTimeUnit, Warning,
        },
        errors::StoreUnavailable,
    };

    #[derive(Default)]
    struct FakeRepository {
        contracts: Vec<Contract>,
        appointments: Vec<Appointment>,
        fail_appointments: bool,
        appointment_calls: AtomicUsize,
    }

    #[async_trait]
    impl BillingRepository for FakeRepository {
        async fn contracts_for_client(
            &self,
            client_id: ClientId,
            range: &DateRange,
        ) -> Result<Vec<Contract>, ServerError> {
            Ok(self
                .contracts
                .iter()
                .filter(|c| c.client_id == client_id && c.validity.overlaps(range))
                .cloned()
                .collect())
        }

        async fn appointments_for_client(
            &self,
            client_id: ClientId,
            period: &DateRange,
        ) -> Result<Vec<Appointment>, ServerError> {
            self.appointment_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_appointments {
                return Err(StoreUnavailable::new("connection refused"));
            }
            let (from, until) = period.instant_window();
            Ok(self
                .appointments
                .iter()
                .filter(|a| a.is_linked_to(client_id) && a.start_time < until && a.end_time > from)
                .cloned()
                .collect())
        }

        async fn client_ids(&self) -> Result<Vec<ClientId>, ServerError> {
            Ok(self.contracts.iter().map(|c| c.client_id).collect())
        }
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn at(m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
        d(m, day).and_hms_opt(h, min, 0).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn ambulante(id: i64, price: &str, validity: DateRange) -> Contract {
        Contract {
            id: ContractId(id),
            client_id: ClientId(1),
            sender_id: None,
            validity,
            price: dec(price),
            price_time_unit: PriceTimeUnit::Hourly,
            care_type: CareType::Ambulante,
            hours: None,
            hours_type: None,
            vat: None,
            status: ContractStatus::Approved,
            financing_act: FinancingAct::Wmo,
            financing_option: FinancingOption::Zin,
        }
    }

    fn accommodation(id: i64, price: &str, unit: PriceTimeUnit, validity: DateRange) -> Contract {
        Contract {
            price_time_unit: unit,
            care_type: CareType::Accommodation,
            financing_act: FinancingAct::Wlz,
            ..ambulante(id, price, validity)
        }
    }

    fn appointment(id: i64, start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
        Appointment {
            id: AppointmentId(id),
            start_time: start,
            end_time: end,
            client_ids: vec![ClientId(1)],
        }
    }

    async fn assemble(repository: &FakeRepository, range: DateRange) -> Result<InvoiceResult, ServerError> {
        InvoiceAssembler::new(repository, &BillingConfig::default())
            .assemble(ClientId(1), range)
            .await
    }

    fn assert_invariants(result: &InvoiceResult) {
        let sum: Decimal = result.invoice_details.iter().map(|d| d.total).sum();
        assert_eq!(result.total_amount, sum);
        let pre_vat_sum: Decimal = result.invoice_details.iter().map(|d| d.pre_vat_total).sum();
        assert_eq!(result.pre_vat_total_amount, pre_vat_sum);
        for detail in &result.invoice_details {
            assert!(detail.pre_vat_total >= Decimal::ZERO);
            let expected = VatApplier::new(2).apply(detail.pre_vat_total, detail.vat).unwrap();
            assert_eq!(detail.total, expected);
            let period_sum: Decimal = detail.periods.iter().map(|p| p.amount).sum();
            assert_eq!(detail.pre_vat_total, period_sum);
        }
    }

    fn assert_store_unavailable(error: &ServerError) {
        let text = format!("{error} {error:?}").to_lowercase();
        assert!(text.contains("store unavailable"), "unexpected error: {text}");
    }

    #[tokio::test]
    async fn weekly_ambulante_contract_bills_each_week_separately() {
        let mut contract = ambulante(1, "558", range(d(1, 1), d(12, 31)));
        contract.hours = Some(dec("40"));
        contract.hours_type = Some(HoursType::Weekly);
        let repository = FakeRepository {
            contracts: vec![contract],
            appointments: vec![appointment(1, at(6, 4, 10, 0), at(6, 4, 11, 40))],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 3), d(6, 16))).await.unwrap();
        assert_invariants(&result);

        let detail = &result.invoice_details[0];
        assert_eq!(detail.periods.len(), 2);
        assert_eq!(detail.periods[0].range, range(d(6, 3), d(6, 9)));
        assert_eq!(detail.periods[0].amount, dec("930"));
        assert_eq!(
            detail.periods[1].quantity,
            PeriodQuantity::Ambulante {
                total_minutes: Some(0),
                billed_minutes: Decimal::ZERO,
            }
        );
        assert_eq!(detail.periods[1].amount, Decimal::ZERO);
        assert_eq!(
            detail.warnings,
            vec![Warning::NoRecordedActivity {
                period: range(d(6, 10), d(6, 16))
            }]
        );
        assert_eq!(detail.pre_vat_total, dec("930"));
        assert_eq!(result.total_amount, dec("930"));
    }

    #[tokio::test]
    async fn accommodation_contract_bills_elapsed_days() {
        let repository = FakeRepository {
            contracts: vec![accommodation(
                2,
                "125.50",
                PriceTimeUnit::Daily,
                range(d(1, 1), d(12, 31)),
            )],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        assert_invariants(&result);

        let detail = &result.invoice_details[0];
        assert_eq!(
            detail.periods[0].quantity,
            PeriodQuantity::Accommodation { days: 30 }
        );
        assert_eq!(detail.pre_vat_total, dec("3765"));
        assert!(detail.warnings.is_empty());
        // Accommodation never reads appointments.
        assert_eq!(repository.appointment_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn overlapping_contracts_are_both_billed_and_flagged() {
        let repository = FakeRepository {
            contracts: vec![
                ambulante(1, "60", range(d(6, 1), d(6, 20))),
                ambulante(2, "30", range(d(6, 10), d(6, 30))),
            ],
            appointments: vec![appointment(1, at(6, 12, 9, 0), at(6, 12, 10, 0))],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        assert_invariants(&result);

        assert_eq!(result.invoice_details.len(), 2);
        for detail in &result.invoice_details {
            assert!(detail.has_warning("overlapping contract coverage"));
        }
        assert_eq!(result.invoice_details[0].pre_vat_total, dec("60"));
        assert_eq!(result.invoice_details[1].pre_vat_total, dec("30"));
        assert_eq!(result.total_amount, dec("90"));
    }

    #[tokio::test]
    async fn hours_cap_limits_billed_minutes() {
        let mut contract = ambulante(1, "558", range(d(1, 1), d(12, 31)));
        contract.hours = Some(dec("1"));
        contract.hours_type = Some(HoursType::AllPeriod);
        let repository = FakeRepository {
            contracts: vec![contract],
            appointments: vec![appointment(1, at(6, 4, 10, 0), at(6, 4, 11, 40))],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        let detail = &result.invoice_details[0];
        assert_eq!(
            detail.periods[0].quantity,
            PeriodQuantity::Ambulante {
                total_minutes: Some(100),
                billed_minutes: dec("60"),
            }
        );
        assert_eq!(detail.pre_vat_total, dec("558"));
        assert!(detail.has_warning("hours cap exceeded, billed at cap"));
    }

    #[tokio::test]
    async fn weekly_hours_cap_applies_to_each_week_on_its_own() {
        let mut contract = ambulante(1, "558", range(d(1, 1), d(12, 31)));
        contract.hours = Some(dec("2"));
        contract.hours_type = Some(HoursType::Weekly);
        let repository = FakeRepository {
            contracts: vec![contract],
            appointments: vec![
                appointment(1, at(6, 3, 8, 0), at(6, 3, 11, 7)),
                appointment(2, at(6, 11, 9, 0), at(6, 11, 10, 0)),
            ],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 3), d(6, 16))).await.unwrap();
        assert_invariants(&result);

        let detail = &result.invoice_details[0];
        assert_eq!(detail.periods.len(), 2);
        assert_eq!(
            detail.periods[0].quantity,
            PeriodQuantity::Ambulante {
                total_minutes: Some(187),
                billed_minutes: dec("120"),
            }
        );
        assert_eq!(detail.periods[0].amount, dec("1116"));
        assert_eq!(
            detail.periods[1].quantity,
            PeriodQuantity::Ambulante {
                total_minutes: Some(60),
                billed_minutes: dec("60"),
            }
        );
        assert_eq!(detail.periods[1].amount, dec("558"));
        assert_eq!(
            detail.warnings,
            vec![Warning::HoursCapExceeded {
                period: range(d(6, 3), d(6, 9))
            }]
        );
        assert_eq!(result.total_amount, dec("1674"));
    }

    #[tokio::test]
    async fn unapproved_contract_is_billed_with_warning() {
        let mut contract = accommodation(1, "100", PriceTimeUnit::Weekly, range(d(6, 1), d(6, 14)));
        contract.status = ContractStatus::Draft;
        contract.vat = Some(21);
        let repository = FakeRepository {
            contracts: vec![contract],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        assert_invariants(&result);

        let detail = &result.invoice_details[0];
        assert!(detail.has_warning("contract not approved"));
        assert_eq!(detail.pre_vat_total, dec("200"));
        assert_eq!(detail.vat, 21);
        assert_eq!(detail.total, dec("242.00"));
    }

    #[tokio::test]
    async fn unit_not_applicable_bills_nothing_and_warns() {
        let mut contract = ambulante(1, "100", range(d(6, 1), d(6, 30)));
        contract.price_time_unit = PriceTimeUnit::Daily;
        let repository = FakeRepository {
            contracts: vec![contract],
            ..Default::default()
        };

        let result = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        let detail = &result.invoice_details[0];
        assert_eq!(detail.pre_vat_total, Decimal::ZERO);
        assert!(detail.has_warning("price time unit not applicable to care type"));
        assert_eq!(
            detail.periods[0].quantity,
            PeriodQuantity::Ambulante {
                total_minutes: None,
                billed_minutes: Decimal::ZERO,
            }
        );
    }

    #[tokio::test]
    async fn client_without_contracts_gets_empty_result() {
        let repository = FakeRepository::default();
        let result = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn store_failure_aborts_whole_computation() {
        let repository = FakeRepository {
            contracts: vec![
                accommodation(1, "100", PriceTimeUnit::Daily, range(d(6, 1), d(6, 30))),
                ambulante(2, "60", range(d(6, 1), d(6, 30))),
            ],
            fail_appointments: true,
            ..Default::default()
        };

        let error = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap_err();
        assert_store_unavailable(&error);
    }

    #[tokio::test]
    async fn amounts_beyond_decimal_range_fail_instead_of_panicking() {
        let mut contract = accommodation(1, "0", PriceTimeUnit::Daily, range(d(6, 1), d(6, 30)));
        contract.price = Decimal::MAX / Decimal::TEN;
        let repository = FakeRepository {
            contracts: vec![contract],
            ..Default::default()
        };

        let error = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap_err();
        let text = format!("{error} {error:?}").to_lowercase();
        assert!(text.contains("too large"), "unexpected error: {text}");
    }

    #[tokio::test]
    async fn totals_beyond_decimal_range_fail_instead_of_panicking() {
        let mut first = accommodation(1, "0", PriceTimeUnit::Daily, range(d(6, 1), d(6, 1)));
        first.price = Decimal::MAX;
        let mut second = first.clone();
        second.id = ContractId(2);
        let repository = FakeRepository {
            contracts: vec![first, second],
            ..Default::default()
        };

        assert!(assemble(&repository, range(d(6, 1), d(6, 1))).await.is_err());
    }

    #[tokio::test]
    async fn repeated_generation_is_identical() {
        let mut weekly = ambulante(1, "558", range(d(1, 1), d(12, 31)));
        weekly.hours = Some(dec("2"));
        weekly.hours_type = Some(HoursType::Weekly);
        weekly.vat = Some(9);
        let repository = FakeRepository {
            contracts: vec![
                weekly,
                accommodation(2, "1000", PriceTimeUnit::Monthly, range(d(5, 20), d(6, 12))),
            ],
            appointments: vec![
                appointment(1, at(6, 3, 8, 0), at(6, 3, 11, 7)),
                appointment(2, at(6, 9, 23, 30), at(6, 10, 0, 45)),
            ],
            ..Default::default()
        };

        let first = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        let second = assemble(&repository, range(d(6, 1), d(6, 30))).await.unwrap();
        assert_eq!(first, second);
        assert_invariants(&first);
    }
}
