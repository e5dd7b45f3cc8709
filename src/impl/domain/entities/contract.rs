use rust_decimal::Decimal;

use super::date_range::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceTimeUnit {
    Minute,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CareType {
    /// Billed by time actually spent, taken from scheduled appointments.
    Ambulante,
    /// Billed by elapsed days of the contract.
    Accommodation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoursType {
    Weekly,
    AllPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractStatus {
    Draft,
    Approved,
    Terminated,
    Stopped,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancingAct {
    Wmo,
    Zvw,
    Wlz,
    Jw,
    Wpg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancingOption {
    Zin,
    Pgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: ContractId,
    pub client_id: ClientId,
    pub sender_id: Option<SenderId>,
    pub validity: DateRange,
    pub price: Decimal,
    pub price_time_unit: PriceTimeUnit,
    pub care_type: CareType,
    /// Cap on billable hours, interpreted according to `hours_type`.
    pub hours: Option<Decimal>,
    pub hours_type: Option<HoursType>,
    /// VAT percentage (ex. 21 for 21%).
    pub vat: Option<u32>,
    pub status: ContractStatus,
    pub financing_act: FinancingAct,
    pub financing_option: FinancingOption,
}

// --

impl Contract {
    pub fn is_billable_status(&self) -> bool {
        self.status == ContractStatus::Approved
    }

    pub fn vat_percentage(&self) -> u32 {
        self.vat.unwrap_or(0)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PriceTimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTimeUnit::Minute => "minute",
            PriceTimeUnit::Hourly => "hourly",
            PriceTimeUnit::Daily => "daily",
            PriceTimeUnit::Weekly => "weekly",
            PriceTimeUnit::Monthly => "monthly",
        }
    }
}

impl CareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareType::Ambulante => "ambulante",
            CareType::Accommodation => "accommodation",
        }
    }
}
