use std::str::FromStr;

use fractic_server_error::ServerError;
use serde::{Deserialize, Serialize};

use crate::{
    entities::{
        CareType, ContractStatus, FinancingAct, FinancingOption, HoursType, InvoiceStatus,
        InvoiceType, PriceTimeUnit,
    },
    errors::InvalidFieldValue,
};

/// Declares a string-backed model for an entity enum. Parsing accepts exactly
/// the listed spellings; anything else is rejected with `InvalidFieldValue`.
macro_rules! closed_enum_model {
    ($model:ident, $entity:ident, $field:literal, { $($raw:literal => $variant:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $model(pub(crate) $entity);

        impl $model {
            pub fn as_str(&self) -> &'static str {
                match self.0 {
                    $($entity::$variant => $raw,)+
                }
            }
        }

        impl FromStr for $model {
            type Err = ServerError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($raw => Ok($model($entity::$variant)),)+
                    other => Err(InvalidFieldValue::new($field, other)),
                }
            }
        }

        impl<'de> Deserialize<'de> for $model {
            fn deserialize<D>(deserializer: D) -> Result<$model, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $model::from_str(&s).map_err(serde::de::Error::custom)
            }
        }

        impl Serialize for $model {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl From<$model> for $entity {
            fn from(model: $model) -> Self {
                model.0
            }
        }

        impl From<$entity> for $model {
            fn from(entity: $entity) -> Self {
                $model(entity)
            }
        }
    };
}

closed_enum_model!(PriceTimeUnitModel, PriceTimeUnit, "price_time_unit", {
    "minute" => Minute,
    "hourly" => Hourly,
    "daily" => Daily,
    "weekly" => Weekly,
    "monthly" => Monthly,
});

closed_enum_model!(CareTypeModel, CareType, "care_type", {
    "ambulante" => Ambulante,
    "accommodation" => Accommodation,
});

closed_enum_model!(HoursTypeModel, HoursType, "hours_type", {
    "weekly" => Weekly,
    "all_period" => AllPeriod,
});

closed_enum_model!(ContractStatusModel, ContractStatus, "status", {
    "draft" => Draft,
    "approved" => Approved,
    "terminated" => Terminated,
    "stopped" => Stopped,
    "expired" => Expired,
});

closed_enum_model!(FinancingActModel, FinancingAct, "financing_act", {
    "WMO" => Wmo,
    "ZVW" => Zvw,
    "WLZ" => Wlz,
    "JW" => Jw,
    "WPG" => Wpg,
});

closed_enum_model!(FinancingOptionModel, FinancingOption, "financing_option", {
    "ZIN" => Zin,
    "PGB" => Pgb,
});

closed_enum_model!(InvoiceStatusModel, InvoiceStatus, "invoice_status", {
    "outstanding" => Outstanding,
    "partially_paid" => PartiallyPaid,
    "paid" => Paid,
    "expired" => Expired,
    "overpaid" => Overpaid,
    "imported" => Imported,
    "concept" => Concept,
    "canceled" => Canceled,
});

closed_enum_model!(InvoiceTypeModel, InvoiceType, "invoice_type", {
    "standard" => Standard,
    "credit_note" => CreditNote,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_spellings() {
        let unit: PriceTimeUnit = PriceTimeUnitModel::from_str("hourly").unwrap().into();
        assert_eq!(unit, PriceTimeUnit::Hourly);
        let act: FinancingAct = FinancingActModel::from_str(" WLZ ").unwrap().into();
        assert_eq!(act, FinancingAct::Wlz);
        let hours_type: HoursType = HoursTypeModel::from_str("all_period").unwrap().into();
        assert_eq!(hours_type, HoursType::AllPeriod);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(PriceTimeUnitModel::from_str("yearly").is_err());
        assert!(CareTypeModel::from_str("residential").is_err());
        assert!(ContractStatusModel::from_str("Approved").is_err());
        assert!(serde_json::from_str::<HoursTypeModel>("\"monthly\"").is_err());
    }

    #[test]
    fn serializes_as_wire_string() {
        let json = serde_json::to_string(&InvoiceStatusModel(InvoiceStatus::PartiallyPaid)).unwrap();
        assert_eq!(json, "\"partially_paid\"");
    }
}
