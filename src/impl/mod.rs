// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod appointments_csv_datasource;
        pub(crate) mod contracts_csv_datasource;
        pub(crate) mod in_memory_store;
    }
    pub(crate) mod models {
        pub(crate) mod amount_model;
        pub(crate) mod api_model;
        pub(crate) mod closed_enum_model;
        pub(crate) mod invoice_detail_model;
        pub(crate) mod iso_date_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod billing_repository_impl;
        pub(crate) mod invoice_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod appointment;
        pub(crate) mod contract;
        pub(crate) mod date_range;
        pub(crate) mod invoice;
        pub(crate) mod stores;
        pub(crate) mod warning;
    }
    pub(crate) mod logic {
        pub(crate) mod amount_arithmetic;
        pub(crate) mod appointment_aggregator;
        pub(crate) mod contract_selector;
        pub(crate) mod credit_note;
        pub(crate) mod invoice_assembler;
        pub(crate) mod invoice_numbering;
        pub(crate) mod invoice_verification;
        pub(crate) mod payment_status;
        pub(crate) mod period_splitter;
        pub(crate) mod rate_calculator;
        pub(crate) mod vat_applier;
        pub(crate) mod warning_collector;
    }
    pub(crate) mod repositories {
        pub(crate) mod billing_repository;
        pub(crate) mod invoice_repository;
    }
    pub(crate) mod usecases {
        pub(crate) mod generate_invoice_usecase;
        pub(crate) mod issue_invoice_usecase;
    }
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from the
    // internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::appointment::*;
        pub use crate::domain::entities::contract::*;
        pub use crate::domain::entities::date_range::*;
        pub use crate::domain::entities::invoice::*;
        pub use crate::domain::entities::stores::*;
        pub use crate::domain::entities::warning::*;
    }

    pub mod models {
        pub use crate::data::models::api_model::*;
        pub use crate::data::models::closed_enum_model::*;
        pub use crate::data::models::invoice_detail_model::*;
    }

    pub mod stores {
        pub use crate::data::datasources::in_memory_store::InMemoryStore;
    }
}
