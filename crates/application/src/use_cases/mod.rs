pub mod lookup_delegation;
pub mod lookup_records;

pub use lookup_delegation::LookupDelegationUseCase;
pub use lookup_records::LookupRecordsUseCase;
