pub mod ledger;
pub mod price;
pub mod settings;
pub mod transaction;
