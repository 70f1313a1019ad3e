//! CSV readers for the ledger files.
//!
//! Every reader takes any `io::Read` so tests can feed strings; `load_ledger`
//! opens the files. Row numbers in error messages count the header as line 1.

pub mod cards;
pub mod categories;
pub mod incomes;
pub mod transactions;
pub mod values;

use std::io::Read;

pub(crate) fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input)
}
