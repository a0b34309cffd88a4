pub mod checkout_reader;
pub mod mandate_writer;
