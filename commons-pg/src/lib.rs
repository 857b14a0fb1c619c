pub mod sql_transaction;
